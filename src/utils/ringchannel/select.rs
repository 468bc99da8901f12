use std::{
    marker::PhantomData,
    sync::{Arc, Condvar, Mutex},
};

use rand::{rngs::ThreadRng, seq::IteratorRandom};

use super::ChannelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectToken {
    index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SelectGroup {
    inner: Arc<SelectGroupInner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseState {
    Open,
    CloseSignaled,
    CloseAcknowledged,
}

#[derive(Debug, Default)]
struct SelectGroupInner {
    ready_list: Mutex<Vec<(usize, CloseState)>>,
    cv: Condvar,
}

impl SelectGroup {
    pub fn update(&self, token: SelectToken, nelem: usize) {
        let mut ready_list = self.inner.ready_list.lock().unwrap();

        ready_list.get_mut(token.index).unwrap().0 = nelem;

        self.inner.cv.notify_one();
    }

    pub fn close(&self, token: SelectToken) {
        let mut ready_list = self.inner.ready_list.lock().unwrap();

        ready_list.get_mut(token.index).unwrap().1 = CloseState::CloseSignaled;

        self.inner.cv.notify_one();
    }

    pub fn ack_close(&self, token: SelectToken) {
        let mut ready_list = self.inner.ready_list.lock().unwrap();

        ready_list.get_mut(token.index).unwrap().1 = CloseState::CloseAcknowledged;
    }
}

pub trait Selectable {
    fn register(&self, token: SelectToken, handle: SelectGroup);

    fn unregister(&self);
}

/// Waits on multiple receivers at once, picking fairly among the ready ones.
pub struct Select<'a> {
    handle: SelectGroup,
    subscribers: Vec<(&'a dyn Selectable, SelectToken)>,
    rng: ThreadRng,

    /// ThreadRng is not Send anyway, but make the intent explicit
    not_send: PhantomData<*const ()>,
}

impl<'a> Default for Select<'a> {
    fn default() -> Self {
        Self {
            handle: SelectGroup::default(),
            subscribers: vec![],
            rng: ThreadRng::default(),
            not_send: PhantomData,
        }
    }
}

impl<'a> Drop for Select<'a> {
    fn drop(&mut self) {
        for (s, _) in self.subscribers.iter() {
            s.unregister();
        }
    }
}

impl<'a> Select<'a> {
    pub fn new(items: &[&'a dyn Selectable]) -> Self {
        let mut select = Select::default();
        for &s in items {
            select.add(s);
        }

        select
    }

    pub fn add(&mut self, selectable: &'a dyn Selectable) -> usize {
        let index = self.subscribers.len();
        let tk = SelectToken { index };

        self.subscribers.push((selectable, tk));

        {
            let mut ready_list = self.handle.inner.ready_list.lock().unwrap();
            ready_list.push((0, CloseState::Open));
        }

        selectable.register(tk, self.handle.clone());

        index
    }

    pub fn ready(&mut self) -> usize {
        let handle = self.handle.inner.as_ref();

        let ready_list = handle
            .cv
            .wait_while(handle.ready_list.lock().unwrap(), |r| {
                r.iter()
                    .all(|(n, close_state)| *n == 0usize && *close_state != CloseState::CloseSignaled)
            })
            .unwrap();

        ready_list
            .iter()
            .enumerate()
            .filter(|(_, (n, close_state))| {
                *n > 0usize || *close_state == CloseState::CloseSignaled
            })
            .map(|(i, _)| i)
            .choose(&mut self.rng)
            .unwrap()
    }

    pub fn try_ready(&mut self) -> Result<usize, ChannelError> {
        let ready_list = self.handle.inner.ready_list.lock().unwrap();

        ready_list
            .iter()
            .enumerate()
            .filter(|(_, (n, close_state))| {
                *n > 0usize || *close_state == CloseState::CloseSignaled
            })
            .map(|(i, _)| i)
            .choose(&mut self.rng)
            .ok_or(ChannelError::Empty)
    }
}
