use std::num::NonZero;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Unbounded,
    Bounded(NonZero<usize>),
}

impl<T> From<T> for Capacity
where
    T: Into<usize>,
{
    fn from(value: T) -> Self {
        let value: usize = value.into();
        match NonZero::new(value) {
            Some(v) => Capacity::Bounded(v),
            None => Capacity::Unbounded,
        }
    }
}
