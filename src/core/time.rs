use std::ops::{Add, AddAssign, Sub, SubAssign};

use chrono::{DateTime, TimeDelta, Utc};

pub trait Clock {
    fn utc(&self) -> DateTime<Utc>;
    fn monotonic(&self) -> Instant;
}

/// Wall + monotonic time pair, attached to every telemetry message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub utc: DateTime<Utc>,
    pub monotonic: Instant,
}

impl Timestamp {
    pub fn now(clock: &dyn Clock) -> Timestamp {
        Timestamp {
            utc: clock.utc(),
            monotonic: clock.monotonic(),
        }
    }
}

/// Monotonic instant, expressed as elapsed time since the clock's epoch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Default)]
pub struct Instant {
    delta: TimeDelta,
}

impl Instant {
    pub fn elapsed(&self) -> TimeDelta {
        self.delta
    }

    pub fn elapsed_seconds_f64(&self) -> f64 {
        td_seconds(self.delta)
    }

    pub fn duration_since(&self, other: &Instant) -> TimeDelta {
        self.delta - other.delta
    }
}

impl Add<TimeDelta> for Instant {
    type Output = Instant;

    fn add(self, rhs: TimeDelta) -> Self::Output {
        Instant {
            delta: self.delta + rhs,
        }
    }
}

impl AddAssign<TimeDelta> for Instant {
    fn add_assign(&mut self, rhs: TimeDelta) {
        self.delta += rhs;
    }
}

impl Sub<TimeDelta> for Instant {
    type Output = Instant;

    fn sub(self, rhs: TimeDelta) -> Self::Output {
        Instant {
            delta: self.delta - rhs,
        }
    }
}

impl SubAssign<TimeDelta> for Instant {
    fn sub_assign(&mut self, rhs: TimeDelta) {
        self.delta -= rhs
    }
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            epoch: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Instant {
        Instant {
            delta: TimeDelta::from_std(self.epoch.elapsed()).unwrap_or(TimeDelta::MAX),
        }
    }
}

/// Manually stepped clock for deterministic tests and replays.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    utc_epoch: DateTime<Utc>,
    elapsed: TimeDelta,
}

impl SimulatedClock {
    pub fn new(utc_epoch: DateTime<Utc>) -> SimulatedClock {
        SimulatedClock {
            utc_epoch,
            elapsed: TimeDelta::zero(),
        }
    }

    pub fn step(&mut self, delta: TimeDelta) {
        self.elapsed += delta
    }
}

impl Clock for SimulatedClock {
    fn utc(&self) -> DateTime<Utc> {
        self.utc_epoch + self.elapsed
    }

    fn monotonic(&self) -> Instant {
        Instant {
            delta: self.elapsed,
        }
    }
}

pub fn td_seconds(td: TimeDelta) -> f64 {
    td.num_seconds() as f64 + (td.subsec_nanos() as f64) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_clock_steps() {
        let mut clock = SimulatedClock::new(DateTime::UNIX_EPOCH);

        let t0 = clock.monotonic();
        clock.step(TimeDelta::milliseconds(10));
        let t1 = clock.monotonic();

        assert_eq!(t1.duration_since(&t0), TimeDelta::milliseconds(10));
        assert_eq!(t1.elapsed_seconds_f64(), 0.01);
    }

    #[test]
    fn test_instant_arithmetic() {
        let mut t = Instant::default() + TimeDelta::seconds(2);
        t += TimeDelta::milliseconds(500);

        assert_eq!(t.elapsed(), TimeDelta::milliseconds(2500));
        assert_eq!((t - TimeDelta::seconds(1)).elapsed_seconds_f64(), 1.5);
    }
}
