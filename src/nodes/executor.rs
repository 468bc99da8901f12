use anyhow::Result;
use chrono::TimeDelta;
use log::{info, warn};
use std::thread;

use crate::core::time::{Clock, SystemClock};

use super::{NodeManager, StepResult};

/// Steps every registered node in order at a fixed period. The period is
/// honored regardless of how late individual steps complete: an overrun tick
/// is followed immediately by the next one, with no retries and no skips.
pub struct FixedRateExecutor;

impl FixedRateExecutor {
    pub fn run_blocking(mut nm: NodeManager, period: TimeDelta) -> Result<()> {
        anyhow::ensure!(
            period > TimeDelta::zero(),
            "Executor period must be positive, got {period}"
        );

        let clock = SystemClock::default();
        let period_std = period.to_std()?;

        info!(
            "Executor running {} node(s) every {} us",
            nm.nodes_mut().len(),
            period.num_microseconds().unwrap_or(i64::MAX)
        );

        let mut deadline = clock.monotonic() + period;

        for i in 0usize.. {
            for (name, node) in nm.nodes_mut() {
                match node.step(i, period, &clock)? {
                    StepResult::Continue => {}
                    StepResult::Stop => {
                        info!("Node '{name}' requested stop at step {i}");
                        return Ok(());
                    }
                }
            }

            let now = clock.monotonic();
            if now < deadline {
                let sleep = deadline.duration_since(&now);
                thread::sleep(sleep.to_std().unwrap_or(period_std));
            } else if i > 0 {
                warn!(
                    "Step {i} overran its period by {} us",
                    now.duration_since(&deadline).num_microseconds().unwrap_or(0)
                );
            }

            deadline += period;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{nodes::Node, parameters::ParameterMap, telemetry::TelemetryService};

    struct CountingNode {
        count: usize,
        stop_at: usize,
    }

    impl Node for CountingNode {
        fn step(&mut self, i: usize, _: TimeDelta, _: &dyn Clock) -> Result<StepResult> {
            assert_eq!(i, self.count);
            self.count += 1;

            if self.count == self.stop_at {
                Ok(StepResult::Stop)
            } else {
                Ok(StepResult::Continue)
            }
        }
    }

    #[test]
    fn test_runs_until_stop() -> Result<()> {
        let mut nm = NodeManager::new(TelemetryService::default(), ParameterMap::default());
        nm.add_node("counter", |_| {
            Ok(Box::new(CountingNode {
                count: 0,
                stop_at: 5,
            }))
        })?;

        FixedRateExecutor::run_blocking(nm, TimeDelta::milliseconds(1))?;

        Ok(())
    }

    #[test]
    fn test_rejects_bad_period() {
        let nm = NodeManager::new(TelemetryService::default(), ParameterMap::default());

        assert!(FixedRateExecutor::run_blocking(nm, TimeDelta::zero()).is_err());
    }
}
