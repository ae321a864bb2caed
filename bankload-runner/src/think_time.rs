//! Pause between two tasks of one user

use crate::error::{RunnerError, RunnerResult};
use bankload_config::ScenarioConfig;
use rand::Rng;
use std::time::Duration;

/// Uniform wait in `[min, max]`, sampled at millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    min: Duration,
    max: Duration,
}

impl ThinkTime {
    pub fn new(min: Duration, max: Duration) -> RunnerResult<Self> {
        if min > max {
            return Err(RunnerError::InvalidThinkTime(format!(
                "min {:?} is greater than max {:?}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn from_config(config: &ScenarioConfig) -> RunnerResult<Self> {
        Self::new(config.think_time_min, config.think_time_max)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rng.random_range(min..=max))
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(2),
            max: Duration::from_secs(3),
        }
    }
}
