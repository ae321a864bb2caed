//! Load shape configuration: how many virtual users, how fast, how long

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Load shape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of virtual users to spawn
    #[serde(default = "default_users")]
    pub users: usize,

    /// Users spawned per second
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,

    /// Total run time measured from the end of global setup.
    /// `None` runs until interrupted.
    #[serde(
        with = "crate::domains::utils::serde_duration_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub run_time: Option<Duration>,

    /// Grace period for user loops to exit after the stop signal
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_stop_timeout"
    )]
    pub stop_timeout: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            spawn_rate: default_spawn_rate(),
            run_time: None,
            stop_timeout: default_stop_timeout(),
        }
    }
}

impl LoadConfig {
    /// Interval between two consecutive user spawns, `None` for a rate
    /// that is not a positive finite number
    pub fn spawn_interval(&self) -> Option<Duration> {
        if !(self.spawn_rate.is_finite() && self.spawn_rate > 0.0) {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / self.spawn_rate).ok()
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.users, "users", self.domain_name())?;
        validate_positive(self.spawn_rate, "spawn_rate", self.domain_name())?;

        if !self.spawn_rate.is_finite() {
            return Err(self.validation_error("spawn_rate must be a finite number"));
        }

        if let Some(run_time) = self.run_time {
            validate_positive(run_time.as_secs(), "run_time", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

fn default_users() -> usize {
    10
}

fn default_spawn_rate() -> f64 {
    1.0
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(5)
}
