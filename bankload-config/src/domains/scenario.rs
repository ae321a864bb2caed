//! Scenario configuration: which script variant runs and with what balances

use crate::error::ConfigResult;
use crate::validation::{validate_ordered, validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Transfer target selection policy
    #[serde(default)]
    pub variant: Variant,

    /// Initial balance for every account created during the run
    #[serde(default = "default_salary_cents")]
    pub salary_cents: u64,

    /// Lower bound of the pause between two tasks of one user
    #[serde(
        with = "crate::domains::utils::serde_duration_millis",
        default = "default_think_time_min"
    )]
    pub think_time_min: Duration,

    /// Upper bound of the pause between two tasks of one user
    #[serde(
        with = "crate::domains::utils::serde_duration_millis",
        default = "default_think_time_max"
    )]
    pub think_time_max: Duration,

    /// Whether global setup starts the remote simulation clock
    #[serde(default = "crate::domains::utils::default_true")]
    pub start_simulation: bool,
}

/// Script variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Variant {
    /// Every user transfers into one account created at setup
    #[default]
    SharedAccount,
    /// Users transfer to random peers from the account pool
    PeerToPeer,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::SharedAccount => "shared-account",
            Variant::PeerToPeer => "peer-to-peer",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "shared-account" | "shared" => Ok(Variant::SharedAccount),
            "peer-to-peer" | "peer" | "p2p" => Ok(Variant::PeerToPeer),
            _ => Err(format!("Invalid variant: {}", s)),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            salary_cents: default_salary_cents(),
            think_time_min: default_think_time_min(),
            think_time_max: default_think_time_max(),
            start_simulation: true,
        }
    }
}

impl Validatable for ScenarioConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.salary_cents, "salary_cents", self.domain_name())?;
        validate_ordered(
            self.think_time_min.as_millis(),
            self.think_time_max.as_millis(),
            "think_time",
            self.domain_name(),
        )?;

        if self.think_time_max.is_zero() {
            log::warn!("scenario think time is zero, users will send requests back to back");
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scenario"
    }
}

fn default_salary_cents() -> u64 {
    500_000
}

fn default_think_time_min() -> Duration {
    Duration::from_secs(2)
}

fn default_think_time_max() -> Duration {
    Duration::from_secs(3)
}
