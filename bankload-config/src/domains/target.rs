//! Target system configuration

use crate::error::ConfigResult;
use crate::validation::{validate_http_url, Validatable};
use serde::{Deserialize, Serialize};

/// The banking API under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL all endpoint paths are joined onto
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_http_url(&self.host, "host", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_host() -> String {
    "http://localhost:8080".to_string()
}
