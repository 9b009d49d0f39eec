//! Readiness probe settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the inference server is polled after it starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// HTTP path of the status endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// Maximum number of probe attempts
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay before the first attempt, doubled after every failure
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on the delay between attempts
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Timeout of a single HTTP request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_path() -> String {
    "/api/tags".to_string()
}

fn default_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

fn default_request_timeout_ms() -> u64 {
    3_000
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            attempts: default_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Delay before attempt `n` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Full URL of the status endpoint under `base`
    pub fn url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        if self.path.starts_with('/') {
            format!("{}{}", base, self.path)
        } else {
            format!("{}/{}", base, self.path)
        }
    }
}
