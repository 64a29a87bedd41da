use serde::{Deserialize, Serialize};

fn default_polling_timeout() -> i32 {
    30
}

fn default_polling_limit() -> i32 {
    100
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_cap_ms() -> u64 {
    30_000
}

/// Top-level bot configuration.
///
/// `token` is the only field without a default — bot construction fails
/// without it. Everything else has a sane default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bot token, opaque to this crate.
    pub token: String,

    #[serde(default = "default_polling_timeout")]
    pub polling_timeout_seconds: i32,

    #[serde(default = "default_polling_limit")]
    pub polling_limit: i32,

    /// Required only when running in webhook mode.
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// Base URL of the external API. Overridable for testing against a
    /// local stand-in.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://api.telegram.org".to_string()
}

impl Config {
    /// Construct the minimal valid configuration: just a token, everything
    /// else at its default.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            polling_timeout_seconds: default_polling_timeout(),
            polling_limit: default_polling_limit(),
            webhook_url: None,
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            base_url: default_base_url(),
        }
    }

    /// Validate the configured ranges.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.token.trim().is_empty() {
            return Err(crate::ConfigError::MissingToken);
        }
        if !(1..=60).contains(&self.polling_timeout_seconds) {
            return Err(crate::ConfigError::OutOfRange {
                field: "polling_timeout_seconds",
                value: self.polling_timeout_seconds as i64,
                min: 1,
                max: 60,
            });
        }
        if !(1..=100).contains(&self.polling_limit) {
            return Err(crate::ConfigError::OutOfRange {
                field: "polling_limit",
                value: self.polling_limit as i64,
                min: 1,
                max: 100,
            });
        }
        Ok(())
    }
}
