//! Configuration types for mailgun-bulk-validate

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Value shipped in sample configurations; never a real key
pub const PLACEHOLDER_API_KEY: &str = "your-mailgun-api-key-here";

/// Mailgun v4 API root
pub const DEFAULT_API_BASE: &str = "https://api.mailgun.net/v4/";

/// Fixed wait between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wall-clock ceiling for status polling
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for a validation run
///
/// Only the API key is supplied by the operator. The remaining fields are
/// fixed for the CLI and exist so tests can point the workflow at a mock
/// server and shrink the polling cadence.
#[derive(Clone)]
pub struct Config {
    /// Mailgun private API key, sent as basic auth password for user `api`
    pub api_key: String,

    /// API root; must end with a slash so relative joins keep the version segment
    pub api_base: Url,

    /// Wait between status queries (default: 5s)
    pub poll_interval: Duration,

    /// Give up polling once this much time has elapsed (default: 300s)
    pub poll_timeout: Duration,

    /// Timeout applied to each HTTP request (default: 30s)
    pub request_timeout: Duration,
}

impl Config {
    /// Create a configuration with default endpoint and timings
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the key is empty or still the placeholder.
    /// Surrounding whitespace is stripped from the key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let config = Self {
            api_key: api_key.into().trim().to_string(),
            api_base: Url::parse(DEFAULT_API_BASE)?,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    /// Point the client at a different API root
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        let mut url = Url::parse(api_base)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.api_base = url;
        Ok(self)
    }

    /// Override the polling cadence
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(Error::config("api_key", "Mailgun API key is not set"));
        }
        if key == PLACEHOLDER_API_KEY {
            return Err(Error::config(
                "api_key",
                "update the API key with your Mailgun API key",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::config("poll_interval", "must be greater than zero"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .field("poll_interval", &self.poll_interval)
            .field("poll_timeout", &self.poll_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
