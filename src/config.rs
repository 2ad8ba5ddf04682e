use anyhow::{ensure, Context};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Backend settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `FLATS_API_BASE` and `FLATS_API_TIMEOUT_SECS`, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_url = lookup("FLATS_API_BASE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup("FLATS_API_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("FLATS_API_TIMEOUT_SECS must be an integer, got '{}'", value))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        ensure!(timeout_secs > 0, "FLATS_API_TIMEOUT_SECS must be greater than zero");

        Ok(Self::new(base_url.trim()).with_timeout(Duration::from_secs(timeout_secs)))
    }

    /// URL of the flats collection
    pub fn collection_url(&self) -> String {
        format!("{}/flats", self.base_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
