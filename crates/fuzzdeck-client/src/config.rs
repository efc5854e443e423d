//! Client configuration.

use fuzzdeck_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Connection settings for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Orchestrator base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout. Unset means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Parsed base URL. Routes are appended below its path.
    pub fn url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidInput(format!("{}: {}", self.base_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::InvalidInput(format!(
                "unsupported scheme {} in {}",
                other, self.base_url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout(), None);
        assert_eq!(config.url().unwrap().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(ClientConfig::new("not a url").url().is_err());
        assert!(ClientConfig::new("ftp://fuzz.example.com").url().is_err());
    }
}
