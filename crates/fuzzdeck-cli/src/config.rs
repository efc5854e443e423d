//! CLI configuration management.

use anyhow::{Context, anyhow};
use fuzzdeck_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, stored as YAML in the platform config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Orchestrator URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds; unset waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Route toasts into the structured log. Set from `--json-logs`.
    #[serde(skip)]
    pub log_toasts: bool,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: None,
            output_format: OutputFormat::default(),
            log_toasts: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl CliConfig {
    /// Load configuration from file.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Save configuration to file.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the configuration file path.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("dev", "fuzzdeck", "fuzzdeck")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "api_url" => self.api_url = value.to_string(),
            "timeout_secs" => {
                self.timeout_secs = match value {
                    "" | "none" => None,
                    secs => Some(
                        secs.parse()
                            .map_err(|_| format!("Invalid timeout: {}", value))?,
                    ),
                };
            }
            "output_format" => {
                self.output_format = match value {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    "yaml" => OutputFormat::Yaml,
                    _ => return Err(format!("Invalid output format: {}", value)),
                };
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn client(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = CliConfig::parse("output_format: json\n").unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_set_known_keys() {
        let mut config = CliConfig::default();
        config.set("api_url", "https://fuzz.example.com").unwrap();
        config.set("timeout_secs", "30").unwrap();
        config.set("output_format", "yaml").unwrap();

        assert_eq!(config.client().base_url, "https://fuzz.example.com");
        assert_eq!(config.client().timeout_secs, Some(30));
        assert_eq!(config.output_format, OutputFormat::Yaml);

        config.set("timeout_secs", "none").unwrap();
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = CliConfig::default();
        assert!(config.set("output_format", "xml").is_err());
        assert!(config.set("timeout_secs", "soon").is_err());
        assert!(config.set("token", "x").is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = CliConfig::default();
        config.timeout_secs = Some(5);
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(CliConfig::parse(&yaml).unwrap(), config);
    }
}
