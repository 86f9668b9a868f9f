use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::CODEX_API_URL;

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable consulted when `codex.api_key` is not set.
pub const API_KEY_ENV: &str = "CODEX_API_KEY";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub codex: CodexConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Upstream API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodexConfig {
    /// API key sent as `x-api-key`. Falls back to `CODEX_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Leaderboard defaults, overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_network_id")]
    pub network_id: u64,
    /// Minimum USD amount per swap.
    #[serde(default = "default_min_usd")]
    pub min_usd: f64,
    /// Lookback window in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u64,
}

fn default_endpoint() -> Url {
    Url::parse(CODEX_API_URL).expect("CODEX_API_URL is a valid URL")
}

fn default_timeout() -> u64 {
    30
}

fn default_network_id() -> u64 {
    1
}

fn default_min_usd() -> f64 {
    1000.0
}

fn default_lookback_hours() -> u64 {
    24
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
            min_usd: default_min_usd(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

impl CodexConfig {
    /// The configured API key, or `CODEX_API_KEY` from the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("no API key: set codex.api_key or {API_KEY_ENV}"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load config if the file exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.codex.endpoint.as_str(), CODEX_API_URL);
        assert_eq!(config.codex.timeout_secs, 30);
        assert_eq!(config.settings.network_id, 1);
        assert_eq!(config.settings.min_usd, 1000.0);
        assert_eq!(config.settings.lookback_hours, 24);
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::parse(
            r#"
            [codex]
            api_key = "secret"
            endpoint = "http://localhost:8080/graphql"
            timeout_secs = 5

            [settings]
            network_id = 56
            min_usd = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(config.codex.resolve_api_key().unwrap(), "secret");
        assert_eq!(config.codex.endpoint.as_str(), "http://localhost:8080/graphql");
        assert_eq!(config.codex.timeout(), Duration::from_secs(5));
        assert_eq!(config.settings.network_id, 56);
        assert_eq!(config.settings.min_usd, 250.0);
        assert_eq!(config.settings.lookback_hours, 24);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = AppConfig::parse(
            r#"
            [codex]
            endpoint = "not a url"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AppConfig::load_or_default(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.settings.network_id, 1);
    }
}
