//! Client configuration loaded from `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use taskdeck_gateway::{Url, parse_base_url};

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "TASKDECK_API_BASE_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Task service connection settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// `[api]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Root of the task service, optionally with a path prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Returns the default configuration file path.
///
/// On Linux: `~/.config/taskdeck/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskdeck").join("config.toml"))
}

impl ClientConfig {
    /// Load from `path`, or from [`default_config_path`] when `None`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Fails when the file exists but cannot be read or parsed, or holds an
    /// invalid base URL.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
            return Ok(Self::default());
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(raw) = &self.api.base_url {
            parse_base_url(raw)?;
        }
        Ok(())
    }

    /// Apply the value of [`BASE_URL_ENV`], if set and non-blank.
    #[must_use]
    pub fn with_env_override(self, value: Option<String>) -> Self {
        self.with_base_url_override(value)
    }

    /// Apply an explicit base URL, e.g. from the command line.
    #[must_use]
    pub fn with_base_url_override(mut self, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.api.base_url = Some(value.trim().to_owned());
        }
        self
    }

    /// Effective base URL.
    ///
    /// # Errors
    /// Fails when the configured value is not an absolute http(s) URL.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        parse_base_url(raw).with_context(|| format!("invalid base URL '{raw}'"))
    }
}
