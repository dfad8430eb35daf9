//! Configuration management for pulsewire.
//!
//! Configuration is read from `~/.config/pulsewire/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! `PULSEWIRE_URL` and `PULSEWIRE_ANON_KEY` override the service section.

use crate::domain::Session;
use crate::query::SortKey;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const URL_ENV: &str = "PULSEWIRE_URL";
pub const ANON_KEY_ENV: &str = "PULSEWIRE_ANON_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub identity: IdentityConfig,
    pub feed: FeedConfig,
}

/// Where the hosted data service lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Project URL; requests go to `{url}/rest/v1/...`.
    pub url: String,
    /// Public key sent with every request.
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// A static session, for running signed in without an interactive login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub user_id: Option<String>,
    pub access_token: Option<String>,
    pub email: Option<String>,
}

impl IdentityConfig {
    /// The configured session, present only when both id and token are set.
    pub fn session(&self) -> Option<Session> {
        let user_id = self.user_id.as_deref().filter(|s| !s.trim().is_empty())?;
        let token = self.access_token.as_deref().filter(|s| !s.trim().is_empty())?;
        Some(Session::new(
            user_id,
            token,
            self.email.as_deref().unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub default_sort: SortKey,
    pub page_size: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKey::Recent,
            page_size: 20,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default().with_env_overrides());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path; the file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config.with_env_overrides())
    }

    /// Get the default config file path: `~/.config/pulsewire/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pulsewire").join("config.toml"))
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(URL_ENV).ok(),
            std::env::var(ANON_KEY_ENV).ok(),
        )
    }

    fn with_overrides(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
        if let Some(url) = url.filter(|v| !v.is_empty()) {
            self.service.url = url;
        }
        if let Some(key) = anon_key.filter(|v| !v.is_empty()) {
            self.service.anon_key = key;
        }
        self
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# pulsewire configuration
#
# PULSEWIRE_URL and PULSEWIRE_ANON_KEY in the environment take precedence
# over the [service] section.

[service]
# Project URL of the hosted data service
url = "http://localhost:54321"

# Public (anonymous) API key
anon_key = ""

# Request timeout in seconds
timeout_secs = 30

[identity]
# Uncomment to run signed in with a static session
# user_id = ""
# access_token = ""
# email = ""

[feed]
# Initial ordering of the pulse feed: "recent" or "popular"
default_sort = "recent"

# Articles per page for the article listing
page_size = 20
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
