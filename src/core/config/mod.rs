//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment variables (provider base URLs and tokens)
//! 4. CLI flags (not handled here)
//!
//! A base URL set in the file wins over the provider's environment variable;
//! tokens only ever come from the environment.
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$FORGEKIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/forgekit/config.toml`
//! 3. `~/.forgekit/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use forgekit::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Remote: {}", config.remote());
//! println!("CLI timeout: {:?}", config.cli_timeout());
//! ```

pub mod schema;

pub use schema::{ForgeConfig, ProviderOverride, TimeoutConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::forge::ProviderName;

/// Default CLI timeout in seconds.
pub const DEFAULT_CLI_SECS: u64 = 10;
/// Default REST timeout in seconds.
pub const DEFAULT_HTTP_SECS: u64 = 10;
/// Default probe timeout in seconds.
pub const DEFAULT_PROBE_SECS: u64 = 5;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (defaults when no file was found)
    pub file: ForgeConfig,
    /// Path the file was loaded from
    path: Option<PathBuf>,
}

impl Config {
    /// Wrap already-parsed settings that were not read from disk.
    pub fn from_file(file: ForgeConfig) -> Self {
        Self { file, path: None }
    }

    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or is
    /// invalid. A missing file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Load configuration using an explicit environment lookup and home
    /// directory.
    pub fn load_with(
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        match Self::find(env, home) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ForgeConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// First existing file in the search order.
    fn find(env: impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
        // 1. $FORGEKIT_CONFIG
        if let Some(path) = env("FORGEKIT_CONFIG").filter(|p| !p.is_empty()) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warn!(path = %path.display(), "FORGEKIT_CONFIG points to a missing file, ignoring it");
        }

        // 2. $XDG_CONFIG_HOME/forgekit/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
            let path = PathBuf::from(xdg_home).join("forgekit/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. ~/.forgekit/config.toml
        home.map(|home| home.join(".forgekit/config.toml"))
            .filter(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the remote name.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote(&self) -> &str {
        self.file.remote.as_deref().unwrap_or("origin")
    }

    /// Provider to use when detection yields `unknown`.
    pub fn default_provider(&self) -> Option<ProviderName> {
        self.file
            .default_provider
            .as_deref()
            .and_then(ProviderName::parse)
            .filter(ProviderName::is_known)
    }

    /// Configured base URL for a provider, if any.
    pub fn provider_url(&self, provider: ProviderName) -> Option<&str> {
        self.file
            .providers
            .iter()
            .find(|(name, _)| ProviderName::parse(name) == Some(provider))
            .and_then(|(_, p)| p.url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Bound for provider CLI invocations.
    pub fn cli_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout(|t| t.cli_secs, DEFAULT_CLI_SECS))
    }

    /// Bound for REST lookups.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout(|t| t.http_secs, DEFAULT_HTTP_SECS))
    }

    /// Bound for version-endpoint probes.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout(|t| t.probe_secs, DEFAULT_PROBE_SECS))
    }

    fn timeout(&self, pick: impl Fn(&TimeoutConfig) -> Option<u64>, default: u64) -> u64 {
        self.file
            .timeouts
            .as_ref()
            .and_then(pick)
            .filter(|secs| *secs > 0)
            .unwrap_or(default)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
