//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$FORGEKIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/forgekit/config.toml`
//! 3. `~/.forgekit/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing: provider names must be known,
//! timeouts must be non-zero and base URLs must be http(s).
//!
//! Tokens are never read from the file; they come from the environment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::forge::ProviderName;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// remote = "upstream"
/// default_provider = "gitea"
///
/// [timeouts]
/// cli_secs = 10
/// http_secs = 10
/// probe_secs = 5
///
/// [providers.gitea]
/// url = "https://git.example.com"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Remote read by the working-directory helpers (default: "origin")
    pub remote: Option<String>,

    /// Provider used when the remote URL gives no hint
    pub default_provider: Option<String>,

    /// Subprocess and HTTP bounds
    pub timeouts: Option<TimeoutConfig>,

    /// Per-provider overrides keyed by provider name
    pub providers: BTreeMap<String, ProviderOverride>,
}

impl ForgeConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote {
            if remote.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "remote cannot be empty".to_string(),
                ));
            }
        }

        if let Some(name) = &self.default_provider {
            known_provider(name)?;
        }

        if let Some(timeouts) = &self.timeouts {
            timeouts.validate()?;
        }

        for (name, provider) in &self.providers {
            known_provider(name)?;
            provider.validate(name)?;
        }

        Ok(())
    }
}

/// Parse a provider name that must refer to a real provider.
fn known_provider(name: &str) -> Result<ProviderName, ConfigError> {
    match ProviderName::parse(name) {
        Some(provider) if provider.is_known() => Ok(provider),
        _ => {
            let valid: Vec<&str> = ProviderName::ALL.iter().map(|p| p.as_str()).collect();
            Err(ConfigError::InvalidValue(format!(
                "invalid provider '{}', must be one of: {}",
                name,
                valid.join(", ")
            )))
        }
    }
}

/// Timeout settings, in seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Provider CLI invocations (default: 10)
    pub cli_secs: Option<u64>,
    /// REST lookups (default: 10)
    pub http_secs: Option<u64>,
    /// Version-endpoint probes (default: 5)
    pub probe_secs: Option<u64>,
}

impl TimeoutConfig {
    /// Validate the timeout values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("cli_secs", self.cli_secs),
            ("http_secs", self.http_secs),
            ("probe_secs", self.probe_secs),
        ] {
            if value == Some(0) {
                return Err(ConfigError::InvalidValue(format!(
                    "timeouts.{} must be greater than zero",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Settings for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderOverride {
    /// Base URL (overrides the provider's base-URL environment variable)
    pub url: Option<String>,
}

impl ProviderOverride {
    /// Validate the override for provider `name`.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            let lower = url.trim().to_ascii_lowercase();
            if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "providers.{}.url must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            remote = "upstream"
            default_provider = "forgejo"

            [timeouts]
            cli_secs = 3
            probe_secs = 2

            [providers.forgejo]
            url = "https://codeberg.org"
        "#;

        let config: ForgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.remote.as_deref(), Some("upstream"));
        assert_eq!(config.default_provider.as_deref(), Some("forgejo"));
        let timeouts = config.timeouts.as_ref().unwrap();
        assert_eq!(timeouts.cli_secs, Some(3));
        assert_eq!(timeouts.http_secs, None);
        assert_eq!(
            config.providers["forgejo"].url.as_deref(),
            Some("https://codeberg.org")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_config_is_valid() {
        let config: ForgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, ForgeConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<ForgeConfig, _> = toml::from_str("token = \"secret\"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_provider() {
        let config = ForgeConfig {
            default_provider: Some("sourcehut".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sourcehut"));

        let config = ForgeConfig {
            default_provider: Some("unknown".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_provider_section() {
        let mut config = ForgeConfig::default();
        config
            .providers
            .insert("launchpad".into(), ProviderOverride::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ForgeConfig {
            timeouts: Some(TimeoutConfig {
                http_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http_secs"));
    }

    #[test]
    fn rejects_non_http_url() {
        let mut config = ForgeConfig::default();
        config.providers.insert(
            "gitea".into(),
            ProviderOverride {
                url: Some("git@git.example.com".into()),
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_remote() {
        let config = ForgeConfig {
            remote: Some("  ".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
