//! forge::context
//!
//! Shared handles injected into every adapter.
//!
//! An adapter never reads the process environment or spawns processes on
//! its own. It goes through the [`ProviderContext`] it was built with, so
//! tests can substitute a scripted runner, a mock HTTP server and a fixed
//! environment.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::process::{CommandRunner, SystemRunner};
use super::remote::ProviderName;
use super::rest::RestClient;
use super::traits::ForgeError;
use crate::core::config::Config;

/// Snapshot of environment variables.
#[derive(Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

// Custom Debug to avoid exposing tokens
impl std::fmt::Debug for EnvVars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("EnvVars").field("keys", &keys).finish()
    }
}

impl EnvVars {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a variable; empty or whitespace-only values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First set variable among `keys`, with its name.
    pub fn first(&self, keys: &[&'static str]) -> Option<(&'static str, &str)> {
        keys.iter()
            .find_map(|key| self.get(key).map(|value| (*key, value)))
    }
}

/// Runner, HTTP client, environment and configuration shared by adapters.
#[derive(Clone)]
pub struct ProviderContext {
    pub runner: Arc<dyn CommandRunner>,
    pub rest: RestClient,
    pub env: EnvVars,
    pub config: Config,
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("rest", &self.rest)
            .field("env", &self.env)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProviderContext {
    /// Context for real use: system processes and the process environment.
    pub fn from_env(config: Config) -> Self {
        Self::new(Arc::new(SystemRunner::new()), EnvVars::from_process(), config)
    }

    /// Context with explicit runner and environment.
    pub fn new(runner: Arc<dyn CommandRunner>, env: EnvVars, config: Config) -> Self {
        let rest = RestClient::new(config.http_timeout(), config.probe_timeout());
        Self {
            runner,
            rest,
            env,
            config,
        }
    }

    /// Bound for CLI invocations.
    pub fn cli_timeout(&self) -> Duration {
        self.config.cli_timeout()
    }

    /// Resolve a provider's base URL.
    ///
    /// Precedence: config file, then the first set variable in `env_keys`,
    /// then `default`. Trailing slashes are removed.
    pub fn base_url(
        &self,
        provider: ProviderName,
        env_keys: &[&'static str],
        default: Option<&str>,
    ) -> Option<String> {
        self.config
            .provider_url(provider)
            .or_else(|| self.env.first(env_keys).map(|(_, value)| value))
            .or(default)
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    /// First token found among `env_keys`, with the variable it came from.
    pub fn token(&self, env_keys: &[&'static str]) -> Option<(&'static str, String)> {
        self.env
            .first(env_keys)
            .map(|(key, value)| (key, value.to_string()))
    }

    /// Run a provider CLI and decode its JSON stdout.
    pub async fn cli_json<T: DeserializeOwned>(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<T, ForgeError> {
        let stdout = self
            .runner
            .run_ok(program, args, self.cli_timeout())
            .await?;
        if stdout.trim().is_empty() {
            return Err(ForgeError::NotFound(format!("{} printed nothing", program)));
        }
        serde_json::from_str(&stdout)
            .map_err(|e| ForgeError::Parse(format!("{} output: {}", program, e)))
    }

    /// Whether a CLI check command exits successfully within the timeout.
    ///
    /// A CLI that is not installed is not run at all.
    pub async fn cli_succeeds(&self, program: &str, args: &[&str]) -> bool {
        self.cli_stdout(program, args).await.is_some()
    }

    /// Stdout of a CLI check command, when it exits successfully.
    pub async fn cli_stdout(&self, program: &str, args: &[&str]) -> Option<String> {
        if self.runner.resolve(program).is_none() {
            debug!(program, "CLI not installed");
            return None;
        }
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        match self.runner.run_ok(program, &args, self.cli_timeout()).await {
            Ok(stdout) => Some(stdout),
            Err(err) => {
                debug!(program, error = %err, "CLI check failed");
                None
            }
        }
    }

    /// Probe URLs in order; `true` on the first healthy response.
    pub async fn probe_any(&self, urls: &[String]) -> bool {
        for url in urls {
            if self.rest.probe(url).await {
                return true;
            }
        }
        false
    }
}

/// Join a base URL and a path, without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
