//! cli
//!
//! Command-line interface layer for forgekit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and build the invocation [`Context`]
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that call into [`crate::forge`]. Adapters collapse their
//! failures to "absent", so handlers turn an absent result into an error
//! and a non-zero exit status.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::forge::{ProviderContext, ProviderRegistry};
use crate::ui::output::Verbosity;

/// Per-invocation settings shared by all handlers.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory whose repository is inspected
    pub cwd: PathBuf,
    pub verbosity: Verbosity,
    /// Print JSON instead of text
    pub json: bool,
    pub config: Config,
}

impl Context {
    /// Build a context from parsed flags, loading the config file.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = match &cli.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let config = Config::load().context("Failed to load configuration")?;

        Ok(Self {
            cwd,
            verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
            json: cli.json,
            config,
        })
    }

    /// Provider registry backed by the real environment.
    pub fn registry(&self) -> ProviderRegistry {
        ProviderRegistry::new(ProviderContext::from_env(self.config.clone()))
    }
}

/// Run the CLI application with already-parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::from_cli(&cli)?;
    commands::dispatch(cli.command, &ctx)
}
