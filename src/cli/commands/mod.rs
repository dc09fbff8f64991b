//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves defaults (remote URL, owner, repository, provider) from the
//!    working directory and configuration
//! 2. Calls into [`crate::forge`]
//! 3. Formats and displays output (text, or JSON with `--json`)
//!
//! # Async Commands
//!
//! Lookups, auth checks and probes involve subprocesses and network I/O.
//! Their handlers build a tokio runtime and `block_on` the adapter call.

mod auth;
mod completion;
mod config_cmd;
mod detect;
mod lookup;
mod parse;
mod probe;
mod providers;

pub use auth::auth;
pub use completion::completion;
pub use config_cmd::config;
pub use detect::detect;
pub use lookup::{issue, pr};
pub use parse::parse;
pub use probe::probe;
pub use providers::providers;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::args::Command;
use super::Context;
use crate::forge::workdir;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Detect { url } => detect(ctx, url.as_deref()),
        Command::Parse { url } => parse(ctx, url.as_deref()),
        Command::Pr(args) => pr(ctx, &args),
        Command::Issue(args) => issue(ctx, &args),
        Command::Auth { provider } => auth(ctx, provider),
        Command::Probe { base_url, provider } => probe(ctx, &base_url, provider),
        Command::Providers => providers(ctx),
        Command::Config => config(ctx),
        Command::Completion { shell } => completion(shell),
    }
}

/// The URL given on the command line, or the working directory's remote.
fn remote_url(ctx: &Context, url: Option<&str>) -> Result<String> {
    if let Some(url) = url {
        return Ok(url.to_string());
    }
    match workdir::remote_url_at(&ctx.cwd, ctx.config.remote()) {
        Some(url) => Ok(url),
        None => bail!(
            "No remote URL found in {} (looked for remote '{}'). Pass a URL explicitly.",
            ctx.cwd.display(),
            ctx.config.remote()
        ),
    }
}

/// Runtime for the async adapter calls.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
