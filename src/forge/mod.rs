//! forge
//!
//! Git hosting provider abstraction.
//!
//! # Architecture
//!
//! Given a remote URL, [`detect_provider`] names the hosting service and
//! [`parse_remote_url`] splits it into host, owner path and repository.
//! The [`ProviderRegistry`] maps a [`ProviderName`] to an adapter
//! implementing [`GitProvider`], which fetches PR, issue and auth metadata
//! through an ordered chain of tiers (provider CLI, then REST API).
//!
//! Adapter failures never cross the trait boundary as errors: `view_pr`,
//! `view_issue` and `check_auth` return `None`/`false`, and the typed
//! [`ForgeError`] behind them is logged at `debug` level.
//!
//! # Modules
//!
//! - `remote`: URL detection and parsing (pure, no I/O)
//! - `traits`: [`GitProvider`] contract and the data model
//! - `tiers`: CLI-then-REST fallback chain
//! - `process`, `rest`: subprocess and HTTP hosts used by the tiers
//! - `context`: shared handles injected into adapters
//! - [`github`], [`gitlab`], [`bitbucket`], [`azure`], [`gitea`]: adapters
//! - `registry`, `workdir`: provider lookup and working-directory helpers
//! - [`mock`]: scripted command runner for deterministic testing
//!
//! # Example
//!
//! ```
//! use forgekit::forge::{detect_provider, parse_remote_url, ProviderName};
//!
//! assert_eq!(detect_provider("git@github.com:user/repo.git"), ProviderName::GitHub);
//!
//! let info = parse_remote_url("https://gitlab.com/group/subgroup/repo.git").unwrap();
//! assert_eq!(info.owner, "group/subgroup");
//! assert_eq!(info.repo, "repo");
//! ```

pub mod azure;
pub mod bitbucket;
mod context;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod mock;
mod process;
mod registry;
mod remote;
mod rest;
mod tiers;
mod traits;
pub mod workdir;

pub use context::{EnvVars, ProviderContext};
pub use process::{CommandOutput, CommandRunner, ProcessError, SystemRunner};
pub use registry::{ProviderHandle, ProviderRegistry};
pub use remote::{detect_provider, parse_remote_url, ProviderName, RemoteUrlInfo};
pub use rest::{RestAuth, RestClient};
pub use tiers::{run_tiers, TierKind, CLI_THEN_REST, REST_ONLY};
pub use traits::*;
