//! forgekit - Git hosting provider detection and metadata lookup
//!
//! forgekit recognizes which service hosts a repository (GitHub, GitLab,
//! Bitbucket, Azure DevOps, Gitea, Forgejo) from its remote URL, splits the
//! URL into host, owner and repository, and fetches pull request, issue and
//! authentication metadata through each provider's CLI with a REST API
//! fallback.
//!
//! # Architecture
//!
//! - [`forge`] - URL detection and parsing, provider adapters, registry
//! - [`core`] - Configuration
//! - [`cli`] - Command-line interface (`fk`)
//! - [`ui`] - Terminal output helpers
//!
//! # Failure model
//!
//! Adapter lookups never surface errors to callers. A PR, issue or auth
//! check that cannot be completed yields "absent" (`None` or `false`), and
//! the underlying cause is logged through `tracing`.

pub mod cli;
pub mod core;
pub mod forge;
pub mod ui;
