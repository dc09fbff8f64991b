//! forge::traits
//!
//! The capability contract shared by every provider adapter.
//!
//! # Design
//!
//! Adapters implement the typed methods (`fetch_pr`, `fetch_issue`,
//! `auth_status`) which report *why* a lookup failed through [`ForgeError`].
//! Callers normally use the provided methods (`view_pr`, `view_issue`,
//! `check_auth`), which collapse every failure into `None`/`false`:
//!
//! - An absent result means "could not retrieve", never "confirmed missing".
//! - Nothing crosses the adapter boundary as an error.
//! - The failure reason is logged at `debug` level.
//!
//! # Example
//!
//! ```ignore
//! use forgekit::forge::{GitProvider, ProviderRegistry};
//!
//! async fn show(registry: &ProviderRegistry) {
//!     if let Some(provider) = registry.provider_from_cwd() {
//!         if let Some(pr) = provider.view_pr(42, None, None).await {
//!             println!("{} ({} -> {})", pr.title, pr.head_branch, pr.base_branch);
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::remote::{detect_provider, ProviderName};

/// Why a lookup failed inside an adapter.
///
/// These never escape [`GitProvider::view_pr`] and friends; they exist so
/// tests and diagnostics can tell a missing tool from an empty answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// The PR/issue number was zero or negative.
    #[error("invalid number {0}: must be a positive integer")]
    InvalidNumber(i64),

    /// A tier needs an input the caller did not provide (owner, repo, base URL).
    #[error("missing {0}")]
    MissingInput(&'static str),

    /// The tier cannot run here (CLI not installed, tier skipped).
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Network failure or timeout.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// Credentials were rejected or are missing.
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    /// The provider reported nothing for this request (or the CLI failed).
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an unexpected status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The tool or API answered with something we could not parse.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ForgeError {
    /// How much this error says about the remote side.
    ///
    /// When every tier fails, the chain reports the highest-ranked error so
    /// "token rejected" is not masked by "CLI not installed".
    pub fn rank(&self) -> u8 {
        match self {
            ForgeError::InvalidNumber(_) => 5,
            ForgeError::Unauthenticated(_) => 4,
            ForgeError::Unreachable(_) => 3,
            ForgeError::NotFound(_) | ForgeError::Api { .. } => 2,
            ForgeError::Parse(_) => 1,
            ForgeError::MissingInput(_) | ForgeError::Unavailable(_) => 0,
        }
    }
}

/// Pull/merge request snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrInfo {
    pub title: String,
    pub head_branch: String,
    pub base_branch: String,
    /// Web URL for viewing
    pub url: String,
    /// Description (empty when the provider has none)
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Issue (or Azure work item) snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueInfo {
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// How (or whether) the current user is authenticated with a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum AuthStatus {
    /// A token was found in this environment variable.
    Token { env: &'static str },
    /// The provider CLI reported a logged-in session.
    CliSession { cli: &'static str },
    /// Neither check succeeded.
    Unauthenticated,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthStatus::Unauthenticated)
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthStatus::Token { env } => write!(f, "authenticated (token from ${})", env),
            AuthStatus::CliSession { cli } => write!(f, "authenticated ({} session)", cli),
            AuthStatus::Unauthenticated => write!(f, "not authenticated"),
        }
    }
}

/// Repository a lookup is aimed at.
///
/// Both parts are optional: CLI tiers can infer the repository from the
/// working directory, REST tiers cannot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoTarget<'a> {
    pub owner: Option<&'a str>,
    pub repo: Option<&'a str>,
}

impl<'a> RepoTarget<'a> {
    /// Build a target; blank strings count as absent.
    pub fn new(owner: Option<&'a str>, repo: Option<&'a str>) -> Self {
        let clean = |s: Option<&'a str>| s.map(str::trim).filter(|s| !s.is_empty());
        Self {
            owner: clean(owner),
            repo: clean(repo),
        }
    }

    /// Both owner and repo, or `MissingInput`.
    pub fn require(&self) -> Result<(&'a str, &'a str), ForgeError> {
        let owner = self.owner.ok_or(ForgeError::MissingInput("owner"))?;
        let repo = self.repo.ok_or(ForgeError::MissingInput("repo"))?;
        Ok((owner, repo))
    }

    /// `owner/repo` when both parts are known.
    pub fn slug(&self) -> Option<String> {
        match (self.owner, self.repo) {
            (Some(owner), Some(repo)) => Some(format!("{}/{}", owner, repo)),
            _ => None,
        }
    }
}

/// Validate a user-supplied PR/issue number.
pub fn validate_number(number: i64) -> Result<u64, ForgeError> {
    u64::try_from(number)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ForgeError::InvalidNumber(number))
}

/// Capability contract for a git hosting provider.
///
/// Adapters are stateless: they hold shared handles (process runner, HTTP
/// client, environment snapshot) but no mutable data, so one instance can
/// serve concurrent lookups.
///
/// # Retrieval
///
/// `fetch_pr` and `fetch_issue` try the adapter's tiers in order (usually
/// the provider CLI, then the REST API) and stop at the first success.
/// The provided `view_*` methods reject non-positive numbers before any
/// I/O and turn every failure into `None`.
#[async_trait]
pub trait GitProvider: Send + Sync {
    /// Provider identity.
    fn name(&self) -> ProviderName;

    /// Human-readable name (e.g. "GitLab").
    fn display_name(&self) -> &'static str;

    /// What this provider calls a pull request ("PR", "MR", "pull request").
    fn pr_terminology(&self) -> &'static str;

    /// Refspec that fetches the head of a PR, for providers that expose
    /// PRs as special refs rather than only as branches.
    fn pr_refspec(&self, _number: u64) -> Option<String> {
        None
    }

    /// Binary name of the preferred CLI. Does not check installation.
    fn required_cli(&self) -> Option<&'static str>;

    /// Whether a remote URL belongs to this provider (hostname heuristics).
    fn detect_from_remote(&self, url: &str) -> bool {
        detect_provider(url) == self.name()
    }

    /// Probe a self-hosted instance's version endpoint.
    ///
    /// Returns `true` only on a healthy HTTP response; network errors are
    /// reported as `false`.
    async fn detect_from_api(&self, base_url: &str) -> bool;

    /// Fetch a PR through the tier chain.
    async fn fetch_pr(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError>;

    /// Fetch an issue through the tier chain.
    async fn fetch_issue(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError>;

    /// Token environment variable first, then a bounded CLI check.
    async fn auth_status(&self) -> AuthStatus;

    /// Fetch a PR, collapsing every failure into `None`.
    async fn view_pr(
        &self,
        number: i64,
        owner: Option<&str>,
        repo: Option<&str>,
    ) -> Option<PrInfo> {
        let result = match validate_number(number) {
            Ok(n) => self.fetch_pr(n, RepoTarget::new(owner, repo)).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(pr) => Some(pr),
            Err(err) => {
                debug!(provider = %self.name(), number, error = %err, "PR lookup failed");
                None
            }
        }
    }

    /// Fetch an issue, collapsing every failure into `None`.
    async fn view_issue(
        &self,
        number: i64,
        owner: Option<&str>,
        repo: Option<&str>,
    ) -> Option<IssueInfo> {
        let result = match validate_number(number) {
            Ok(n) => self.fetch_issue(n, RepoTarget::new(owner, repo)).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(issue) => Some(issue),
            Err(err) => {
                debug!(provider = %self.name(), number, error = %err, "issue lookup failed");
                None
            }
        }
    }

    /// Whether any authentication method is available.
    async fn check_auth(&self) -> bool {
        self.auth_status().await.is_authenticated()
    }
}
