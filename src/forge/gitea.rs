//! forge::gitea
//!
//! Gitea and Forgejo adapter.
//!
//! Forgejo is a Gitea fork whose API is a superset of Gitea's, so one
//! implementation serves both; [`GiteaFlavor`] selects the identity and the
//! environment variables. Both are self-hosted, so there is no default base
//! URL: without `GITEA_URL`/`FORGEJO_URL` (or a `[providers.*].url` config
//! entry) the REST tier is skipped.
//!
//! # Tiers
//!
//! 1. `tea api repos/{owner}/{repo}/pulls/{n}`: the `tea` CLI proxies the
//!    REST API with its stored login, so its output has the REST shape.
//! 2. `GET {base}/api/v1/repos/{owner}/{repo}/pulls/{n}` with
//!    `Authorization: token ...`.

use async_trait::async_trait;
use serde::Deserialize;

use super::context::{join_url, ProviderContext};
use super::remote::ProviderName;
use super::rest::{endpoint, RestAuth};
use super::tiers::{run_tiers, TierKind, CLI_THEN_REST};
use super::traits::{AuthStatus, ForgeError, GitProvider, IssueInfo, PrInfo, RepoTarget};

/// CLI shared by both flavors.
const CLI: &str = "tea";

/// Which member of the Gitea family an adapter speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiteaFlavor {
    Gitea,
    Forgejo,
}

impl GiteaFlavor {
    fn name(self) -> ProviderName {
        match self {
            GiteaFlavor::Gitea => ProviderName::Gitea,
            GiteaFlavor::Forgejo => ProviderName::Forgejo,
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            GiteaFlavor::Gitea => "Gitea",
            GiteaFlavor::Forgejo => "Forgejo",
        }
    }

    /// Token variables, in lookup order.
    fn token_vars(self) -> &'static [&'static str] {
        match self {
            GiteaFlavor::Gitea => &["GITEA_TOKEN"],
            GiteaFlavor::Forgejo => &["FORGEJO_TOKEN", "GITEA_TOKEN"],
        }
    }

    /// Base URL variables, in lookup order.
    fn base_vars(self) -> &'static [&'static str] {
        match self {
            GiteaFlavor::Gitea => &["GITEA_URL"],
            GiteaFlavor::Forgejo => &["FORGEJO_URL", "GITEA_URL"],
        }
    }
}

/// Gitea/Forgejo adapter.
#[derive(Debug, Clone)]
pub struct GiteaProvider {
    ctx: ProviderContext,
    flavor: GiteaFlavor,
}

impl GiteaProvider {
    pub fn new(ctx: ProviderContext, flavor: GiteaFlavor) -> Self {
        Self { ctx, flavor }
    }

    pub fn gitea(ctx: ProviderContext) -> Self {
        Self::new(ctx, GiteaFlavor::Gitea)
    }

    pub fn forgejo(ctx: ProviderContext) -> Self {
        Self::new(ctx, GiteaFlavor::Forgejo)
    }

    pub fn flavor(&self) -> GiteaFlavor {
        self.flavor
    }

    fn base(&self) -> Option<String> {
        self.ctx
            .base_url(self.flavor.name(), self.flavor.base_vars(), None)
    }

    fn rest_auth(&self) -> RestAuth {
        match self.ctx.token(self.flavor.token_vars()) {
            Some((_, token)) => RestAuth::Token(token),
            None => RestAuth::None,
        }
    }

    async fn via_cli<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<T, ForgeError> {
        let (owner, repo) = target.require()?;
        let args = vec![
            "api".to_string(),
            format!("repos/{}/{}/{}/{}", owner, repo, kind, number),
        ];
        self.ctx.cli_json(CLI, &args).await
    }

    async fn via_rest<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<T, ForgeError> {
        let base = self.base().ok_or(ForgeError::MissingInput("base URL"))?;
        let (owner, repo) = target.require()?;
        let number = number.to_string();
        let url = endpoint(&base, &["api", "v1", "repos", owner, repo, kind, &number])?;
        self.ctx.rest.get_json(url.as_str(), &self.rest_auth()).await
    }
}

#[async_trait]
impl GitProvider for GiteaProvider {
    fn name(&self) -> ProviderName {
        self.flavor.name()
    }

    fn display_name(&self) -> &'static str {
        self.flavor.display_name()
    }

    fn pr_terminology(&self) -> &'static str {
        "PR"
    }

    fn pr_refspec(&self, number: u64) -> Option<String> {
        Some(format!("pull/{}/head", number))
    }

    fn required_cli(&self) -> Option<&'static str> {
        Some(CLI)
    }

    /// Forgejo's own version endpoint first, then the shared Gitea one.
    async fn detect_from_api(&self, base_url: &str) -> bool {
        self.ctx
            .probe_any(&[
                join_url(base_url, "api/forgejo/v1/version"),
                join_url(base_url, "api/v1/version"),
            ])
            .await
    }

    async fn fetch_pr(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let pr: GtPullRequest = run_tiers(self.name(), CLI_THEN_REST, move |tier| async move {
            match tier {
                TierKind::Cli => self.via_cli("pulls", number, target).await,
                TierKind::Rest => self.via_rest("pulls", number, target).await,
            }
        })
        .await?;
        Ok(pr.into())
    }

    async fn fetch_issue(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let issue: GtIssue = run_tiers(self.name(), CLI_THEN_REST, move |tier| async move {
            match tier {
                TierKind::Cli => self.via_cli("issues", number, target).await,
                TierKind::Rest => self.via_rest("issues", number, target).await,
            }
        })
        .await?;
        Ok(issue.into())
    }

    async fn auth_status(&self) -> AuthStatus {
        if let Some((env, _)) = self.ctx.token(self.flavor.token_vars()) {
            return AuthStatus::Token { env };
        }
        match self.ctx.cli_stdout(CLI, &["login", "list"]).await {
            Some(stdout) if has_logins(&stdout) => AuthStatus::CliSession { cli: CLI },
            _ => AuthStatus::Unauthenticated,
        }
    }
}

/// Whether `tea login list` output contains at least one login row.
///
/// The table has a header row (`NAME  URL  SSHHOST ...`) and optional
/// border lines; anything else is a login.
fn has_logins(stdout: &str) -> bool {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.chars().all(|c| matches!(c, '-' | '+' | '|' | '=' | ' ')))
        .any(|line| {
            let first = line.trim_start_matches('|').split_whitespace().next();
            !matches!(first, Some(word) if word.eq_ignore_ascii_case("name"))
        })
}

// --------------------------------------------------------------------------
// Response types
// --------------------------------------------------------------------------

#[derive(Deserialize)]
struct GtPullRequest {
    title: String,
    head: GtBranch,
    base: GtBranch,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<GtUser>,
}

#[derive(Deserialize)]
struct GtBranch {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Deserialize)]
struct GtUser {
    login: String,
}

#[derive(Deserialize)]
struct GtIssue {
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    labels: Vec<GtLabel>,
}

#[derive(Deserialize)]
struct GtLabel {
    name: String,
}

impl From<GtPullRequest> for PrInfo {
    fn from(pr: GtPullRequest) -> Self {
        PrInfo {
            title: pr.title,
            head_branch: pr.head.ref_name,
            base_branch: pr.base.ref_name,
            url: pr.html_url,
            body: pr.body.unwrap_or_default(),
            author: pr.user.map(|u| u.login),
        }
    }
}

impl From<GtIssue> for IssueInfo {
    fn from(issue: GtIssue) -> Self {
        IssueInfo {
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            url: issue.html_url,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}
