//! forge::github
//!
//! GitHub adapter: `gh` CLI first, REST API second.
//!
//! # Tiers
//!
//! 1. `gh pr view N --json ...` / `gh issue view N --json ...`. Works
//!    without owner/repo because `gh` infers the repository from the
//!    working directory; `-R owner/repo` is passed when both are known.
//! 2. `GET {api}/repos/{owner}/{repo}/pulls/{n}` (or `/issues/{n}`) with a
//!    bearer token from `GH_TOKEN` or `GITHUB_TOKEN`. The API base is
//!    `GITHUB_API_URL`, defaulting to `https://api.github.com`.
//!
//! # Enterprise detection
//!
//! GitHub Enterprise Server answers `GET {base}/api/v3/meta`; some proxies
//! expose the API at the root, so `{base}/meta` is tried second.

use async_trait::async_trait;
use serde::Deserialize;

use super::context::{join_url, ProviderContext};
use super::remote::ProviderName;
use super::rest::{endpoint, RestAuth};
use super::tiers::{run_tiers, TierKind, CLI_THEN_REST};
use super::traits::{AuthStatus, ForgeError, GitProvider, IssueInfo, PrInfo, RepoTarget};

/// Preferred CLI binary.
const CLI: &str = "gh";

/// Token variables, in lookup order.
const TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];

/// API base variable.
const BASE_VARS: &[&str] = &["GITHUB_API_URL"];

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Fields requested from `gh pr view`.
const PR_FIELDS: &str = "title,headRefName,baseRefName,url,body,author";

/// Fields requested from `gh issue view`.
const ISSUE_FIELDS: &str = "title,body,url,labels";

/// GitHub adapter.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    ctx: ProviderContext,
}

impl GitHubProvider {
    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }

    fn api_base(&self) -> Option<String> {
        self.ctx
            .base_url(ProviderName::GitHub, BASE_VARS, Some(DEFAULT_API_BASE))
    }

    fn rest_auth(&self) -> RestAuth {
        match self.ctx.token(TOKEN_VARS) {
            Some((_, token)) => RestAuth::Bearer(token),
            None => RestAuth::None,
        }
    }

    /// `gh` arguments for a `view` subcommand.
    fn cli_args(kind: &str, number: u64, fields: &str, target: RepoTarget<'_>) -> Vec<String> {
        let mut args = vec![
            kind.to_string(),
            "view".to_string(),
            number.to_string(),
            "--json".to_string(),
            fields.to_string(),
        ];
        if let Some(slug) = target.slug() {
            args.push("-R".to_string());
            args.push(slug);
        }
        args
    }

    async fn pr_via_cli(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let args = Self::cli_args("pr", number, PR_FIELDS, target);
        let pr: GhCliPullRequest = self.ctx.cli_json(CLI, &args).await?;
        Ok(pr.into())
    }

    async fn pr_via_rest(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let (owner, repo) = target.require()?;
        let base = self.api_base().ok_or(ForgeError::MissingInput("base URL"))?;
        let number = number.to_string();
        let url = endpoint(&base, &["repos", owner, repo, "pulls", &number])?;
        let pr: GhPullRequest = self.ctx.rest.get_json(url.as_str(), &self.rest_auth()).await?;
        Ok(pr.into())
    }

    async fn issue_via_cli(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let args = Self::cli_args("issue", number, ISSUE_FIELDS, target);
        let issue: GhCliIssue = self.ctx.cli_json(CLI, &args).await?;
        Ok(issue.into())
    }

    async fn issue_via_rest(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let (owner, repo) = target.require()?;
        let base = self.api_base().ok_or(ForgeError::MissingInput("base URL"))?;
        let number = number.to_string();
        let url = endpoint(&base, &["repos", owner, repo, "issues", &number])?;
        let issue: GhIssue = self.ctx.rest.get_json(url.as_str(), &self.rest_auth()).await?;
        Ok(issue.into())
    }
}

#[async_trait]
impl GitProvider for GitHubProvider {
    fn name(&self) -> ProviderName {
        ProviderName::GitHub
    }

    fn display_name(&self) -> &'static str {
        "GitHub"
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

    async fn detect_from_api(&self, base_url: &str) -> bool {
        self.ctx
            .probe_any(&[join_url(base_url, "api/v3/meta"), join_url(base_url, "meta")])
            .await
    }

    async fn fetch_pr(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        run_tiers(self.name(), CLI_THEN_REST, move |tier| async move {
            match tier {
                TierKind::Cli => self.pr_via_cli(number, target).await,
                TierKind::Rest => self.pr_via_rest(number, target).await,
            }
        })
        .await
    }

    async fn fetch_issue(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        run_tiers(self.name(), CLI_THEN_REST, move |tier| async move {
            match tier {
                TierKind::Cli => self.issue_via_cli(number, target).await,
                TierKind::Rest => self.issue_via_rest(number, target).await,
            }
        })
        .await
    }

    async fn auth_status(&self) -> AuthStatus {
        if let Some((env, _)) = self.ctx.token(TOKEN_VARS) {
            return AuthStatus::Token { env };
        }
        if self.ctx.cli_succeeds(CLI, &["auth", "status"]).await {
            return AuthStatus::CliSession { cli: CLI };
        }
        AuthStatus::Unauthenticated
    }
}

// --------------------------------------------------------------------------
// Response types
// --------------------------------------------------------------------------

/// `gh pr view --json` output.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhCliPullRequest {
    title: String,
    head_ref_name: String,
    base_ref_name: String,
    url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    author: Option<GhCliAuthor>,
}

#[derive(Deserialize)]
struct GhCliAuthor {
    login: String,
}

/// `gh issue view --json` output.
#[derive(Deserialize)]
struct GhCliIssue {
    title: String,
    #[serde(default)]
    body: Option<String>,
    url: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
}

/// REST pull request (subset).
#[derive(Deserialize)]
struct GhPullRequest {
    title: String,
    head: GhRef,
    base: GhRef,
    html_url: String,
    body: Option<String>,
    user: Option<GhUser>,
}

/// REST ref (head/base) format.
#[derive(Deserialize)]
struct GhRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Deserialize)]
struct GhUser {
    login: String,
}

/// REST issue (subset).
#[derive(Deserialize)]
struct GhIssue {
    title: String,
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
}

/// Label as returned by both `gh` and the REST API.
#[derive(Deserialize)]
struct GhLabel {
    name: String,
}

impl From<GhCliPullRequest> for PrInfo {
    fn from(pr: GhCliPullRequest) -> Self {
        PrInfo {
            title: pr.title,
            head_branch: pr.head_ref_name,
            base_branch: pr.base_ref_name,
            url: pr.url,
            body: pr.body.unwrap_or_default(),
            author: pr.author.map(|a| a.login),
        }
    }
}

impl From<GhPullRequest> for PrInfo {
    fn from(pr: GhPullRequest) -> Self {
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

impl From<GhCliIssue> for IssueInfo {
    fn from(issue: GhCliIssue) -> Self {
        IssueInfo {
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            url: issue.url,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

impl From<GhIssue> for IssueInfo {
    fn from(issue: GhIssue) -> Self {
        IssueInfo {
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            url: issue.html_url,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}
