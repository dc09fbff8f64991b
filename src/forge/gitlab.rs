//! forge::gitlab
//!
//! GitLab adapter: `glab` CLI first, REST API v4 second.
//!
//! Merge requests are GitLab's pull requests ("MR"). Project paths may be
//! nested (`group/subgroup/project`); the REST tier addresses projects by
//! their URL-encoded full path.
//!
//! The REST base is the instance root (`GITLAB_URL`, default
//! `https://gitlab.com`) and the token goes in the `PRIVATE-TOKEN` header.

use async_trait::async_trait;
use serde::Deserialize;

use super::context::{join_url, ProviderContext};
use super::remote::ProviderName;
use super::rest::{endpoint, RestAuth};
use super::tiers::{run_tiers, TierKind, CLI_THEN_REST};
use super::traits::{AuthStatus, ForgeError, GitProvider, IssueInfo, PrInfo, RepoTarget};

/// Preferred CLI binary.
const CLI: &str = "glab";

/// Token variables, in lookup order.
const TOKEN_VARS: &[&str] = &["GITLAB_TOKEN", "GL_TOKEN"];

/// Instance URL variable.
const BASE_VARS: &[&str] = &["GITLAB_URL"];

/// Default GitLab instance.
const DEFAULT_BASE: &str = "https://gitlab.com";

/// GitLab adapter.
#[derive(Debug, Clone)]
pub struct GitLabProvider {
    ctx: ProviderContext,
}

impl GitLabProvider {
    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }

    fn base(&self) -> Option<String> {
        self.ctx
            .base_url(ProviderName::GitLab, BASE_VARS, Some(DEFAULT_BASE))
    }

    fn rest_auth(&self) -> RestAuth {
        match self.ctx.token(TOKEN_VARS) {
            Some((_, token)) => RestAuth::Header {
                name: "PRIVATE-TOKEN",
                value: token,
            },
            None => RestAuth::None,
        }
    }

    /// `glab` arguments for a `view` subcommand.
    fn cli_args(kind: &str, number: u64, target: RepoTarget<'_>) -> Vec<String> {
        let mut args = vec![
            kind.to_string(),
            "view".to_string(),
            number.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if let Some(slug) = target.slug() {
            args.push("-R".to_string());
            args.push(slug);
        }
        args
    }

    /// `{base}/api/v4/projects/{owner%2Frepo}/{kind}/{n}`
    fn project_url(
        &self,
        target: RepoTarget<'_>,
        kind: &str,
        number: u64,
    ) -> Result<String, ForgeError> {
        let slug = target.require().map(|(owner, repo)| format!("{}/{}", owner, repo))?;
        let base = self.base().ok_or(ForgeError::MissingInput("base URL"))?;
        let number = number.to_string();
        let url = endpoint(&base, &["api", "v4", "projects", &slug, kind, &number])?;
        Ok(url.into())
    }

    async fn pr_via_cli(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let args = Self::cli_args("mr", number, target);
        let mr: GlMergeRequest = self.ctx.cli_json(CLI, &args).await?;
        Ok(mr.into())
    }

    async fn pr_via_rest(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let url = self.project_url(target, "merge_requests", number)?;
        let mr: GlMergeRequest = self.ctx.rest.get_json(&url, &self.rest_auth()).await?;
        Ok(mr.into())
    }

    async fn issue_via_cli(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let args = Self::cli_args("issue", number, target);
        let issue: GlIssue = self.ctx.cli_json(CLI, &args).await?;
        Ok(issue.into())
    }

    async fn issue_via_rest(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let url = self.project_url(target, "issues", number)?;
        let issue: GlIssue = self.ctx.rest.get_json(&url, &self.rest_auth()).await?;
        Ok(issue.into())
    }
}

#[async_trait]
impl GitProvider for GitLabProvider {
    fn name(&self) -> ProviderName {
        ProviderName::GitLab
    }

    fn display_name(&self) -> &'static str {
        "GitLab"
    }

    fn pr_terminology(&self) -> &'static str {
        "MR"
    }

    fn pr_refspec(&self, number: u64) -> Option<String> {
        Some(format!("merge-requests/{}/head", number))
    }

    fn required_cli(&self) -> Option<&'static str> {
        Some(CLI)
    }

    async fn detect_from_api(&self, base_url: &str) -> bool {
        self.ctx
            .probe_any(&[join_url(base_url, "api/v4/version")])
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

/// Merge request as returned by both `glab mr view --output json` and the
/// REST API (glab passes the API object through).
#[derive(Deserialize)]
struct GlMergeRequest {
    title: String,
    source_branch: String,
    target_branch: String,
    web_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<GlUser>,
}

#[derive(Deserialize)]
struct GlUser {
    username: String,
}

/// Issue as returned by `glab issue view --output json` and the REST API.
#[derive(Deserialize)]
struct GlIssue {
    title: String,
    #[serde(default)]
    description: Option<String>,
    web_url: String,
    #[serde(default)]
    labels: Vec<String>,
}

impl From<GlMergeRequest> for PrInfo {
    fn from(mr: GlMergeRequest) -> Self {
        PrInfo {
            title: mr.title,
            head_branch: mr.source_branch,
            base_branch: mr.target_branch,
            url: mr.web_url,
            body: mr.description.unwrap_or_default(),
            author: mr.author.map(|a| a.username),
        }
    }
}

impl From<GlIssue> for IssueInfo {
    fn from(issue: GlIssue) -> Self {
        IssueInfo {
            title: issue.title,
            body: issue.description.unwrap_or_default(),
            url: issue.web_url,
            labels: issue.labels,
        }
    }
}
