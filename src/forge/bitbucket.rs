//! forge::bitbucket
//!
//! Bitbucket Cloud adapter. Bitbucket has no official CLI, so the only
//! tier is the REST API 2.0.
//!
//! Credentials, in order:
//! - `BITBUCKET_TOKEN` (repository/workspace access token, bearer)
//! - `BITBUCKET_USERNAME` + `BITBUCKET_APP_PASSWORD` (basic auth)
//!
//! Public repositories can be read anonymously.

use async_trait::async_trait;
use serde::Deserialize;

use super::context::{join_url, ProviderContext};
use super::remote::ProviderName;
use super::rest::{endpoint, RestAuth};
use super::tiers::{run_tiers, TierKind, REST_ONLY};
use super::traits::{AuthStatus, ForgeError, GitProvider, IssueInfo, PrInfo, RepoTarget};

/// Access-token variable.
const TOKEN_VARS: &[&str] = &["BITBUCKET_TOKEN"];

/// App-password credential pair.
const USERNAME_VAR: &str = "BITBUCKET_USERNAME";
const APP_PASSWORD_VAR: &str = "BITBUCKET_APP_PASSWORD";

/// API base variable.
const BASE_VARS: &[&str] = &["BITBUCKET_API_URL"];

/// Default Bitbucket Cloud API base.
const DEFAULT_API_BASE: &str = "https://api.bitbucket.org/2.0";

/// Bitbucket adapter.
#[derive(Debug, Clone)]
pub struct BitbucketProvider {
    ctx: ProviderContext,
}

impl BitbucketProvider {
    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }

    fn rest_auth(&self) -> RestAuth {
        if let Some((_, token)) = self.ctx.token(TOKEN_VARS) {
            return RestAuth::Bearer(token);
        }
        match (
            self.ctx.env.get(USERNAME_VAR),
            self.ctx.env.get(APP_PASSWORD_VAR),
        ) {
            (Some(user), Some(password)) => RestAuth::Basic {
                user: user.to_string(),
                password: password.to_string(),
            },
            _ => RestAuth::None,
        }
    }

    /// `{api}/repositories/{workspace}/{repo}/{kind}/{n}`
    fn repository_url(
        &self,
        target: RepoTarget<'_>,
        kind: &str,
        number: u64,
    ) -> Result<String, ForgeError> {
        let (workspace, repo) = target.require()?;
        let base = self
            .ctx
            .base_url(ProviderName::Bitbucket, BASE_VARS, Some(DEFAULT_API_BASE))
            .ok_or(ForgeError::MissingInput("base URL"))?;
        let number = number.to_string();
        let url = endpoint(&base, &["repositories", workspace, repo, kind, &number])?;
        Ok(url.into())
    }

    async fn pr_via_rest(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let url = self.repository_url(target, "pullrequests", number)?;
        let pr: BbPullRequest = self.ctx.rest.get_json(&url, &self.rest_auth()).await?;
        Ok(pr.into())
    }

    async fn issue_via_rest(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let url = self.repository_url(target, "issues", number)?;
        let issue: BbIssue = self.ctx.rest.get_json(&url, &self.rest_auth()).await?;
        Ok(issue.into())
    }
}

#[async_trait]
impl GitProvider for BitbucketProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Bitbucket
    }

    fn display_name(&self) -> &'static str {
        "Bitbucket"
    }

    fn pr_terminology(&self) -> &'static str {
        "pull request"
    }

    fn required_cli(&self) -> Option<&'static str> {
        None
    }

    /// Bitbucket Server/Data Center first, then the Cloud API shape.
    async fn detect_from_api(&self, base_url: &str) -> bool {
        self.ctx
            .probe_any(&[
                join_url(base_url, "rest/api/1.0/application-properties"),
                join_url(base_url, "2.0/repositories"),
            ])
            .await
    }

    async fn fetch_pr(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        run_tiers(self.name(), REST_ONLY, move |tier| async move {
            match tier {
                TierKind::Rest => self.pr_via_rest(number, target).await,
                TierKind::Cli => Err(ForgeError::Unavailable("no Bitbucket CLI".into())),
            }
        })
        .await
    }

    async fn fetch_issue(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        run_tiers(self.name(), REST_ONLY, move |tier| async move {
            match tier {
                TierKind::Rest => self.issue_via_rest(number, target).await,
                TierKind::Cli => Err(ForgeError::Unavailable("no Bitbucket CLI".into())),
            }
        })
        .await
    }

    async fn auth_status(&self) -> AuthStatus {
        if let Some((env, _)) = self.ctx.token(TOKEN_VARS) {
            return AuthStatus::Token { env };
        }
        if self.ctx.env.get(USERNAME_VAR).is_some() && self.ctx.env.get(APP_PASSWORD_VAR).is_some()
        {
            return AuthStatus::Token {
                env: APP_PASSWORD_VAR,
            };
        }
        AuthStatus::Unauthenticated
    }
}

// --------------------------------------------------------------------------
// Response types
// --------------------------------------------------------------------------

#[derive(Deserialize)]
struct BbPullRequest {
    title: String,
    source: BbEndpoint,
    destination: BbEndpoint,
    links: BbLinks,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<BbAccount>,
}

/// `source` / `destination` of a pull request.
#[derive(Deserialize)]
struct BbEndpoint {
    branch: BbBranch,
}

#[derive(Deserialize)]
struct BbBranch {
    name: String,
}

#[derive(Deserialize)]
struct BbLinks {
    html: BbHref,
}

#[derive(Deserialize)]
struct BbHref {
    href: String,
}

#[derive(Deserialize)]
struct BbAccount {
    display_name: String,
}

#[derive(Deserialize)]
struct BbIssue {
    title: String,
    #[serde(default)]
    content: Option<BbContent>,
    links: BbLinks,
    /// bug, enhancement, proposal or task
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct BbContent {
    #[serde(default)]
    raw: Option<String>,
}

impl From<BbPullRequest> for PrInfo {
    fn from(pr: BbPullRequest) -> Self {
        PrInfo {
            title: pr.title,
            head_branch: pr.source.branch.name,
            base_branch: pr.destination.branch.name,
            url: pr.links.html.href,
            body: pr.description.unwrap_or_default(),
            author: pr.author.map(|a| a.display_name),
        }
    }
}

impl From<BbIssue> for IssueInfo {
    fn from(issue: BbIssue) -> Self {
        IssueInfo {
            title: issue.title,
            body: issue.content.and_then(|c| c.raw).unwrap_or_default(),
            url: issue.links.html.href,
            labels: issue.kind.into_iter().collect(),
        }
    }
}
