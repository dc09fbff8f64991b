//! forge::azure
//!
//! Azure DevOps adapter: `az` CLI (with the `azure-devops` extension)
//! first, REST API second.
//!
//! # Coordinates
//!
//! Azure repositories live under an organization and a project, so the
//! owner is `org/project` (as produced by `parse_remote_url`). Issues are
//! work items; their tags (`System.Tags`, `;`-separated) become labels.
//!
//! # Authentication
//!
//! A personal access token from `AZURE_DEVOPS_EXT_PAT` (the variable the
//! `az devops` extension itself reads) or `AZURE_DEVOPS_TOKEN`, sent as
//! basic auth with an empty user name. Otherwise `az account show` is the
//! session check.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::context::{join_url, ProviderContext};
use super::remote::ProviderName;
use super::rest::{endpoint, RestAuth};
use super::tiers::{run_tiers, TierKind, CLI_THEN_REST};
use super::traits::{AuthStatus, ForgeError, GitProvider, IssueInfo, PrInfo, RepoTarget};

/// Preferred CLI binary.
const CLI: &str = "az";

/// Token variables, in lookup order.
const TOKEN_VARS: &[&str] = &["AZURE_DEVOPS_EXT_PAT", "AZURE_DEVOPS_TOKEN"];

/// Organization base variable.
const BASE_VARS: &[&str] = &["AZURE_DEVOPS_URL"];

/// Default Azure DevOps Services root.
const DEFAULT_BASE: &str = "https://dev.azure.com";

/// REST API version pinned for every request.
const API_VERSION: &str = "7.0";

/// Prefix of fully-qualified branch refs.
const HEADS_PREFIX: &str = "refs/heads/";

/// Azure DevOps adapter.
#[derive(Debug, Clone)]
pub struct AzureDevOpsProvider {
    ctx: ProviderContext,
}

/// Organization, project and repository of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AzureRepo<'a> {
    org: &'a str,
    project: &'a str,
    repo: &'a str,
}

impl<'a> AzureRepo<'a> {
    fn from_target(target: RepoTarget<'a>) -> Result<Self, ForgeError> {
        let (owner, repo) = target.require()?;
        let (org, project) = split_owner(owner).ok_or(ForgeError::MissingInput("project"))?;
        Ok(Self { org, project, repo })
    }
}

/// Split `org/project` into its parts.
fn split_owner(owner: &str) -> Option<(&str, &str)> {
    let (org, project) = owner.split_once('/')?;
    let project = project.trim_matches('/');
    (!org.is_empty() && !project.is_empty()).then_some((org, project))
}

/// Strip the `refs/heads/` prefix from a ref name.
fn short_ref(name: &str) -> String {
    name.strip_prefix(HEADS_PREFIX).unwrap_or(name).to_string()
}

impl AzureDevOpsProvider {
    pub fn new(ctx: ProviderContext) -> Self {
        Self { ctx }
    }

    fn base(&self) -> Option<String> {
        self.ctx
            .base_url(ProviderName::AzureDevOps, BASE_VARS, Some(DEFAULT_BASE))
    }

    fn rest_auth(&self) -> RestAuth {
        match self.ctx.token(TOKEN_VARS) {
            Some((_, token)) => RestAuth::Basic {
                user: String::new(),
                password: token,
            },
            None => RestAuth::None,
        }
    }

    /// Organization of the target, when the owner names one.
    fn organization<'a>(target: RepoTarget<'a>) -> Option<&'a str> {
        target
            .owner
            .map(|owner| owner.split('/').next().unwrap_or(owner))
            .filter(|org| !org.is_empty())
    }

    /// `--organization {base}/{org}` when the organization is known.
    fn organization_args(&self, target: RepoTarget<'_>) -> Vec<String> {
        match (Self::organization(target), self.base()) {
            (Some(org), Some(base)) => vec![
                "--organization".to_string(),
                format!("{}/{}", base, org),
            ],
            _ => Vec::new(),
        }
    }

    /// `{base}/{org}/{project}/_apis/{segments..}?api-version=7.0`
    fn api_url(&self, repo: AzureRepo<'_>, segments: &[&str]) -> Result<Url, ForgeError> {
        let base = self.base().ok_or(ForgeError::MissingInput("base URL"))?;
        let mut path = vec![repo.org, repo.project, "_apis"];
        path.extend_from_slice(segments);
        let mut url = endpoint(&base, &path)?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    /// Web URL of a PR when the response does not carry one.
    fn pr_web_url(&self, repo: AzureRepo<'_>, number: u64) -> Option<String> {
        let base = self.base()?;
        let url = endpoint(
            &base,
            &[repo.org, repo.project, "_git", repo.repo, "pullrequest", &number.to_string()],
        )
        .ok()?;
        Some(url.into())
    }

    /// Web URL of a work item when the response does not carry one.
    fn work_item_web_url(&self, repo: AzureRepo<'_>, number: u64) -> Option<String> {
        let base = self.base()?;
        let url = endpoint(
            &base,
            &[repo.org, repo.project, "_workitems", "edit", &number.to_string()],
        )
        .ok()?;
        Some(url.into())
    }

    async fn pr_via_cli(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let mut args: Vec<String> = ["repos", "pr", "show", "--id"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(number.to_string());
        args.extend(["--output".to_string(), "json".to_string()]);
        args.extend(self.organization_args(target));

        let pr: AzPullRequest = self.ctx.cli_json(CLI, &args).await?;
        let fallback = AzureRepo::from_target(target)
            .ok()
            .and_then(|repo| self.pr_web_url(repo, number));
        Ok(pr.into_info(number, fallback))
    }

    async fn pr_via_rest(&self, number: u64, target: RepoTarget<'_>) -> Result<PrInfo, ForgeError> {
        let repo = AzureRepo::from_target(target)?;
        let number_str = number.to_string();
        let url = self.api_url(
            repo,
            &["git", "repositories", repo.repo, "pullrequests", &number_str],
        )?;
        let pr: AzPullRequest = self.ctx.rest.get_json(url.as_str(), &self.rest_auth()).await?;
        Ok(pr.into_info(number, self.pr_web_url(repo, number)))
    }

    async fn issue_via_cli(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let mut args: Vec<String> = ["boards", "work-item", "show", "--id"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(number.to_string());
        args.extend(["--output".to_string(), "json".to_string()]);
        args.extend(self.organization_args(target));

        let item: AzWorkItem = self.ctx.cli_json(CLI, &args).await?;
        let fallback = AzureRepo::from_target(target)
            .ok()
            .and_then(|repo| self.work_item_web_url(repo, number));
        Ok(item.into_info(fallback))
    }

    async fn issue_via_rest(
        &self,
        number: u64,
        target: RepoTarget<'_>,
    ) -> Result<IssueInfo, ForgeError> {
        let repo = AzureRepo::from_target(target)?;
        let number_str = number.to_string();
        let url = self.api_url(repo, &["wit", "workitems", &number_str])?;
        let item: AzWorkItem = self.ctx.rest.get_json(url.as_str(), &self.rest_auth()).await?;
        Ok(item.into_info(self.work_item_web_url(repo, number)))
    }
}

#[async_trait]
impl GitProvider for AzureDevOpsProvider {
    fn name(&self) -> ProviderName {
        ProviderName::AzureDevOps
    }

    fn display_name(&self) -> &'static str {
        "Azure DevOps"
    }

    fn pr_terminology(&self) -> &'static str {
        "PR"
    }

    fn pr_refspec(&self, number: u64) -> Option<String> {
        Some(format!("pull/{}/merge", number))
    }

    fn required_cli(&self) -> Option<&'static str> {
        Some(CLI)
    }

    async fn detect_from_api(&self, base_url: &str) -> bool {
        self.ctx
            .probe_any(&[join_url(base_url, "_apis/connectionData")])
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
        if self.ctx.cli_succeeds(CLI, &["account", "show"]).await {
            return AuthStatus::CliSession { cli: CLI };
        }
        AuthStatus::Unauthenticated
    }
}

// --------------------------------------------------------------------------
// Response types
// --------------------------------------------------------------------------

/// Pull request as returned by `az repos pr show` and the REST API.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzPullRequest {
    title: String,
    source_ref_name: String,
    target_ref_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_by: Option<AzIdentity>,
    #[serde(default)]
    repository: Option<AzRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzIdentity {
    display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzRepository {
    #[serde(default)]
    web_url: Option<String>,
}

impl AzPullRequest {
    fn into_info(self, number: u64, fallback_url: Option<String>) -> PrInfo {
        let url = self
            .repository
            .and_then(|r| r.web_url)
            .map(|web| format!("{}/pullrequest/{}", web.trim_end_matches('/'), number))
            .or(fallback_url)
            .unwrap_or_default();
        PrInfo {
            title: self.title,
            head_branch: short_ref(&self.source_ref_name),
            base_branch: short_ref(&self.target_ref_name),
            url,
            body: self.description.unwrap_or_default(),
            author: self.created_by.map(|c| c.display_name),
        }
    }
}

/// Work item as returned by `az boards work-item show` and the REST API.
#[derive(Deserialize)]
struct AzWorkItem {
    fields: AzWorkItemFields,
    #[serde(default, rename = "_links")]
    links: Option<AzLinks>,
}

#[derive(Deserialize)]
struct AzWorkItemFields {
    #[serde(rename = "System.Title")]
    title: String,
    #[serde(default, rename = "System.Description")]
    description: Option<String>,
    #[serde(default, rename = "System.Tags")]
    tags: Option<String>,
}

#[derive(Deserialize)]
struct AzLinks {
    #[serde(default)]
    html: Option<AzHref>,
}

#[derive(Deserialize)]
struct AzHref {
    href: String,
}

impl AzWorkItem {
    fn into_info(self, fallback_url: Option<String>) -> IssueInfo {
        let url = self
            .links
            .and_then(|l| l.html)
            .map(|h| h.href)
            .or(fallback_url)
            .unwrap_or_default();
        let labels = self
            .fields
            .tags
            .as_deref()
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        IssueInfo {
            title: self.fields.title,
            body: self.fields.description.unwrap_or_default(),
            url,
            labels,
        }
    }
}
