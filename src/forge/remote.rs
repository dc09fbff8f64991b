//! forge::remote
//!
//! Provider detection and remote URL parsing.
//!
//! # Design
//!
//! Detection and structural parsing are deliberately separate:
//! - [`detect_provider`] classifies a URL by ordered substring checks and
//!   never fails (anything unrecognized is [`ProviderName::Unknown`]).
//! - [`parse_remote_url`] decomposes a URL into host, owner path and repo
//!   name, then fills the provider by re-running detection on the same
//!   input. A self-hosted host can therefore be parsed even when its
//!   provider cannot be identified.
//!
//! Both functions are pure and perform no I/O.
//!
//! # Supported Grammars
//!
//! - `https://dev.azure.com/{org}/{project}/_git/{repo}`
//! - `https://{org}.visualstudio.com/{project}/_git/{repo}`
//! - `git@ssh.dev.azure.com:v3/{org}/{project}/{repo}`
//! - `https://{host}/{owner-path}/{repo}[.git]`
//! - `git@{host}:{owner-path}/{repo}[.git]`
//! - `ssh://git@{host}/{owner-path}/{repo}[.git]`
//!
//! `owner-path` may have any number of segments (GitLab subgroups).
//!
//! # Example
//!
//! ```
//! use forgekit::forge::{parse_remote_url, ProviderName};
//!
//! let info = parse_remote_url("git@gitlab.com:group/subgroup/repo.git").unwrap();
//! assert_eq!(info.provider, ProviderName::GitLab);
//! assert_eq!(info.owner, "group/subgroup");
//! assert_eq!(info.repo, "repo");
//! ```

use serde::Serialize;

/// Host used for Azure DevOps HTTPS and SSH remotes.
const AZURE_HOST: &str = "dev.azure.com";

/// Known git hosting providers.
///
/// Forgejo and Gitea are distinct names but share one adapter because
/// Forgejo's API is a superset of Gitea's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderName {
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "gitlab")]
    GitLab,
    Bitbucket,
    #[serde(rename = "azure-devops")]
    AzureDevOps,
    Gitea,
    Forgejo,
    Unknown,
}

impl ProviderName {
    /// Every provider that has an adapter, in detection order.
    pub const ALL: [ProviderName; 6] = [
        ProviderName::AzureDevOps,
        ProviderName::GitHub,
        ProviderName::GitLab,
        ProviderName::Bitbucket,
        ProviderName::Gitea,
        ProviderName::Forgejo,
    ];

    /// Canonical lowercase name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::GitHub => "github",
            ProviderName::GitLab => "gitlab",
            ProviderName::Bitbucket => "bitbucket",
            ProviderName::AzureDevOps => "azure-devops",
            ProviderName::Gitea => "gitea",
            ProviderName::Forgejo => "forgejo",
            ProviderName::Unknown => "unknown",
        }
    }

    /// Parse a provider name (case-insensitive).
    ///
    /// Returns `None` for names that are not providers at all. The literal
    /// `"unknown"` parses to [`ProviderName::Unknown`].
    ///
    /// # Example
    ///
    /// ```
    /// use forgekit::forge::ProviderName;
    ///
    /// assert_eq!(ProviderName::parse("GitHub"), Some(ProviderName::GitHub));
    /// assert_eq!(ProviderName::parse("azure"), Some(ProviderName::AzureDevOps));
    /// assert_eq!(ProviderName::parse("svn"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "github" => Some(ProviderName::GitHub),
            "gitlab" => Some(ProviderName::GitLab),
            "bitbucket" => Some(ProviderName::Bitbucket),
            "azure-devops" | "azure" | "azuredevops" => Some(ProviderName::AzureDevOps),
            "gitea" => Some(ProviderName::Gitea),
            "forgejo" => Some(ProviderName::Forgejo),
            "unknown" => Some(ProviderName::Unknown),
            _ => None,
        }
    }

    /// Whether this is a real provider (anything but `Unknown`).
    pub fn is_known(&self) -> bool {
        *self != ProviderName::Unknown
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderName::parse(s).ok_or_else(|| format!("unknown provider '{}'", s))
    }
}

/// Structured coordinates of a remote repository.
///
/// `owner` is a slash-joined path and may contain several segments
/// (`group/subgroup` on GitLab, `org/project` on Azure DevOps). `repo`
/// never carries a `.git` suffix. Both are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteUrlInfo {
    pub provider: ProviderName,
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl RemoteUrlInfo {
    /// `owner/repo`, as accepted by most provider CLIs.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Detect the hosting provider of a remote URL.
///
/// The checks run top to bottom and the first match wins. The order is
/// load-bearing: Azure DevOps is tested before GitHub, and the self-hosted
/// heuristics (`gitlab`, `gitea`, `forgejo` anywhere in the URL) run last.
/// A self-hosted instance on a neutral hostname is reported as `Unknown`.
///
/// # Example
///
/// ```
/// use forgekit::forge::{detect_provider, ProviderName};
///
/// assert_eq!(detect_provider("git@github.com:o/r.git"), ProviderName::GitHub);
/// assert_eq!(detect_provider("https://git.gitea.example/o/r"), ProviderName::Gitea);
/// assert_eq!(detect_provider(""), ProviderName::Unknown);
/// ```
pub fn detect_provider(url: &str) -> ProviderName {
    let url = url.trim().to_lowercase();

    if url.contains("dev.azure.com")
        || url.contains("ssh.dev.azure.com")
        || url.contains("visualstudio.com")
    {
        return ProviderName::AzureDevOps;
    }
    if url.contains("github.com") {
        return ProviderName::GitHub;
    }
    if url.contains("gitlab.com") {
        return ProviderName::GitLab;
    }
    if url.contains("bitbucket.org") {
        return ProviderName::Bitbucket;
    }

    // Self-hosted heuristics
    if url.contains("gitlab") {
        return ProviderName::GitLab;
    }
    if url.contains("gitea") {
        return ProviderName::Gitea;
    }
    if url.contains("forgejo") {
        return ProviderName::Forgejo;
    }

    ProviderName::Unknown
}

/// Parse a remote URL into provider, host, owner path and repo name.
///
/// Leading and trailing whitespace (including a trailing newline from
/// `git remote get-url`) is ignored, as are trailing slashes.
///
/// # Returns
///
/// `None` when the input matches none of the supported grammars. A parsed
/// value always has a non-empty owner and repo.
pub fn parse_remote_url(url: &str) -> Option<RemoteUrlInfo> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let (host, owner, repo) = parse_azure_https(url)
        .or_else(|| parse_azure_ssh(url))
        .or_else(|| parse_https(url))
        .or_else(|| parse_scp(url))
        .or_else(|| parse_ssh_scheme(url))?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some(RemoteUrlInfo {
        provider: detect_provider(url),
        host,
        owner,
        repo,
    })
}

type Parsed = (String, String, String);

/// Strip an `http://` or `https://` scheme (case-insensitive).
fn strip_http_scheme(url: &str) -> Option<&str> {
    ["https://", "http://"].iter().find_map(|scheme| {
        let head = url.get(..scheme.len())?;
        head.eq_ignore_ascii_case(scheme)
            .then(|| url.get(scheme.len()..))
            .flatten()
    })
}

/// Split `authority/path` and drop any `user[:password]@` prefix.
fn split_authority(rest: &str) -> Option<(&str, &str)> {
    let (authority, path) = rest.split_once('/')?;
    let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    if host.is_empty() {
        return None;
    }
    Some((host, path))
}

/// Path segments with trailing slashes removed. Empty segments are rejected.
fn segments(path: &str) -> Option<Vec<&str>> {
    let path = path.trim_end_matches('/');
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Strip a trailing `.git` (case-insensitive) from a repository segment.
fn strip_git_suffix(repo: &str) -> &str {
    let len = repo.len();
    if len >= 4 && repo.is_char_boundary(len - 4) && repo[len - 4..].eq_ignore_ascii_case(".git") {
        &repo[..len - 4]
    } else {
        repo
    }
}

/// Greedy owner/repo split: the last segment is the repo, everything before
/// it is the owner path.
fn owner_and_repo(path: &str) -> Option<(String, String)> {
    let parts = segments(path)?;
    let (last, owner) = parts.split_last()?;
    if owner.is_empty() {
        return None;
    }
    let repo = strip_git_suffix(last);
    if repo.is_empty() {
        return None;
    }
    Some((owner.join("/"), repo.to_string()))
}

/// `https://dev.azure.com/{org}/{project}/_git/{repo}` and the legacy
/// `https://{org}.visualstudio.com/[DefaultCollection/]{project}/_git/{repo}`.
fn parse_azure_https(url: &str) -> Option<Parsed> {
    let (host, path) = split_authority(strip_http_scheme(url)?)?;
    let host_lower = host.to_ascii_lowercase();
    let parts = segments(path)?;

    if host_lower == AZURE_HOST {
        if let [org, project, "_git", repo] = parts.as_slice() {
            return Some((
                AZURE_HOST.to_string(),
                format!("{}/{}", org, project),
                strip_git_suffix(repo).to_string(),
            ));
        }
        return None;
    }

    let org = host_lower.strip_suffix(".visualstudio.com")?;
    let project_parts = match parts.as_slice() {
        ["DefaultCollection", project, "_git", repo] | [project, "_git", repo] => {
            Some((*project, *repo))
        }
        _ => None,
    };
    let (project, repo) = project_parts?;
    let owner = format!("{}/{}", org, project);
    Some((host_lower, owner, strip_git_suffix(repo).to_string()))
}

/// `git@ssh.dev.azure.com:v3/{org}/{project}/{repo}` (also the
/// `vs-ssh.visualstudio.com` legacy host).
fn parse_azure_ssh(url: &str) -> Option<Parsed> {
    if url.contains("://") {
        return None;
    }
    let (user_host, path) = url.split_once(':')?;
    let (_, host) = user_host.rsplit_once('@')?;
    azure_v3(host, path)
}

/// Decompose the `v3/{org}/{project}/{repo}` path used by Azure SSH remotes.
fn azure_v3(host: &str, path: &str) -> Option<Parsed> {
    let host = host.to_ascii_lowercase();
    if host != "ssh.dev.azure.com" && host != "vs-ssh.visualstudio.com" {
        return None;
    }
    let parts = segments(path.trim_start_matches('/'))?;
    match parts.as_slice() {
        ["v3", org, project, repo] => {
            let repo = strip_git_suffix(repo);
            let host = if host == "ssh.dev.azure.com" {
                AZURE_HOST.to_string()
            } else {
                format!("{}.visualstudio.com", org.to_ascii_lowercase())
            };
            Some((host, format!("{}/{}", org, project), repo.to_string()))
        }
        _ => None,
    }
}

/// `https://{host}/{owner-path}/{repo}[.git]`.
fn parse_https(url: &str) -> Option<Parsed> {
    let (host, path) = split_authority(strip_http_scheme(url)?)?;
    let (owner, repo) = owner_and_repo(path)?;
    Some((host.to_string(), owner, repo))
}

/// SCP-style `git@{host}:{owner-path}/{repo}[.git]`.
fn parse_scp(url: &str) -> Option<Parsed> {
    if url.contains("://") {
        return None;
    }
    let (user_host, path) = url.split_once(':')?;
    let (user, host) = user_host.split_once('@')?;
    if user.is_empty() || host.is_empty() || host.contains('/') {
        return None;
    }
    let (owner, repo) = owner_and_repo(path.trim_start_matches('/'))?;
    Some((host.to_string(), owner, repo))
}

/// `ssh://[user@]{host}[:port]/{owner-path}/{repo}[.git]`.
///
/// The SSH port is dropped from the host; it says nothing about the web host.
fn parse_ssh_scheme(url: &str) -> Option<Parsed> {
    let prefix = url.get(..6)?;
    if !prefix.eq_ignore_ascii_case("ssh://") {
        return None;
    }
    let (authority, path) = split_authority(url.get(6..)?)?;
    let host = authority.split_once(':').map_or(authority, |(h, _)| h);
    if host.is_empty() {
        return None;
    }
    if let Some(parsed) = azure_v3(host, path) {
        return Some(parsed);
    }
    let (owner, repo) = owner_and_repo(path)?;
    Some((host.to_string(), owner, repo))
}
