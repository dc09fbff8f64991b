//! forge::workdir
//!
//! Working-directory helpers: read a repository's remote URL and feed it to
//! the detector and parser.
//!
//! The remote is read in-process with `git2`, so there is no subprocess to
//! bound. Every failure (not a repository, no remotes, URL not UTF-8)
//! yields "no URL".

use std::path::Path;

use tracing::debug;

use super::remote::{detect_provider, parse_remote_url, ProviderName, RemoteUrlInfo};

/// URL of `remote` in the repository containing `dir`.
///
/// Falls back to the first configured remote when `remote` does not exist.
pub fn remote_url_at(dir: &Path, remote: &str) -> Option<String> {
    let repo = match git2::Repository::discover(dir) {
        Ok(repo) => repo,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err.message(), "not a git repository");
            return None;
        }
    };

    if let Ok(found) = repo.find_remote(remote) {
        if let Some(url) = found.url() {
            return Some(url.to_string());
        }
    }

    let remotes = repo.remotes().ok()?;
    let first = remotes.iter().flatten().next()?;
    debug!(requested = remote, using = first, "remote not found, using first remote");
    let found = repo.find_remote(first).ok()?;
    found.url().map(String::from)
}

/// Provider of the repository containing `dir`; `Unknown` without a remote.
pub fn detect_provider_at(dir: &Path, remote: &str) -> ProviderName {
    remote_url_at(dir, remote)
        .map(|url| detect_provider(&url))
        .unwrap_or(ProviderName::Unknown)
}

/// Parsed remote of the repository containing `dir`.
pub fn parse_remote_at(dir: &Path, remote: &str) -> Option<RemoteUrlInfo> {
    remote_url_at(dir, remote).and_then(|url| parse_remote_url(&url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_with_remotes(remotes: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();
        for (name, url) in remotes {
            repo.remote(name, url).unwrap();
        }
        temp
    }

    #[test]
    fn reads_named_remote() {
        let temp = repo_with_remotes(&[
            ("origin", "git@github.com:octo/repo.git"),
            ("upstream", "https://gitlab.com/group/sub/repo.git"),
        ]);
        assert_eq!(
            remote_url_at(temp.path(), "upstream").as_deref(),
            Some("https://gitlab.com/group/sub/repo.git")
        );
        assert_eq!(detect_provider_at(temp.path(), "origin"), ProviderName::GitHub);
    }

    #[test]
    fn falls_back_to_first_remote() {
        let temp = repo_with_remotes(&[("fork", "https://codeberg.org/me/repo.git")]);
        assert_eq!(
            remote_url_at(temp.path(), "origin").as_deref(),
            Some("https://codeberg.org/me/repo.git")
        );
    }

    #[test]
    fn discovers_from_subdirectory() {
        let temp = repo_with_remotes(&[("origin", "https://dev.azure.com/org/project/_git/repo")]);
        let nested = temp.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let info = parse_remote_at(&nested, "origin").unwrap();
        assert_eq!(info.provider, ProviderName::AzureDevOps);
        assert_eq!(info.owner, "org/project");
        assert_eq!(info.repo, "repo");
    }

    #[test]
    fn no_remotes_is_none() {
        let temp = repo_with_remotes(&[]);
        assert_eq!(remote_url_at(temp.path(), "origin"), None);
        assert_eq!(detect_provider_at(temp.path(), "origin"), ProviderName::Unknown);
    }

    #[test]
    fn not_a_repository_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(remote_url_at(temp.path(), "origin"), None);
        assert_eq!(parse_remote_at(temp.path(), "origin"), None);
    }
}
