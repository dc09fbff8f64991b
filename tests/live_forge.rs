//! Live provider tests (behind the `live_forge_tests` feature flag).
//!
//! These call the real `gh` CLI and the public GitHub API. Run with:
//!
//! ```text
//! FORGEKIT_TEST_OWNER=rust-lang FORGEKIT_TEST_REPO=rust \
//!     cargo test --features live_forge_tests --test live_forge
//! ```

#![cfg(feature = "live_forge_tests")]

use forgekit::core::config::Config;
use forgekit::forge::{GitProvider, ProviderContext, ProviderName, ProviderRegistry};

fn test_repo() -> Option<(String, String)> {
    let owner = std::env::var("FORGEKIT_TEST_OWNER").ok()?;
    let repo = std::env::var("FORGEKIT_TEST_REPO").ok()?;
    Some((owner, repo))
}

fn github() -> std::sync::Arc<dyn GitProvider> {
    let registry = ProviderRegistry::new(ProviderContext::from_env(Config::default()));
    registry.get(ProviderName::GitHub).unwrap()
}

#[tokio::test]
async fn live_first_pr_exists() {
    let Some((owner, repo)) = test_repo() else {
        eprintln!("Skipping: FORGEKIT_TEST_OWNER/FORGEKIT_TEST_REPO not set");
        return;
    };

    let pr = github().view_pr(1, Some(&owner), Some(&repo)).await;
    assert!(pr.is_some(), "expected PR #1 in {}/{}", owner, repo);
}

#[tokio::test]
async fn live_nonexistent_pr_is_absent() {
    let Some((owner, repo)) = test_repo() else {
        eprintln!("Skipping: FORGEKIT_TEST_OWNER/FORGEKIT_TEST_REPO not set");
        return;
    };

    let pr = github().view_pr(999_999_999, Some(&owner), Some(&repo)).await;
    assert!(pr.is_none());
}

#[tokio::test]
async fn live_github_api_probe() {
    assert!(github().detect_from_api("https://api.github.com").await);
}
