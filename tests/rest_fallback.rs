//! Integration tests for the CLI-then-REST tier chain.
//!
//! These tests verify:
//! - Each adapter falls back to its REST API when the provider CLI fails
//! - REST requests carry the provider's auth scheme and URL shape
//! - A successful CLI tier short-circuits the REST tier
//! - HTTP failures collapse to "absent"
//! - Version-endpoint probes identify self-hosted instances

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use forgekit::core::config::Config;
use forgekit::forge::azure::AzureDevOpsProvider;
use forgekit::forge::bitbucket::BitbucketProvider;
use forgekit::forge::gitea::GiteaProvider;
use forgekit::forge::github::GitHubProvider;
use forgekit::forge::gitlab::GitLabProvider;
use forgekit::forge::mock::{Scripted, ScriptedRunner};
use forgekit::forge::{EnvVars, GitProvider, ProviderContext};

// =============================================================================
// Test Fixtures
// =============================================================================

fn context(runner: &ScriptedRunner, env: &[(&str, &str)]) -> ProviderContext {
    ProviderContext::new(
        Arc::new(runner.clone()),
        EnvVars::from_pairs(env.iter().copied()),
        Config::default(),
    )
}

/// A CLI that is installed but fails every lookup.
fn failing_cli(program: &str) -> ScriptedRunner {
    ScriptedRunner::new().on(
        program,
        &[],
        Scripted::Exit {
            code: 1,
            stderr: "could not resolve to a repository".into(),
        },
    )
}

// =============================================================================
// GitHub
// =============================================================================

mod github {
    use super::*;

    #[tokio::test]
    async fn pr_falls_back_to_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/pulls/42"))
            .and(header("authorization", "Bearer gh-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Add retry",
                "head": { "ref": "retry" },
                "base": { "ref": "main" },
                "html_url": "https://github.com/octo/app/pull/42",
                "body": "Retries transient failures.",
                "user": { "login": "octocat" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = failing_cli("gh");
        let uri = server.uri();
        let gh = GitHubProvider::new(context(
            &runner,
            &[("GITHUB_API_URL", uri.as_str()), ("GH_TOKEN", "gh-secret")],
        ));

        let pr = gh.view_pr(42, Some("octo"), Some("app")).await.unwrap();
        assert_eq!(pr.title, "Add retry");
        assert_eq!(pr.head_branch, "retry");
        assert_eq!(pr.base_branch, "main");
        assert_eq!(pr.url, "https://github.com/octo/app/pull/42");
        assert_eq!(pr.author.as_deref(), Some("octocat"));
        assert_eq!(runner.calls_to("gh").len(), 1);
    }

    #[tokio::test]
    async fn issue_falls_back_to_rest_when_cli_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/issues/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Crash on start",
                "body": null,
                "html_url": "https://github.com/octo/app/issues/7",
                "labels": [{ "name": "bug" }, { "name": "p1" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = ScriptedRunner::new();
        let uri = server.uri();
        let gh = GitHubProvider::new(context(&runner, &[("GITHUB_API_URL", uri.as_str())]));

        let issue = gh.view_issue(7, Some("octo"), Some("app")).await.unwrap();
        assert_eq!(issue.title, "Crash on start");
        assert_eq!(issue.body, "");
        assert_eq!(issue.labels, vec!["bug", "p1"]);
    }

    #[tokio::test]
    async fn cli_success_skips_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let runner = ScriptedRunner::new().on(
            "gh",
            &["pr", "view"],
            Scripted::Success(
                json!({
                    "title": "From CLI",
                    "headRefName": "feature",
                    "baseRefName": "main",
                    "url": "https://github.com/octo/app/pull/3",
                    "body": "",
                    "author": { "login": "dev" }
                })
                .to_string(),
            ),
        );
        let uri = server.uri();
        let gh = GitHubProvider::new(context(&runner, &[("GITHUB_API_URL", uri.as_str())]));

        let pr = gh.view_pr(3, Some("octo"), Some("app")).await.unwrap();
        assert_eq!(pr.title, "From CLI");
    }

    #[tokio::test]
    async fn not_found_everywhere_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/pulls/999"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
            )
            .mount(&server)
            .await;

        let runner = failing_cli("gh");
        let uri = server.uri();
        let gh = GitHubProvider::new(context(&runner, &[("GITHUB_API_URL", uri.as_str())]));

        assert_eq!(gh.view_pr(999, Some("octo"), Some("app")).await, None);
    }

    #[tokio::test]
    async fn unauthorized_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
            )
            .mount(&server)
            .await;

        let runner = failing_cli("gh");
        let uri = server.uri();
        let gh = GitHubProvider::new(context(
            &runner,
            &[("GITHUB_API_URL", uri.as_str()), ("GH_TOKEN", "expired")],
        ));

        assert_eq!(gh.view_issue(1, Some("octo"), Some("app")).await, None);
    }
}

// =============================================================================
// GitLab
// =============================================================================

mod gitlab {
    use super::*;

    #[tokio::test]
    async fn merge_request_falls_back_to_rest_with_encoded_project() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fsub%2Fapp/merge_requests/12"))
            .and(header("private-token", "gl-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Refactor parser",
                "source_branch": "refactor",
                "target_branch": "main",
                "web_url": "https://gitlab.example.com/group/sub/app/-/merge_requests/12",
                "description": "Splits the parser.",
                "author": { "username": "dev" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = failing_cli("glab");
        let uri = server.uri();
        let gl = GitLabProvider::new(context(
            &runner,
            &[("GITLAB_URL", uri.as_str()), ("GITLAB_TOKEN", "gl-secret")],
        ));

        let pr = gl.view_pr(12, Some("group/sub"), Some("app")).await.unwrap();
        assert_eq!(pr.head_branch, "refactor");
        assert_eq!(pr.body, "Splits the parser.");
        assert_eq!(pr.author.as_deref(), Some("dev"));
    }

    #[tokio::test]
    async fn issue_falls_back_to_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/team%2Fapp/issues/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Flaky test",
                "description": "Fails on CI.",
                "web_url": "https://gitlab.example.com/team/app/-/issues/4",
                "labels": ["ci"]
            })))
            .mount(&server)
            .await;

        let runner = failing_cli("glab");
        let uri = server.uri();
        let gl = GitLabProvider::new(context(&runner, &[("GITLAB_URL", uri.as_str())]));

        let issue = gl.view_issue(4, Some("team"), Some("app")).await.unwrap();
        assert_eq!(issue.title, "Flaky test");
        assert_eq!(issue.labels, vec!["ci"]);
    }
}

// =============================================================================
// Bitbucket
// =============================================================================

mod bitbucket {
    use super::*;

    #[tokio::test]
    async fn pull_request_over_rest_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repositories/team/app/pullrequests/9"))
            .and(header("authorization", "Bearer bb-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Bump deps",
                "source": { "branch": { "name": "deps" } },
                "destination": { "branch": { "name": "main" } },
                "links": { "html": { "href": "https://bitbucket.org/team/app/pull-requests/9" } },
                "description": "",
                "author": { "display_name": "Jo Dev" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = ScriptedRunner::new();
        let uri = server.uri();
        let bb = BitbucketProvider::new(context(
            &runner,
            &[("BITBUCKET_API_URL", uri.as_str()), ("BITBUCKET_TOKEN", "bb-secret")],
        ));

        let pr = bb.view_pr(9, Some("team"), Some("app")).await.unwrap();
        assert_eq!(pr.head_branch, "deps");
        assert_eq!(pr.url, "https://bitbucket.org/team/app/pull-requests/9");
        assert_eq!(pr.author.as_deref(), Some("Jo Dev"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn issue_kind_becomes_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repositories/team/app/issues/2"))
            .and(header("authorization", "Basic am86YXBwLXBhc3M="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Typo in docs",
                "content": { "raw": "Second paragraph." },
                "links": { "html": { "href": "https://bitbucket.org/team/app/issues/2" } },
                "kind": "task"
            })))
            .mount(&server)
            .await;

        let runner = ScriptedRunner::new();
        let uri = server.uri();
        let bb = BitbucketProvider::new(context(
            &runner,
            &[
                ("BITBUCKET_API_URL", uri.as_str()),
                ("BITBUCKET_USERNAME", "jo"),
                ("BITBUCKET_APP_PASSWORD", "app-pass"),
            ],
        ));

        let issue = bb.view_issue(2, Some("team"), Some("app")).await.unwrap();
        assert_eq!(issue.body, "Second paragraph.");
        assert_eq!(issue.labels, vec!["task"]);
    }
}

// =============================================================================
// Azure DevOps
// =============================================================================

mod azure {
    use super::*;

    #[tokio::test]
    async fn pull_request_falls_back_to_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/app/pullrequests/5"))
            .and(query_param("api-version", "7.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Pipeline fix",
                "sourceRefName": "refs/heads/fix/pipeline",
                "targetRefName": "refs/heads/main",
                "description": "Fixes the build.",
                "createdBy": { "displayName": "Ada" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = failing_cli("az");
        let uri = server.uri();
        let az = AzureDevOpsProvider::new(context(
            &runner,
            &[("AZURE_DEVOPS_URL", uri.as_str()), ("AZURE_DEVOPS_EXT_PAT", "pat")],
        ));

        let pr = az.view_pr(5, Some("org/project"), Some("app")).await.unwrap();
        assert_eq!(pr.head_branch, "fix/pipeline");
        assert_eq!(pr.base_branch, "main");
        assert_eq!(pr.author.as_deref(), Some("Ada"));
        assert_eq!(
            pr.url,
            format!("{}/org/project/_git/app/pullrequest/5", uri)
        );
    }

    #[tokio::test]
    async fn work_item_falls_back_to_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/wit/workitems/101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": {
                    "System.Title": "Login fails",
                    "System.Description": "<p>Steps</p>",
                    "System.Tags": "auth; regression"
                },
                "_links": { "html": { "href": "https://dev.azure.com/org/project/_workitems/edit/101" } }
            })))
            .mount(&server)
            .await;

        let runner = failing_cli("az");
        let uri = server.uri();
        let az = AzureDevOpsProvider::new(context(&runner, &[("AZURE_DEVOPS_URL", uri.as_str())]));

        let item = az.view_issue(101, Some("org/project"), Some("app")).await.unwrap();
        assert_eq!(item.title, "Login fails");
        assert_eq!(item.labels, vec!["auth", "regression"]);
        assert_eq!(
            item.url,
            "https://dev.azure.com/org/project/_workitems/edit/101"
        );
    }

    #[tokio::test]
    async fn owner_without_project_is_absent() {
        let runner = failing_cli("az");
        let az = AzureDevOpsProvider::new(context(&runner, &[]));
        assert_eq!(az.view_pr(5, Some("org"), Some("app")).await, None);
    }
}

// =============================================================================
// Gitea / Forgejo
// =============================================================================

mod gitea {
    use super::*;

    fn pull_json() -> serde_json::Value {
        json!({
            "title": "Port to new API",
            "head": { "ref": "port" },
            "base": { "ref": "main" },
            "html_url": "https://codeberg.org/me/app/pulls/8",
            "body": "Done.",
            "user": { "login": "me" }
        })
    }

    #[tokio::test]
    async fn gitea_pr_falls_back_to_rest_with_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repos/me/app/pulls/8"))
            .and(header("authorization", "token gt-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pull_json()))
            .expect(1)
            .mount(&server)
            .await;

        let runner = failing_cli("tea");
        let uri = server.uri();
        let gt = GiteaProvider::gitea(context(
            &runner,
            &[("GITEA_URL", uri.as_str()), ("GITEA_TOKEN", "gt-secret")],
        ));

        let pr = gt.view_pr(8, Some("me"), Some("app")).await.unwrap();
        assert_eq!(pr.head_branch, "port");
        assert_eq!(pr.author.as_deref(), Some("me"));
    }

    #[tokio::test]
    async fn forgejo_prefers_its_own_variables() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repos/me/app/pulls/8"))
            .and(header("authorization", "token fj-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pull_json()))
            .expect(1)
            .mount(&server)
            .await;

        let runner = failing_cli("tea");
        let uri = server.uri();
        let fj = GiteaProvider::forgejo(context(
            &runner,
            &[
                ("FORGEJO_URL", uri.as_str()),
                ("GITEA_URL", "http://127.0.0.1:9"),
                ("FORGEJO_TOKEN", "fj-secret"),
                ("GITEA_TOKEN", "gt-secret"),
            ],
        ));

        assert!(fj.view_pr(8, Some("me"), Some("app")).await.is_some());
    }

    #[tokio::test]
    async fn no_instance_url_is_absent() {
        let runner = failing_cli("tea");
        let gt = GiteaProvider::gitea(context(&runner, &[]));
        assert_eq!(gt.view_issue(1, Some("me"), Some("app")).await, None);
    }
}

// =============================================================================
// Number validation
// =============================================================================

mod number_validation {
    use super::*;

    #[tokio::test]
    async fn non_positive_numbers_make_no_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let runner = failing_cli("gh");
        let uri = server.uri();
        let gh = GitHubProvider::new(context(&runner, &[("GITHUB_API_URL", uri.as_str())]));

        assert_eq!(gh.view_pr(0, Some("octo"), Some("app")).await, None);
        assert_eq!(gh.view_pr(-1, Some("octo"), Some("app")).await, None);
        assert_eq!(gh.view_issue(0, Some("octo"), Some("app")).await, None);
        assert!(runner.calls().is_empty());
    }
}

// =============================================================================
// API probes
// =============================================================================

mod detect_from_api {
    use super::*;

    async fn server_answering(endpoint: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "1.0" })))
            .mount(&server)
            .await;
        server
    }

    fn ctx() -> ProviderContext {
        context(&ScriptedRunner::new(), &[])
    }

    #[tokio::test]
    async fn gitlab_version_endpoint() {
        let server = server_answering("/api/v4/version").await;
        assert!(GitLabProvider::new(ctx()).detect_from_api(&server.uri()).await);
        assert!(!GitHubProvider::new(ctx()).detect_from_api(&server.uri()).await);
    }

    #[tokio::test]
    async fn github_enterprise_meta_endpoint() {
        let server = server_answering("/api/v3/meta").await;
        assert!(GitHubProvider::new(ctx()).detect_from_api(&server.uri()).await);
        assert!(!GitLabProvider::new(ctx()).detect_from_api(&server.uri()).await);
    }

    #[tokio::test]
    async fn gitea_version_endpoint_matches_both_flavors() {
        let server = server_answering("/api/v1/version").await;
        assert!(GiteaProvider::gitea(ctx()).detect_from_api(&server.uri()).await);
        assert!(GiteaProvider::forgejo(ctx()).detect_from_api(&server.uri()).await);
    }

    #[tokio::test]
    async fn azure_connection_data() {
        let server = server_answering("/_apis/connectionData").await;
        assert!(AzureDevOpsProvider::new(ctx()).detect_from_api(&server.uri()).await);
    }

    #[tokio::test]
    async fn bitbucket_server_properties() {
        let server = server_answering("/rest/api/1.0/application-properties").await;
        assert!(BitbucketProvider::new(ctx()).detect_from_api(&server.uri()).await);
    }

    #[tokio::test]
    async fn trailing_slash_is_tolerated() {
        let server = server_answering("/api/v4/version").await;
        let base = format!("{}/", server.uri());
        assert!(GitLabProvider::new(ctx()).detect_from_api(&base).await);
    }

    #[tokio::test]
    async fn server_errors_are_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        assert!(!GitLabProvider::new(ctx()).detect_from_api(&server.uri()).await);
    }

    #[tokio::test]
    async fn unreachable_host_is_false() {
        assert!(
            !GiteaProvider::gitea(ctx())
                .detect_from_api("http://127.0.0.1:9")
                .await
        );
    }
}

// =============================================================================
// Timeouts
// =============================================================================

mod timeouts {
    use super::*;
    use std::time::{Duration, Instant};

    use forgekit::core::config::{ForgeConfig, TimeoutConfig};

    fn context_with_http_secs(
        runner: &ScriptedRunner,
        env: &[(&str, &str)],
        http_secs: u64,
    ) -> ProviderContext {
        let config = Config::from_file(ForgeConfig {
            timeouts: Some(TimeoutConfig {
                http_secs: Some(http_secs),
                ..Default::default()
            }),
            ..Default::default()
        });
        ProviderContext::new(
            Arc::new(runner.clone()),
            EnvVars::from_pairs(env.iter().copied()),
            config,
        )
    }

    #[tokio::test]
    async fn cli_timeout_falls_through_to_rest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/pulls/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Slow CLI",
                "head": { "ref": "h" },
                "base": { "ref": "main" },
                "html_url": "https://github.com/octo/app/pull/8",
                "body": null,
                "user": { "login": "dev" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = ScriptedRunner::new().on("gh", &[], Scripted::Timeout);
        let uri = server.uri();
        let gh = GitHubProvider::new(context(&runner, &[("GITHUB_API_URL", uri.as_str())]));

        let pr = gh.view_pr(8, Some("octo"), Some("app")).await.unwrap();
        assert_eq!(pr.title, "Slow CLI");
        assert_eq!(pr.head_branch, "h");
        assert_eq!(runner.calls_to("gh").len(), 1);
    }

    #[tokio::test]
    async fn hanging_rest_endpoint_is_absent_within_bound() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/pulls/9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "title": "too late" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let runner = ScriptedRunner::new();
        let uri = server.uri();
        let gh = GitHubProvider::new(context_with_http_secs(
            &runner,
            &[("GITHUB_API_URL", uri.as_str())],
            1,
        ));

        let started = Instant::now();
        let pr = gh.view_pr(9, Some("octo"), Some("app")).await;
        assert_eq!(pr, None);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
