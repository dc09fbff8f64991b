//! Integration tests for the `fk` binary.
//!
//! These tests exercise the full CLI against temporary repositories and an
//! isolated configuration directory. None of them reach the network: every
//! lookup here fails validation or resolution before any I/O.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

/// `fk` with configuration lookup confined to `home`.
fn fk(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fk").unwrap();
    cmd.env_remove("FORGEKIT_CONFIG")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home.join("xdg"))
        .env("HOME", home)
        .current_dir(home);
    cmd
}

fn repo_with_origin(url: &str) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    let repo = git2::Repository::init(dir.path()).expect("failed to init repo");
    repo.remote("origin", url).expect("failed to add remote");
    dir
}

// =============================================================================
// detect / parse
// =============================================================================

mod detect {
    use super::*;

    #[test]
    fn prints_provider_for_url() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["detect", "git@github.com:user/repo.git"])
            .assert()
            .success()
            .stdout("github\n");
    }

    #[test]
    fn unknown_is_not_an_error() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["detect", "https://code.example.com/a/b"])
            .assert()
            .success()
            .stdout("unknown\n");
    }

    #[test]
    fn json_output() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["detect", "https://dev.azure.com/o/p/_git/r", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"provider\": \"azure-devops\""));
    }

    #[test]
    fn defaults_to_repository_remote() {
        let home = TempDir::new().unwrap();
        let repo = repo_with_origin("git@gitlab.com:group/sub/app.git");
        fk(home.path())
            .arg("--cwd")
            .arg(repo.path())
            .arg("detect")
            .assert()
            .success()
            .stdout("gitlab\n");
    }

    #[test]
    fn outside_a_repository_fails() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .arg("detect")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No remote URL found"));
    }

    #[test]
    fn quiet_suppresses_output() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["-q", "detect", "git@github.com:user/repo.git"])
            .assert()
            .success()
            .stdout("");
    }
}

mod parse {
    use super::*;

    #[test]
    fn text_output() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["parse", "https://gitlab.com/group/sub/repo.git"])
            .assert()
            .success()
            .stdout(predicate::str::contains("provider: gitlab"))
            .stdout(predicate::str::contains("owner:    group/sub"))
            .stdout(predicate::str::contains("repo:     repo"));
    }

    #[test]
    fn json_output() {
        let home = TempDir::new().unwrap();
        let output = fk(home.path())
            .args(["parse", "git@ssh.dev.azure.com:v3/org/project/app", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["provider"], "azure-devops");
        assert_eq!(value["host"], "dev.azure.com");
        assert_eq!(value["owner"], "org/project");
        assert_eq!(value["repo"], "app");
    }

    #[test]
    fn unparseable_url_exits_one() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["parse", "not-a-url"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not parse remote URL 'not-a-url'"));
    }
}

// =============================================================================
// pr / issue
// =============================================================================

mod lookup {
    use super::*;

    #[test]
    fn non_positive_number_fails() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["pr", "0", "--provider", "github", "--owner", "o", "--repo", "r"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not retrieve PR #0 from GitHub"));
    }

    #[test]
    fn negative_issue_number_fails() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["issue", "-3", "--provider", "gitlab", "--owner", "g", "--repo", "r"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Could not retrieve issue #-3 from GitLab"));
    }

    #[test]
    fn unresolvable_provider_fails() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["pr", "5"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Could not determine the hosting provider",
            ));
    }

    #[test]
    fn unknown_provider_name_is_rejected_by_parser() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["pr", "5", "--provider", "sourcehut"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown provider 'sourcehut'"));
    }
}

// =============================================================================
// providers / config / completion
// =============================================================================

mod providers {
    use super::*;

    #[test]
    fn table_lists_every_adapter() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .arg("providers")
            .assert()
            .success()
            .stdout(predicate::str::contains("azure-devops"))
            .stdout(predicate::str::contains("Azure DevOps"))
            .stdout(predicate::str::contains("glab"))
            .stdout(predicate::str::contains("forgejo"));
    }

    #[test]
    fn json_lists_six_entries() {
        let home = TempDir::new().unwrap();
        let output = fk(home.path())
            .args(["providers", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 6);
        let bitbucket = entries.iter().find(|e| e["name"] == "bitbucket").unwrap();
        assert!(bitbucket["cli"].is_null());
    }
}

mod config {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("(none, using defaults)"))
            .stdout(predicate::str::contains("remote:           origin"))
            .stdout(predicate::str::contains("timeouts.cli:     10s"));
    }

    #[test]
    fn reads_file_from_env() {
        let home = TempDir::new().unwrap();
        let path = home.path().join("forgekit.toml");
        std::fs::write(
            &path,
            r#"
remote = "upstream"
default_provider = "gitea"

[timeouts]
http_secs = 30

[providers.gitea]
url = "https://git.example.com"
"#,
        )
        .unwrap();

        fk(home.path())
            .env("FORGEKIT_CONFIG", &path)
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("remote:           upstream"))
            .stdout(predicate::str::contains("default_provider: gitea"))
            .stdout(predicate::str::contains("timeouts.http:    30s"))
            .stdout(predicate::str::contains(
                "providers.gitea.url: https://git.example.com",
            ));
    }

    #[test]
    fn invalid_file_fails_every_command() {
        let home = TempDir::new().unwrap();
        let path = home.path().join("forgekit.toml");
        std::fs::write(&path, "default_provider = \"svn\"\n").unwrap();

        fk(home.path())
            .env("FORGEKIT_CONFIG", &path)
            .args(["detect", "git@github.com:a/b"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to load configuration"));
    }
}

mod completion {
    use super::*;

    #[test]
    fn bash_script_names_binary() {
        let home = TempDir::new().unwrap();
        fk(home.path())
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("_fk"));
    }
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    fk(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fk"));
}
