//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::forge::ProviderName;

/// forgekit - Detect git hosting providers and fetch PR, issue and auth metadata
#[derive(Parser, Debug)]
#[command(name = "fk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if fk was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the hosting provider of a remote URL
    #[command(
        name = "detect",
        long_about = "Print the hosting provider of a remote URL.\n\n\
            Detection is based on the hostname alone: github.com, gitlab.com, \
            bitbucket.org and dev.azure.com (or visualstudio.com) are recognized, and \
            self-hosted instances are recognized when 'gitlab', 'gitea' or \
            'forgejo' appears in the URL. Anything else is reported as 'unknown'.\n\n\
            Without a URL, the configured remote of the current repository is used.",
        after_help = "\
EXAMPLES:
    fk detect git@github.com:user/repo.git      # github
    fk detect https://gitlab.example.com/g/r    # gitlab
    fk detect                                   # remote of the current repo"
    )]
    Detect {
        /// Remote URL (defaults to the current repository's remote)
        url: Option<String>,
    },

    /// Split a remote URL into provider, host, owner and repository
    #[command(
        name = "parse",
        long_about = "Split a remote URL into provider, host, owner and repository.\n\n\
            HTTPS, SSH (scp-like and ssh://) and Azure DevOps URLs are supported. \
            The owner may span several path segments (GitLab subgroups, Azure \
            organization/project). Exits with status 1 when the URL cannot be parsed.",
        after_help = "\
EXAMPLES:
    fk parse https://gitlab.com/group/sub/repo.git
    fk parse git@ssh.dev.azure.com:v3/org/project/repo --json"
    )]
    Parse {
        /// Remote URL (defaults to the current repository's remote)
        url: Option<String>,
    },

    /// Show a pull request (merge request on GitLab)
    #[command(
        name = "pr",
        long_about = "Show a pull request.\n\n\
            The provider CLI is tried first (gh, glab, az, tea); when it is missing \
            or fails, the provider's REST API is used. Owner, repository and \
            provider default to the current repository's remote.",
        after_help = "\
EXAMPLES:
    fk pr 42
    fk pr 7 --owner group/sub --repo app --provider gitlab
    fk pr 42 --json"
    )]
    Pr(LookupArgs),

    /// Show an issue (work item on Azure DevOps)
    #[command(
        name = "issue",
        long_about = "Show an issue.\n\n\
            Uses the same CLI-then-REST lookup as 'fk pr'. On Azure DevOps the \
            number is a work item id.",
        after_help = "\
EXAMPLES:
    fk issue 13
    fk issue 101 --provider azure-devops --owner org/project --repo app"
    )]
    Issue(LookupArgs),

    /// Report authentication status
    #[command(
        name = "auth",
        long_about = "Report whether you are authenticated with each provider.\n\n\
            A token environment variable counts first; otherwise the provider CLI \
            is asked about its login session. With --provider, exits with status 1 \
            when that provider is not authenticated."
    )]
    Auth {
        /// Only check this provider
        #[arg(long)]
        provider: Option<ProviderName>,
    },

    /// Identify a self-hosted instance by probing its API
    #[command(
        name = "probe",
        long_about = "Identify a self-hosted instance by probing its API.\n\n\
            Each adapter requests a version or metadata endpoint under BASE_URL \
            and the providers that answered are printed. Exits with status 1 when \
            none did.",
        after_help = "\
EXAMPLES:
    fk probe https://git.example.com
    fk probe https://git.example.com --provider forgejo"
    )]
    Probe {
        /// Base URL of the instance
        base_url: String,

        /// Only probe for this provider
        #[arg(long)]
        provider: Option<ProviderName>,
    },

    /// List supported providers
    #[command(name = "providers")]
    Providers,

    /// Show the effective configuration
    #[command(
        name = "config",
        long_about = "Show the effective configuration.\n\n\
            The file is looked up at $FORGEKIT_CONFIG, then \
            $XDG_CONFIG_HOME/forgekit/config.toml, then ~/.forgekit/config.toml. \
            Values that are not set show their defaults."
    )]
    Config,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    fk completion bash > ~/.local/share/bash-completion/completions/fk

    # Zsh
    fk completion zsh > ~/.zfunc/_fk

    # Fish
    fk completion fish > ~/.config/fish/completions/fk.fish

    # PowerShell
    fk completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by `pr` and `issue`.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// PR or issue number
    #[arg(allow_negative_numbers = true)]
    pub number: i64,

    /// Owner path (e.g. "group/subgroup" or "org/project")
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Provider to use instead of detecting it
    #[arg(long)]
    pub provider: Option<ProviderName>,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn provider_flag_accepts_aliases() {
        let cli = Cli::try_parse_from(["fk", "auth", "--provider", "azure"]).unwrap();
        match cli.command {
            Command::Auth { provider } => assert_eq!(provider, Some(ProviderName::AzureDevOps)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn provider_flag_rejects_unknown_names() {
        assert!(Cli::try_parse_from(["fk", "auth", "--provider", "svn"]).is_err());
    }

    #[test]
    fn negative_numbers_reach_the_handler() {
        let cli = Cli::try_parse_from(["fk", "pr", "-1"]).unwrap();
        match cli.command {
            Command::Pr(args) => assert_eq!(args.number, -1),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fk", "parse", "git@github.com:a/b", "--json"]).unwrap();
        assert!(cli.json);
    }
}
