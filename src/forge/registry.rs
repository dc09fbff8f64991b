//! forge::registry
//!
//! Map from [`ProviderName`] to adapter instance.
//!
//! # Design
//!
//! The registry is an ordinary value owned by the caller (the CLI builds one
//! per invocation) rather than process-global state. The adapter map is
//! built lazily on the first lookup and reused afterwards; concurrent first
//! lookups are safe and all observe the same map. Lookups never construct
//! adapters.
//!
//! # Example
//!
//! ```no_run
//! use forgekit::core::config::Config;
//! use forgekit::forge::{GitProvider, ProviderContext, ProviderName, ProviderRegistry};
//!
//! let registry = ProviderRegistry::new(ProviderContext::from_env(Config::default()));
//! let github = registry.get(ProviderName::GitHub).unwrap();
//! assert_eq!(github.display_name(), "GitHub");
//! assert!(registry.get(ProviderName::Unknown).is_none());
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::azure::AzureDevOpsProvider;
use super::bitbucket::BitbucketProvider;
use super::context::ProviderContext;
use super::gitea::GiteaProvider;
use super::github::GitHubProvider;
use super::gitlab::GitLabProvider;
use super::remote::ProviderName;
use super::traits::GitProvider;
use super::workdir;

/// Shared handle to an adapter.
pub type ProviderHandle = Arc<dyn GitProvider>;

/// Lazily-built provider map.
pub struct ProviderRegistry {
    ctx: ProviderContext,
    providers: OnceLock<HashMap<ProviderName, ProviderHandle>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("built", &self.providers.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ProviderRegistry {
    /// Create a registry. No adapter is built yet.
    pub fn new(ctx: ProviderContext) -> Self {
        Self {
            ctx,
            providers: OnceLock::new(),
        }
    }

    /// The context adapters are built with.
    pub fn context(&self) -> &ProviderContext {
        &self.ctx
    }

    /// The adapter map, built on first use.
    fn map(&self) -> &HashMap<ProviderName, ProviderHandle> {
        self.providers.get_or_init(|| {
            debug!("building provider registry");
            let ctx = &self.ctx;
            let mut map: HashMap<ProviderName, ProviderHandle> = HashMap::new();
            map.insert(
                ProviderName::GitHub,
                Arc::new(GitHubProvider::new(ctx.clone())),
            );
            map.insert(
                ProviderName::GitLab,
                Arc::new(GitLabProvider::new(ctx.clone())),
            );
            map.insert(
                ProviderName::Bitbucket,
                Arc::new(BitbucketProvider::new(ctx.clone())),
            );
            map.insert(
                ProviderName::AzureDevOps,
                Arc::new(AzureDevOpsProvider::new(ctx.clone())),
            );
            map.insert(
                ProviderName::Gitea,
                Arc::new(GiteaProvider::gitea(ctx.clone())),
            );
            map.insert(
                ProviderName::Forgejo,
                Arc::new(GiteaProvider::forgejo(ctx.clone())),
            );
            map
        })
    }

    /// Adapter for `name`; `None` for `unknown`.
    pub fn get(&self, name: ProviderName) -> Option<ProviderHandle> {
        self.map().get(&name).cloned()
    }

    /// All adapters, in detection order.
    pub fn providers(&self) -> Vec<ProviderHandle> {
        ProviderName::ALL
            .iter()
            .filter_map(|name| self.get(*name))
            .collect()
    }

    /// Adapter for the repository containing `dir`.
    pub fn provider_for_dir(&self, dir: &Path) -> Option<ProviderHandle> {
        let name = workdir::detect_provider_at(dir, self.ctx.config.remote());
        self.get(name)
    }

    /// Adapter for the repository containing the current directory.
    pub fn provider_from_cwd(&self) -> Option<ProviderHandle> {
        let cwd = std::env::current_dir().ok()?;
        self.provider_for_dir(&cwd)
    }

    /// Adapter to use for `dir`, honoring overrides.
    ///
    /// Precedence: `explicit` (e.g. a `--provider` flag), then detection
    /// from the remote, then the configured `default_provider` when
    /// detection says `unknown`.
    pub fn resolve(&self, dir: &Path, explicit: Option<ProviderName>) -> Option<ProviderHandle> {
        if let Some(name) = explicit {
            return self.get(name);
        }
        match workdir::detect_provider_at(dir, self.ctx.config.remote()) {
            ProviderName::Unknown => self.ctx.config.default_provider().and_then(|n| self.get(n)),
            name => self.get(name),
        }
    }
}
