//! forge::tiers
//!
//! Ordered fallback between retrieval tiers.
//!
//! Each adapter lists its tiers (CLI first, then REST for most providers)
//! and [`run_tiers`] tries them strictly in sequence. A tier that fails for
//! any reason hands over to the next one; the chain only fails when every
//! tier has. Adding a tier (a GraphQL endpoint, say) means adding a
//! [`TierKind`] and handling it in the adapter's dispatch.

use std::fmt;
use std::future::Future;

use tracing::debug;

use super::remote::ProviderName;
use super::traits::ForgeError;

/// One stage of an adapter's retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    /// The provider's own command-line tool.
    Cli,
    /// The provider's REST API.
    Rest,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKind::Cli => write!(f, "cli"),
            TierKind::Rest => write!(f, "rest"),
        }
    }
}

/// CLI tool first, REST API second.
pub const CLI_THEN_REST: &[TierKind] = &[TierKind::Cli, TierKind::Rest];

/// REST API only (providers without an official CLI).
pub const REST_ONLY: &[TierKind] = &[TierKind::Rest];

/// Run `attempt` for each tier in order until one succeeds.
///
/// # Returns
///
/// The first successful value, or the most informative failure (see
/// [`ForgeError::rank`]). With no tiers the result is `Unavailable`.
pub async fn run_tiers<T, F, Fut>(
    provider: ProviderName,
    tiers: &[TierKind],
    mut attempt: F,
) -> Result<T, ForgeError>
where
    F: FnMut(TierKind) -> Fut,
    Fut: Future<Output = Result<T, ForgeError>>,
{
    let mut failure: Option<ForgeError> = None;

    for &tier in tiers {
        match attempt(tier).await {
            Ok(value) => {
                debug!(%provider, %tier, "tier succeeded");
                return Ok(value);
            }
            Err(err) => {
                debug!(%provider, %tier, error = %err, "tier failed, falling through");
                failure = Some(match failure {
                    Some(prev) if prev.rank() > err.rank() => prev,
                    _ => err,
                });
            }
        }
    }

    Err(failure.unwrap_or_else(|| ForgeError::Unavailable("no tiers configured".into())))
}
