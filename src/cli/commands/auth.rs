//! auth command - Report authentication status per provider

use anyhow::{bail, Result};
use serde_json::json;

use super::{print_json, runtime};
use crate::cli::Context;
use crate::forge::{AuthStatus, ProviderHandle, ProviderName};
use crate::ui::output;

/// Report how the user is authenticated with one or all providers.
///
/// Fails only when a single provider was asked for and it is not
/// authenticated.
pub fn auth(ctx: &Context, provider: Option<ProviderName>) -> Result<()> {
    let registry = ctx.registry();
    let providers: Vec<ProviderHandle> = match provider {
        Some(name) => match registry.get(name) {
            Some(handle) => vec![handle],
            None => bail!("No adapter for provider '{}'", name),
        },
        None => registry.providers(),
    };

    let rt = runtime()?;
    let statuses: Vec<(ProviderHandle, AuthStatus)> = rt.block_on(async {
        let mut statuses = Vec::with_capacity(providers.len());
        for handle in providers {
            let status = handle.auth_status().await;
            statuses.push((handle, status));
        }
        statuses
    });

    if ctx.json {
        let entries: Vec<_> = statuses
            .iter()
            .map(|(handle, status)| {
                json!({
                    "provider": handle.name(),
                    "authenticated": status.is_authenticated(),
                    "status": status,
                })
            })
            .collect();
        print_json(&entries)?;
    } else {
        for (handle, status) in &statuses {
            output::print(
                format!("{:<14} {}", handle.display_name(), status),
                ctx.verbosity,
            );
        }
    }

    if let (Some(name), [(_, status)]) = (provider, statuses.as_slice()) {
        if !status.is_authenticated() {
            bail!("Not authenticated with {}", name);
        }
    }
    Ok(())
}
