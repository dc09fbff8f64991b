//! probe command - Identify a self-hosted instance from its API

use anyhow::{bail, Result};
use serde_json::json;
use tokio::task::JoinSet;

use super::{print_json, runtime};
use crate::cli::Context;
use crate::forge::{ProviderHandle, ProviderName};
use crate::ui::output;

/// Probe `base_url` with one or all adapters and print those that answered.
pub fn probe(ctx: &Context, base_url: &str, provider: Option<ProviderName>) -> Result<()> {
    let registry = ctx.registry();
    let providers: Vec<ProviderHandle> = match provider {
        Some(name) => match registry.get(name) {
            Some(handle) => vec![handle],
            None => bail!("No adapter for provider '{}'", name),
        },
        None => registry.providers(),
    };

    let rt = runtime()?;
    let mut matched: Vec<ProviderName> = rt.block_on(async {
        let mut probes = JoinSet::new();
        for handle in providers {
            let base_url = base_url.to_string();
            probes.spawn(async move {
                let found = handle.detect_from_api(&base_url).await;
                (handle.name(), found)
            });
        }

        let mut matched = Vec::new();
        while let Some(joined) = probes.join_next().await {
            if let Ok((name, true)) = joined {
                matched.push(name);
            }
        }
        matched
    });
    matched.sort_by_key(|name| ProviderName::ALL.iter().position(|n| n == name));

    if matched.is_empty() {
        bail!("No provider API answered at {}", base_url);
    }

    if ctx.json {
        return print_json(&json!({ "url": base_url, "providers": matched }));
    }
    for name in &matched {
        output::print(name, ctx.verbosity);
    }
    Ok(())
}
