//! providers command - List supported providers

use anyhow::Result;
use serde_json::json;

use super::print_json;
use crate::cli::Context;
use crate::ui::output;

/// Print each adapter's identity.
pub fn providers(ctx: &Context) -> Result<()> {
    let providers = ctx.registry().providers();

    if ctx.json {
        let entries: Vec<_> = providers
            .iter()
            .map(|p| {
                json!({
                    "name": p.name(),
                    "displayName": p.display_name(),
                    "prTerminology": p.pr_terminology(),
                    "cli": p.required_cli(),
                })
            })
            .collect();
        return print_json(&entries);
    }

    let mut lines = vec![format!(
        "{:<14} {:<14} {:<14} {}",
        "NAME", "DISPLAY", "PR TERM", "CLI"
    )];
    lines.extend(providers.iter().map(|p| {
        format!(
            "{:<14} {:<14} {:<14} {}",
            p.name().as_str(),
            p.display_name(),
            p.pr_terminology(),
            p.required_cli().unwrap_or("-")
        )
    }));
    output::print(lines.join("\n"), ctx.verbosity);
    Ok(())
}
