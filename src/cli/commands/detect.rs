//! detect command - Print the hosting provider of a remote URL

use anyhow::Result;
use serde_json::json;

use super::{print_json, remote_url};
use crate::cli::Context;
use crate::forge::detect_provider;
use crate::ui::output;

/// Print the provider name. `unknown` is a valid answer, not an error.
pub fn detect(ctx: &Context, url: Option<&str>) -> Result<()> {
    let url = remote_url(ctx, url)?;
    let provider = detect_provider(&url);

    if ctx.json {
        return print_json(&json!({ "url": url, "provider": provider }));
    }
    output::print(provider, ctx.verbosity);
    Ok(())
}
