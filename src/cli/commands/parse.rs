//! parse command - Split a remote URL into its parts

use anyhow::{bail, Result};

use super::{print_json, remote_url};
use crate::cli::Context;
use crate::forge::parse_remote_url;
use crate::ui::output;

/// Print the parsed remote, or fail when the URL is not understood.
pub fn parse(ctx: &Context, url: Option<&str>) -> Result<()> {
    let url = remote_url(ctx, url)?;
    let Some(info) = parse_remote_url(&url) else {
        bail!("Could not parse remote URL '{}'", url);
    };

    if ctx.json {
        return print_json(&info);
    }
    let lines = [
        format!("provider: {}", info.provider),
        format!("host:     {}", info.host),
        format!("owner:    {}", info.owner),
        format!("repo:     {}", info.repo),
    ];
    output::print(lines.join("\n"), ctx.verbosity);
    Ok(())
}
