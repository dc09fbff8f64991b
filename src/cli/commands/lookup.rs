//! pr and issue commands - Show a pull request or an issue

use anyhow::{anyhow, bail, Result};

use super::{print_json, runtime};
use crate::cli::args::LookupArgs;
use crate::cli::Context;
use crate::forge::{validate_number, workdir, ProviderHandle};
use crate::ui::output;

/// Provider and repository a lookup is aimed at.
struct Target {
    provider: ProviderHandle,
    owner: Option<String>,
    repo: Option<String>,
}

/// Fill in whatever the flags left out from the working directory.
fn resolve_target(ctx: &Context, args: &LookupArgs) -> Result<Target> {
    let registry = ctx.registry();
    let provider = match (args.provider, registry.resolve(&ctx.cwd, args.provider)) {
        (_, Some(provider)) => provider,
        (Some(name), None) => bail!("No adapter for provider '{}'", name),
        (None, None) => bail!(
            "Could not determine the hosting provider for {}. \
             Pass --provider or set default_provider in the config file.",
            ctx.cwd.display()
        ),
    };

    let remote = workdir::parse_remote_at(&ctx.cwd, ctx.config.remote());
    let owner = args
        .owner
        .clone()
        .or_else(|| remote.as_ref().map(|r| r.owner.clone()));
    let repo = args
        .repo
        .clone()
        .or_else(|| remote.as_ref().map(|r| r.repo.clone()));

    output::debug(
        format!(
            "using {} for {}/{}",
            provider.display_name(),
            owner.as_deref().unwrap_or("?"),
            repo.as_deref().unwrap_or("?")
        ),
        ctx.verbosity,
    );
    Ok(Target {
        provider,
        owner,
        repo,
    })
}

/// Show a pull request.
pub fn pr(ctx: &Context, args: &LookupArgs) -> Result<()> {
    let target = resolve_target(ctx, args)?;
    let provider = &target.provider;

    let rt = runtime()?;
    let info = rt
        .block_on(provider.view_pr(
            args.number,
            target.owner.as_deref(),
            target.repo.as_deref(),
        ))
        .ok_or_else(|| not_retrieved(provider.pr_terminology(), args.number, provider))?;

    if ctx.json {
        return print_json(&info);
    }

    let mut lines = vec![
        info.title.clone(),
        format!("{} -> {}", info.head_branch, info.base_branch),
    ];
    if let Some(author) = &info.author {
        lines.push(format!("author: {}", author));
    }
    if let Some(refspec) = validate_number(args.number)
        .ok()
        .and_then(|n| provider.pr_refspec(n))
    {
        lines.push(format!("refspec: {}", refspec));
    }
    lines.push(info.url.clone());
    if !info.body.is_empty() {
        lines.push(String::new());
        lines.push(info.body.clone());
    }
    output::print(lines.join("\n"), ctx.verbosity);
    Ok(())
}

/// Show an issue.
pub fn issue(ctx: &Context, args: &LookupArgs) -> Result<()> {
    let target = resolve_target(ctx, args)?;
    let provider = &target.provider;

    let rt = runtime()?;
    let info = rt
        .block_on(provider.view_issue(
            args.number,
            target.owner.as_deref(),
            target.repo.as_deref(),
        ))
        .ok_or_else(|| not_retrieved("issue", args.number, provider))?;

    if ctx.json {
        return print_json(&info);
    }

    let mut lines = vec![info.title.clone()];
    if !info.labels.is_empty() {
        lines.push(format!("labels: {}", info.labels.join(", ")));
    }
    lines.push(info.url.clone());
    if !info.body.is_empty() {
        lines.push(String::new());
        lines.push(info.body.clone());
    }
    output::print(lines.join("\n"), ctx.verbosity);
    Ok(())
}

fn not_retrieved(what: &str, number: i64, provider: &ProviderHandle) -> anyhow::Error {
    anyhow!(
        "Could not retrieve {} #{} from {} (run with --debug for details)",
        what,
        number,
        provider.display_name()
    )
}
