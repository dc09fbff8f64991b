//! config command - Show the effective configuration

use anyhow::Result;
use serde_json::json;

use super::print_json;
use crate::cli::Context;
use crate::forge::ProviderName;
use crate::ui::output;

/// Print where the config came from and every effective value.
pub fn config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let urls: Vec<(ProviderName, &str)> = ProviderName::ALL
        .iter()
        .filter_map(|name| config.provider_url(*name).map(|url| (*name, url)))
        .collect();

    if ctx.json {
        let providers: serde_json::Map<String, serde_json::Value> = urls
            .iter()
            .map(|(name, url)| (name.as_str().to_string(), json!({ "url": url })))
            .collect();
        return print_json(&json!({
            "path": config.loaded_from(),
            "remote": config.remote(),
            "defaultProvider": config.default_provider(),
            "timeouts": {
                "cliSecs": config.cli_timeout().as_secs(),
                "httpSecs": config.http_timeout().as_secs(),
                "probeSecs": config.probe_timeout().as_secs(),
            },
            "providers": providers,
        }));
    }

    let path = config
        .loaded_from()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none, using defaults)".to_string());
    let mut lines = vec![
        format!("file:             {}", path),
        format!("remote:           {}", config.remote()),
        format!(
            "default_provider: {}",
            config
                .default_provider()
                .map(|p| p.as_str())
                .unwrap_or("-")
        ),
        format!("timeouts.cli:     {}s", config.cli_timeout().as_secs()),
        format!("timeouts.http:    {}s", config.http_timeout().as_secs()),
        format!("timeouts.probe:   {}s", config.probe_timeout().as_secs()),
    ];
    for (name, url) in &urls {
        lines.push(format!("providers.{}.url: {}", name, url));
    }
    output::print(lines.join("\n"), ctx.verbosity);
    Ok(())
}
