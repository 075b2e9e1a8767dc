//! Config subcommand handlers for Pagesmith.

use tracing::warn;

use pagesmith_config::{ConfigPatch, ConfigStore, ConfigValidator, LlmConfig};
use pagesmith_protocols::RouterError;

use crate::cli::ConfigAction;

/// Handle config subcommands.
pub(crate) fn handle_config_command(
    action: ConfigAction,
    store: &ConfigStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => config_show(store),
        ConfigAction::Set {
            provider,
            api_key,
            model,
            base_url,
        } => {
            let patch = ConfigPatch {
                provider,
                api_key: api_key.map(|k| k.trim().to_string()),
                model: model.map(|m| m.trim().to_string()),
                base_url,
            };
            let saved = config_set(store, &patch)?;
            println!("Configuration saved successfully!");
            print_config(&saved);
            Ok(())
        }
    }
}

fn config_show(store: &ConfigStore) -> Result<(), Box<dyn std::error::Error>> {
    let Some(config) = store.load()? else {
        println!("No configuration saved at {}", store.path().display());
        println!("Run `pagesmith config set --provider <p> --api-key <key> --model <m>` first.");
        return Ok(());
    };

    println!("Config store: {}", store.path().display());
    print_config(&config);

    for issue in ConfigValidator::validate(&config) {
        let label = if issue.is_error() { "error" } else { "warning" };
        println!("  {}: {}", label, issue);
    }
    Ok(())
}

/// Merge `patch` into the stored record, validate and save it.
fn config_set(store: &ConfigStore, patch: &ConfigPatch) -> Result<LlmConfig, Box<dyn std::error::Error>> {
    if patch.is_empty() {
        return Err("Nothing to update; pass at least one of --provider, --api-key, --model, --base-url".into());
    }

    let merged = store.load()?.unwrap_or_default().merged(patch);
    if !merged.is_complete() {
        return Err(RouterError::IncompleteConfig.into());
    }

    let issues = ConfigValidator::validate(&merged);
    for issue in issues.iter().filter(|issue| !issue.is_error()) {
        warn!("{}", issue);
    }
    if ConfigValidator::has_errors(&issues) {
        let errors: Vec<String> = issues
            .iter()
            .filter(|issue| issue.is_error())
            .map(ToString::to_string)
            .collect();
        return Err(errors.join("; ").into());
    }

    store
        .save(&merged)
        .map_err(|e| RouterError::SaveFailed(e.to_string()))?;
    Ok(merged)
}

fn print_config(config: &LlmConfig) {
    println!("  provider: {}", config.provider);
    println!("  api key:  {}", redact_key(&config.api_key));
    println!("  model:    {}", config.model);
    println!(
        "  base url: {}",
        config.base_url.as_deref().unwrap_or("(provider default)")
    );
}

/// Show only the ends of a key.
fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
