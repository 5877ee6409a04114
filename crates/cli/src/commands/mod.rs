pub mod classify;
pub mod init;
pub mod run;

use std::sync::Arc;

use codewright_config::AppConfig;
use codewright_core::provider::Provider;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load and validate the config, failing early when no key is available.
pub fn load_config() -> CliResult<AppConfig> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    CODEWRIGHT_API_KEY   (highest priority)");
        eprintln!("    OPENROUTER_API_KEY");
        eprintln!("    OPENAI_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }
    Ok(config)
}

/// The configured default provider.
pub fn default_provider(config: &AppConfig) -> CliResult<Arc<dyn Provider>> {
    let router = codewright_providers::build_from_config(config);
    router
        .default()
        .ok_or_else(|| format!("Provider '{}' is not configured", config.default_provider).into())
}
