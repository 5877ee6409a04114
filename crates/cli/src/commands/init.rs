//! `codewright init` — write a starter config.

use codewright_config::AppConfig;

use super::CliResult;

pub fn run() -> CliResult {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Wrote default config: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set CODEWRIGHT_API_KEY (or OPENROUTER_API_KEY / OPENAI_API_KEY)");
    println!("  2. codewright run \"write a fizzbuzz in fizzbuzz.py\" --dir .");
    Ok(())
}
