//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "last_root": config.last_root,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            if let Some(ref root) = config.last_root {
                println!("{}", root.display());
            }
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  last_root: {}", display_or_unset(config.last_root.as_ref()));
            println!("  log_file:  {}", display_or_unset(config.log_file.as_ref()));
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    Config::update_file(&save_path, |config| config.set(&key, &value))
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn display_or_unset(path: Option<&PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
