//! Logging setup
//!
//! Logs go to stderr, or to the configured log file without ANSI colors.
//! `RUST_LOG` overrides the default filter.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn init(log_file: Option<&Path>, verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "assetroom_core={},assetroom_cli={}",
            log_level, log_level
        ))
    });

    let Some(path) = log_file else {
        // Ignore error if already initialized
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(file)
        .try_init();

    debug!("Logging to {:?}", path);
}
