//! AssetRoom CLI
//!
//! Command-line interface for AssetRoom - a folder-backed asset catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use assetroom_core::CatalogSession;

mod commands;
mod config;
mod logging;
mod output;
mod prompt;

use config::Config;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "assetroom")]
#[command(about = "AssetRoom - catalog files and covers in a folder you choose")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Catalog root (defaults to ASSETROOM_ROOT, then the last opened root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a folder as the catalog root and remember it
    Open {
        /// Existing folder to use as the root
        root: PathBuf,
    },
    /// List assets, newest first
    #[command(alias = "ls")]
    List {
        /// Only show assets whose name or tags contain this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show asset details
    Show {
        /// Asset ID (full or prefix)
        id: String,
    },
    /// Import a file and its cover
    #[command(alias = "import")]
    Add {
        /// File to import
        file: PathBuf,
        /// Cover image to import
        cover: PathBuf,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: String,
    },
    /// Edit an asset's name, tags or cover
    Edit {
        /// Asset ID (full or prefix)
        id: String,
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
        /// New comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// New cover image to import
        #[arg(short, long)]
        cover: Option<PathBuf>,
    },
    /// Delete an asset and its files
    #[command(alias = "rm")]
    Delete {
        /// Asset ID (full or prefix)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove files no asset references
    Sweep {
        /// Only report what would be removed
        #[arg(long)]
        dry_run: bool,
    },
    /// Show catalog location and size
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (last_root, log_file)
        key: String,
        /// Configuration value ("none" clears it)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(config.log_file.as_deref(), cli.verbose);

    // Commands that don't need a catalog
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let root = match &cli.command {
        Commands::Open { root } => root.clone(),
        _ => resolve_root(cli.root, &config)?,
    };
    let config_path = cli.config;
    let command = cli.command;

    // Store calls block; keep them off the async runtime
    tokio::task::spawn_blocking(move || {
        run_catalog_command(command, &root, config_path.as_ref(), &output)
    })
    .await
    .context("Catalog task failed")?
}

/// Pick the catalog root: `--root`, then `ASSETROOM_ROOT` or the saved root
fn resolve_root(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.last_root.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "No catalog root selected.\nRun `assetroom open <folder>` or pass --root <folder>."
        )
    })
}

fn run_catalog_command(
    command: Commands,
    root: &Path,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut session = CatalogSession::new();
    let catalog = session
        .open_catalog(root)
        .with_context(|| format!("Failed to open catalog at {}", root.display()))?;

    let result = match command {
        Commands::Open { .. } => commands::catalog::open(catalog, config_path, output),
        Commands::List { search } => commands::asset::list(catalog, search, output),
        Commands::Show { id } => commands::asset::show(catalog, id, output),
        Commands::Add {
            file,
            cover,
            name,
            tags,
        } => commands::asset::add(catalog, file, cover, name, tags, output),
        Commands::Edit {
            id,
            name,
            tags,
            cover,
        } => commands::asset::edit(catalog, id, name, tags, cover, output),
        Commands::Delete { id, yes } => commands::asset::delete(catalog, id, yes, output),
        Commands::Sweep { dry_run } => commands::catalog::sweep(catalog, dry_run, output),
        Commands::Status => commands::catalog::status(catalog, output),
        Commands::Config { .. } => unreachable!(), // Handled in main
    };

    session.close().context("Failed to close catalog")?;
    result
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
