//! Catalog-level command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use assetroom_core::Catalog;

use crate::config::Config;
use crate::output::{Output, OutputFormat};

/// Open (or create) a catalog and remember its root
pub fn open(catalog: &Catalog, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    Config::update_file(&save_path, |config| {
        config.last_root = Some(catalog.root().to_path_buf());
        Ok(())
    })
    .context("Failed to save configuration")?;

    output.success(&format!(
        "Opened catalog at {} ({} asset(s))",
        catalog.root().display(),
        catalog.asset_count()?
    ));
    Ok(())
}

/// Show where the catalog lives and how much it holds
pub fn status(catalog: &Catalog, output: &Output) -> Result<()> {
    let layout = catalog.layout();
    let count = catalog.asset_count()?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "root": layout.root,
                    "database": layout.db_path,
                    "assets_dir": layout.assets_dir,
                    "covers_dir": layout.covers_dir,
                    "assets": count
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", layout.root.display());
        }
        OutputFormat::Human => {
            println!("AssetRoom Status");
            println!("================");
            println!();
            println!("Root:     {}", layout.root.display());
            println!("Database: {}", layout.db_path.display());
            println!("Assets:   {}", layout.assets_dir.display());
            println!("Covers:   {}", layout.covers_dir.display());
            println!();
            println!("Contents: {} asset(s)", count);
        }
    }

    Ok(())
}

/// Find (and unless dry-run, remove) files no record references
pub fn sweep(catalog: &Catalog, dry_run: bool, output: &Output) -> Result<()> {
    let report = catalog
        .sweep_orphans(dry_run)
        .context("Failed to sweep catalog")?;
    output.print_sweep(&report, dry_run);
    Ok(())
}
