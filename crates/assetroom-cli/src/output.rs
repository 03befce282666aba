//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use assetroom_core::{AssetRecord, SweepReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single asset
    pub fn print_asset(&self, asset: &AssetRecord) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", asset.id);
                println!("Name:    {}", asset.name);
                println!("Tags:    {}", asset.tag_list().join(", "));
                println!("File:    {}", asset.asset_path.display());
                println!("Cover:   {}", asset.cover_path.display());
                println!("Created: {}", format_created(asset));
            }
            OutputFormat::Json => print_json(asset),
            OutputFormat::Quiet => {
                println!("{}", asset.id);
            }
        }
    }

    /// Print a list of assets
    pub fn print_assets(&self, assets: &[AssetRecord]) {
        match self.format {
            OutputFormat::Human => {
                if assets.is_empty() {
                    println!("No assets found.");
                    return;
                }
                for asset in assets {
                    println!(
                        "{} | {} | {} | {}",
                        short_id(&asset.id),
                        truncate(&asset.name, 30),
                        truncate(&asset.tags, 30),
                        format_created(asset)
                    );
                }
                println!("\n{} asset(s)", assets.len());
            }
            OutputFormat::Json => print_json(&assets),
            OutputFormat::Quiet => {
                for asset in assets {
                    println!("{}", asset.id);
                }
            }
        }
    }

    /// Print the result of an orphan sweep
    pub fn print_sweep(&self, report: &SweepReport, dry_run: bool) {
        match self.format {
            OutputFormat::Human => {
                if report.orphan_files.is_empty() && report.missing_files.is_empty() {
                    println!("Catalog is consistent. Nothing to sweep.");
                    return;
                }
                let verb = if dry_run { "Would remove" } else { "Removed" };
                for path in &report.orphan_files {
                    println!("{}: {}", verb, path.display());
                }
                for rel in &report.missing_files {
                    println!("Missing:      {}", rel);
                }
                println!();
                println!(
                    "{} orphan file(s), {} removed, {} missing file(s)",
                    report.orphan_files.len(),
                    report.removed,
                    report.missing_files.len()
                );
            }
            OutputFormat::Json => print_json(report),
            OutputFormat::Quiet => {
                for path in &report.orphan_files {
                    println!("{}", path.display());
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn format_created(asset: &AssetRecord) -> String {
    asset
        .created_at_utc()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| asset.created_at.to_string())
}

/// First 8 characters of an id, as shown in listings
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("a1"), "a1");
        assert_eq!(short_id("0f8fad5b-d9cb-469f-a165-70867728950e"), "0f8fad5b");
    }
}
