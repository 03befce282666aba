//! Asset command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use assetroom_core::{AssetRecord, Catalog};

use crate::output::{short_id, Output};
use crate::prompt::confirm;

/// Import a file and its cover into the catalog
pub fn add(
    catalog: &Catalog,
    file: PathBuf,
    cover: PathBuf,
    name: String,
    tags: String,
    output: &Output,
) -> Result<()> {
    let record = catalog
        .add_asset(&file, &cover, &name, &tags)
        .context("Failed to add asset")?;

    output.success(&format!("Added asset: {}", record.id));
    output.print_asset(&record);
    Ok(())
}

/// List assets, optionally filtered by a substring of name or tags
pub fn list(catalog: &Catalog, search: Option<String>, output: &Output) -> Result<()> {
    let assets = match search {
        Some(ref q) => catalog.search_assets(q)?,
        None => catalog.list_assets()?,
    };

    output.print_assets(&assets);
    Ok(())
}

/// Show a single asset
pub fn show(catalog: &Catalog, id: String, output: &Output) -> Result<()> {
    let record = find_asset(catalog, &id)?;
    output.print_asset(&record);
    Ok(())
}

/// Edit an asset's name, tags or cover
///
/// Omitted name or tags keep their current values.
pub fn edit(
    catalog: &mut Catalog,
    id: String,
    name: Option<String>,
    tags: Option<String>,
    cover: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    if name.is_none() && tags.is_none() && cover.is_none() {
        bail!("Nothing to change. Pass --name, --tags or --cover.");
    }

    let current = find_asset(catalog, &id)?;
    let name = name.unwrap_or_else(|| current.name.clone());
    let tags = tags.unwrap_or_else(|| current.tags.clone());

    let record = catalog
        .update_asset(&current.id, &name, &tags, cover.as_deref())
        .context("Failed to update asset")?;

    output.success("Asset updated");
    output.print_asset(&record);
    Ok(())
}

/// Delete an asset and its files
pub fn delete(catalog: &Catalog, id: String, yes: bool, output: &Output) -> Result<()> {
    let record = find_asset(catalog, &id)?;

    if output.should_prompt() && !yes {
        println!("Delete asset: {} - {}", short_id(&record.id), record.name);
        println!("This removes {} and its cover.", record.asset_path.display());
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    catalog
        .delete_asset(&record.id)
        .context("Failed to delete asset")?;

    output.success(&format!("Deleted asset: {}", record.id));
    Ok(())
}

/// Find an asset by exact id or unique id prefix
fn find_asset(catalog: &Catalog, id: &str) -> Result<AssetRecord> {
    if let Some(record) = catalog.get_asset(id)? {
        return Ok(record);
    }

    let mut matches: Vec<AssetRecord> = catalog
        .list_assets()?
        .into_iter()
        .filter(|a| a.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No asset found matching: {}", id),
        1 => Ok(matches.remove(0)),
        _ => {
            eprintln!("Multiple assets match '{}':", id);
            for asset in &matches {
                eprintln!("  {} - {}", asset.id, asset.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn catalog_with(names: &[&str]) -> (TempDir, TempDir, Catalog) {
        let root = TempDir::new().unwrap();
        let sources = TempDir::new().unwrap();
        let file = sources.path().join("clip.mp4");
        let cover = sources.path().join("poster.jpg");
        fs::write(&file, b"video").unwrap();
        fs::write(&cover, b"img").unwrap();

        let catalog = Catalog::open(root.path()).unwrap();
        for name in names {
            catalog.add_asset(&file, &cover, name, "tag").unwrap();
        }
        (root, sources, catalog)
    }

    #[test]
    fn test_find_asset_by_prefix() {
        let (_root, _src, catalog) = catalog_with(&["Trailer"]);
        let id = catalog.list_assets().unwrap()[0].id.clone();

        assert_eq!(find_asset(&catalog, &id).unwrap().id, id);
        assert_eq!(find_asset(&catalog, &id[..6]).unwrap().id, id);
        assert!(find_asset(&catalog, "zzzz").is_err());
    }

    #[test]
    fn test_find_asset_ambiguous_prefix() {
        let (_root, _src, catalog) = catalog_with(&["One", "Two"]);
        assert!(find_asset(&catalog, "").is_err());
    }

    #[test]
    fn test_edit_keeps_omitted_fields() {
        let (_root, _src, mut catalog) = catalog_with(&["Trailer"]);
        let id = catalog.list_assets().unwrap()[0].id.clone();
        let output = Output::new(crate::output::OutputFormat::Quiet);

        edit(
            &mut catalog,
            id.clone(),
            None,
            Some("video,final".to_string()),
            None,
            &output,
        )
        .unwrap();

        let record = catalog.get_asset(&id).unwrap().unwrap();
        assert_eq!(record.name, "Trailer");
        assert_eq!(record.tags, "video,final");
    }

    #[test]
    fn test_edit_requires_a_change() {
        let (_root, _src, mut catalog) = catalog_with(&["Trailer"]);
        let id = catalog.list_assets().unwrap()[0].id.clone();
        let output = Output::new(crate::output::OutputFormat::Quiet);

        assert!(edit(&mut catalog, id, None, None, None, &output).is_err());
    }

    #[test]
    fn test_delete_without_prompt_in_quiet_mode() {
        let (_root, _src, catalog) = catalog_with(&["Trailer"]);
        let record = catalog.list_assets().unwrap().remove(0);
        let output = Output::new(crate::output::OutputFormat::Quiet);

        delete(&catalog, record.id.clone(), false, &output).unwrap();
        assert_eq!(catalog.asset_count().unwrap(), 0);
        assert!(!record.asset_path.exists());
    }
}
