//! Catalog service
//!
//! The `Catalog` pairs a [`CatalogLayout`] with its [`AssetStore`] and
//! sequences file and database work so the two never drift apart:
//!
//! - **add**: copy the file and cover, then insert. Copied files are removed
//!   again if a later step fails.
//! - **update**: one transaction for name/tags/cover. A new cover replaces
//!   the old file only after the transaction commits.
//! - **delete**: the row goes first; backing files are removed best-effort
//!   and removal failures are logged, not returned.
//!
//! A file is only ever removed once no remaining record references it.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = CatalogSession::new();
//! session.open_catalog(Path::new("/media/library"))?;
//!
//! let record = session.add_asset(&clip, &poster, "Trailer", "video,2026")?;
//! session.update_asset(&record.id, "Trailer v2", "video,2026,final", None)?;
//! session.delete_asset(&record.id)?;
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{AssetRecord, DeletedAsset, SweepReport};
use crate::storage::layout::{normalize_rel, remove_if_exists, ASSETS_DIR, COVERS_DIR};
use crate::storage::store::validate_name_and_tags;
use crate::storage::{AssetStore, CatalogLayout};

/// One open catalog root and its store connection
pub struct Catalog {
    layout: CatalogLayout,
    store: AssetStore,
}

impl Catalog {
    /// Open the catalog at `root`, creating its layout and store if needed
    pub fn open(root: &Path) -> CatalogResult<Self> {
        let root = fs::canonicalize(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CatalogError::RootNotFound {
                path: root.to_path_buf(),
            },
            _ => CatalogError::from_io(e, root),
        })?;
        let layout = CatalogLayout::ensure(&root)?;
        let store = AssetStore::open(&layout.db_path)?;

        info!("Opened catalog at {:?}", layout.root);
        Ok(Self { layout, store })
    }

    /// The canonical catalog root
    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    /// Direct access to the store (for inspection and tests)
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Close the store connection
    pub fn close(self) -> CatalogResult<()> {
        info!("Closing catalog at {:?}", self.layout.root);
        self.store.close()
    }

    /// All assets, newest first
    pub fn list_assets(&self) -> CatalogResult<Vec<AssetRecord>> {
        self.store.list(self.root())
    }

    /// Assets whose name or tags contain `query` (case-insensitive)
    pub fn search_assets(&self, query: &str) -> CatalogResult<Vec<AssetRecord>> {
        let query = query.trim();
        let records = self.list_assets()?;
        if query.is_empty() {
            return Ok(records);
        }
        Ok(records.into_iter().filter(|r| r.matches(query)).collect())
    }

    /// Look up one asset by exact id
    pub fn get_asset(&self, id: &str) -> CatalogResult<Option<AssetRecord>> {
        self.store.get(self.root(), id)
    }

    pub fn asset_count(&self) -> CatalogResult<i64> {
        self.store.count()
    }

    /// Import a file and its cover, then record them
    ///
    /// Name and tags are validated before anything is copied. If a later
    /// step fails, files copied by this call are removed again.
    pub fn add_asset(
        &self,
        file_path: &Path,
        cover_path: &Path,
        name: &str,
        tags: &str,
    ) -> CatalogResult<AssetRecord> {
        let (name, tags) = validate_name_and_tags(name, tags)?;

        let copied = self.layout.copy_asset(file_path)?;

        let cover = match self.layout.import_cover(cover_path) {
            Ok(cover) => cover,
            Err(e) => {
                discard(&copied.abs_path);
                return Err(e);
            }
        };

        if let Err(e) = self
            .store
            .insert(&copied.id, name, tags, &copied.rel_path, &cover.rel_path)
        {
            discard(&copied.abs_path);
            discard(&cover.abs_path);
            return Err(e);
        }

        info!("Added asset {} ({})", copied.id, name);
        self.get_asset(&copied.id)?
            .ok_or(CatalogError::NotFound { id: copied.id })
    }

    /// Change name and tags, optionally replacing the cover
    ///
    /// A replacement cover is imported first and recorded in the same
    /// transaction as the name/tags change. The superseded cover file is
    /// removed once that transaction commits; on failure the freshly
    /// imported cover is removed instead.
    pub fn update_asset(
        &mut self,
        id: &str,
        name: &str,
        tags: &str,
        new_cover_path: Option<&Path>,
    ) -> CatalogResult<AssetRecord> {
        validate_name_and_tags(name, tags)?;

        let Some(cover_source) = new_cover_path else {
            self.store.update_name_and_tags(id, name, tags, None)?;
            info!("Updated asset {}", id);
            return self.require_asset(id);
        };

        let previous = self.require_asset(id)?;
        let cover = self.layout.import_cover(cover_source)?;

        if let Err(e) = self
            .store
            .update_name_and_tags(id, name, tags, Some(&cover.rel_path))
        {
            discard(&cover.abs_path);
            return Err(e);
        }

        self.discard_unreferenced(&previous.cover_rel_path);

        info!("Updated asset {} with new cover {}", id, cover.rel_path);
        self.require_asset(id)
    }

    /// Remove an asset record, then its backing files
    ///
    /// The operation succeeds once the row is gone; file removal errors are
    /// only logged.
    pub fn delete_asset(&self, id: &str) -> CatalogResult<DeletedAsset> {
        let deleted = self.store.delete(id)?;

        for rel_path in [&deleted.asset_rel_path, &deleted.cover_rel_path]
            .into_iter()
            .flatten()
        {
            self.discard_unreferenced(rel_path);
        }

        info!("Deleted asset {}", id);
        Ok(deleted)
    }

    /// Reconcile files on disk with the paths the store references
    ///
    /// Files in `assets/` or `covers/` that no record points at are reported
    /// and, unless `dry_run`, removed. Records whose files are missing are
    /// reported only.
    pub fn sweep_orphans(&self, dry_run: bool) -> CatalogResult<SweepReport> {
        let referenced = self.referenced_paths()?;
        let mut report = SweepReport::default();

        for (dir_name, dir) in [
            (ASSETS_DIR, &self.layout.assets_dir),
            (COVERS_DIR, &self.layout.covers_dir),
        ] {
            let entries = fs::read_dir(dir).map_err(|e| CatalogError::from_io(e, dir))?;
            for entry in entries {
                let entry = entry.map_err(|e| CatalogError::from_io(e, dir))?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }

                let rel_path = format!("{}/{}", dir_name, entry.file_name().to_string_lossy());
                if referenced.contains(&rel_path) {
                    continue;
                }

                if !dry_run {
                    match remove_if_exists(&path) {
                        Ok(_) => report.removed += 1,
                        Err(e) => warn!("Could not remove orphan {:?}: {}", path, e),
                    }
                }
                report.orphan_files.push(path);
            }
        }

        report.missing_files = referenced
            .into_iter()
            .filter(|rel| !self.layout.resolve(rel).exists())
            .collect();

        report.orphan_files.sort();
        report.missing_files.sort();

        info!(
            "Sweep found {} orphan(s), {} missing file(s), removed {}",
            report.orphan_files.len(),
            report.missing_files.len(),
            report.removed
        );
        Ok(report)
    }

    /// Stored paths in canonical form
    fn referenced_paths(&self) -> CatalogResult<HashSet<String>> {
        let paths = self.store.referenced_paths()?;
        Ok(paths.iter().map(|p| normalize_rel(p)).collect())
    }

    /// Remove the file at `rel_path` unless a record still points at it
    fn discard_unreferenced(&self, rel_path: &str) {
        match self.referenced_paths() {
            Ok(referenced) if referenced.contains(&normalize_rel(rel_path)) => {
                debug!("Keeping {} (still referenced)", rel_path);
            }
            Ok(_) => discard(&self.layout.resolve(rel_path)),
            Err(e) => warn!("Could not check references for {}: {}", rel_path, e),
        }
    }

    fn require_asset(&self, id: &str) -> CatalogResult<AssetRecord> {
        self.get_asset(id)?
            .ok_or_else(|| CatalogError::NotFound { id: id.to_string() })
    }
}

/// Application-owned catalog state: at most one open root at a time
///
/// Opening a new root replaces (and closes) the previous catalog. Every
/// operation fails with `NotOpen` until a catalog has been opened.
#[derive(Default)]
pub struct CatalogSession {
    current: Option<Catalog>,
}

impl CatalogSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `root`, closing whichever catalog was open before
    ///
    /// The previous catalog stays open if `root` cannot be opened.
    pub fn open_catalog(&mut self, root: &Path) -> CatalogResult<&mut Catalog> {
        let catalog = Catalog::open(root)?;

        if let Some(previous) = self.current.take() {
            if let Err(e) = previous.close() {
                warn!("Error closing previous catalog: {}", e);
            }
        }

        Ok(self.current.insert(catalog))
    }

    /// Close the open catalog, if any
    pub fn close(&mut self) -> CatalogResult<()> {
        match self.current.take() {
            Some(catalog) => catalog.close(),
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Root of the open catalog
    pub fn root(&self) -> Option<&Path> {
        self.current.as_ref().map(Catalog::root)
    }

    pub fn catalog(&self) -> CatalogResult<&Catalog> {
        self.current.as_ref().ok_or(CatalogError::NotOpen)
    }

    pub fn catalog_mut(&mut self) -> CatalogResult<&mut Catalog> {
        self.current.as_mut().ok_or(CatalogError::NotOpen)
    }

    /// The open catalog, provided it belongs to `root`
    pub fn catalog_for(&mut self, root: &Path) -> CatalogResult<&mut Catalog> {
        let requested = fs::canonicalize(root).unwrap_or_else(|_| PathBuf::from(root));
        let catalog = self.catalog_mut()?;
        if catalog.root() != requested {
            return Err(CatalogError::RootMismatch {
                open: catalog.root().to_path_buf(),
                requested,
            });
        }
        Ok(catalog)
    }

    pub fn list_assets(&self) -> CatalogResult<Vec<AssetRecord>> {
        self.catalog()?.list_assets()
    }

    pub fn add_asset(
        &self,
        file_path: &Path,
        cover_path: &Path,
        name: &str,
        tags: &str,
    ) -> CatalogResult<AssetRecord> {
        self.catalog()?.add_asset(file_path, cover_path, name, tags)
    }

    pub fn update_asset(
        &mut self,
        id: &str,
        name: &str,
        tags: &str,
        new_cover_path: Option<&Path>,
    ) -> CatalogResult<AssetRecord> {
        self.catalog_mut()?.update_asset(id, name, tags, new_cover_path)
    }

    pub fn delete_asset(&self, id: &str) -> CatalogResult<DeletedAsset> {
        self.catalog()?.delete_asset(id)
    }
}

/// Best-effort removal used by rollback and cleanup paths
fn discard(path: &Path) {
    if let Err(e) = remove_if_exists(path) {
        warn!("Could not remove {:?}: {}", path, e);
    }
}
