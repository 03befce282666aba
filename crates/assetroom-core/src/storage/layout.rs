//! On-disk catalog layout
//!
//! A catalog root holds three sibling directories:
//!
//! - `asr-db/assetroom.sqlite` - the asset store
//! - `assets/asset_<id>.<ext>` - imported primary files
//! - `covers/cover_<uuid>.<png|webp|jpg>` - imported cover images
//!
//! Paths handed to the store are always relative to the root and use `/`
//! as separator so a catalog folder can move between machines.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CopiedAsset, CoverExt, ImportedCover};

pub const DB_DIR: &str = "asr-db";
pub const DB_FILE: &str = "assetroom.sqlite";
pub const ASSETS_DIR: &str = "assets";
pub const COVERS_DIR: &str = "covers";

/// Resolved directory structure for one catalog root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub assets_dir: PathBuf,
    pub covers_dir: PathBuf,
}

impl CatalogLayout {
    /// Ensure the catalog directories exist under `root`
    ///
    /// Fails with `RootNotFound` if `root` itself is missing. The
    /// subdirectories are created if absent, so calling this repeatedly is
    /// harmless.
    pub fn ensure(root: &Path) -> CatalogResult<Self> {
        if !root.exists() {
            return Err(CatalogError::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let layout = Self::at(root);
        for dir in [
            layout.db_path.parent().unwrap_or(root),
            layout.assets_dir.as_path(),
            layout.covers_dir.as_path(),
        ] {
            fs::create_dir_all(dir).map_err(|source| CatalogError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        debug!("Catalog layout ready at {:?}", layout.root);
        Ok(layout)
    }

    /// Compute the layout paths without touching the filesystem
    pub fn at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            db_path: root.join(DB_DIR).join(DB_FILE),
            assets_dir: root.join(ASSETS_DIR),
            covers_dir: root.join(COVERS_DIR),
        }
    }

    /// Resolve a stored relative path against the root
    pub fn resolve(&self, rel_path: &str) -> PathBuf {
        resolve_rel(&self.root, rel_path)
    }

    /// Copy a primary file into `assets/` under a freshly generated id
    ///
    /// The source extension is kept as-is; a source without one produces an
    /// extensionless file. An existing file at the destination is
    /// overwritten.
    pub fn copy_asset(&self, source: &Path) -> CatalogResult<CopiedAsset> {
        let id = Uuid::new_v4().to_string();
        let file_name = match extension_of(source) {
            Some(ext) => format!("asset_{}.{}", id, ext),
            None => format!("asset_{}", id),
        };
        let abs_path = self.assets_dir.join(&file_name);

        copy_file(source, &abs_path)?;
        debug!("Copied asset {:?} -> {:?}", source, abs_path);

        Ok(CopiedAsset {
            id,
            rel_path: format!("{}/{}", ASSETS_DIR, file_name),
            abs_path,
        })
    }

    /// Copy a cover image into `covers/` under a generated name
    ///
    /// The extension is normalized to `png`, `webp` or `jpg`. The image
    /// bytes are copied untouched.
    pub fn import_cover(&self, source: &Path) -> CatalogResult<ImportedCover> {
        let ext = CoverExt::normalize(extension_of(source).as_deref());
        let file_name = format!("cover_{}.{}", Uuid::new_v4(), ext.as_str());
        let abs_path = self.covers_dir.join(&file_name);

        copy_file(source, &abs_path)?;
        debug!("Imported cover {:?} -> {:?}", source, abs_path);

        Ok(ImportedCover {
            rel_path: format!("{}/{}", COVERS_DIR, file_name),
            abs_path,
            ext,
        })
    }
}

/// Best-effort delete that tolerates an already-missing file
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> CatalogResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CatalogError::from_io(e, path)),
    }
}

/// Join a `/`-separated relative path onto `root` component by component
pub(crate) fn resolve_rel(root: &Path, rel_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in rel_path.split('/') {
        if !component.is_empty() {
            path.push(component);
        }
    }
    path
}

/// Canonical `seg/seg` form of a stored relative path
///
/// Drops empty and `.` segments, so `./assets//a.mp4` and `assets/a.mp4`
/// name the same file.
pub(crate) fn normalize_rel(rel_path: &str) -> String {
    rel_path
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

fn copy_file(source: &Path, dest: &Path) -> CatalogResult<()> {
    if !source.is_file() {
        return Err(CatalogError::FileNotFound {
            path: source.to_path_buf(),
        });
    }
    fs::copy(source, dest).map_err(|e| CatalogError::from_io(e, dest))?;
    Ok(())
}
