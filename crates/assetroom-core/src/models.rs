//! Data models for AssetRoom
//!
//! Defines the catalog record and the small value types passed between the
//! layout manager, the store and the catalog service.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cataloged asset as returned by listing queries
///
/// Relative paths are what the store persists; absolute paths are resolved
/// against the catalog root at query time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    /// Unique identifier (primary key)
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text tags, comma-separated by convention
    pub tags: String,
    /// Primary file, relative to the catalog root
    pub asset_rel_path: String,
    /// Cover image, relative to the catalog root
    pub cover_rel_path: String,
    /// Primary file resolved against the root
    pub asset_path: PathBuf,
    /// Cover image resolved against the root
    pub cover_path: PathBuf,
    /// Seconds since the Unix epoch
    pub created_at: i64,
}

impl AssetRecord {
    /// Split the tag string on commas, dropping empty entries
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Creation time as a UTC datetime, if representable
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    /// Naive case-insensitive substring match over name and tags
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.tags.to_lowercase().contains(&query)
    }
}

/// Result of copying a primary file into `assets/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedAsset {
    /// Freshly generated asset id
    pub id: String,
    /// Path to persist, relative to the root
    pub rel_path: String,
    /// Absolute destination path
    pub abs_path: PathBuf,
}

/// Result of importing a cover image into `covers/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedCover {
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub ext: CoverExt,
}

/// The cover extensions a catalog stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverExt {
    Png,
    Webp,
    Jpg,
}

impl CoverExt {
    /// Normalize a source extension, defaulting to `jpg`
    pub fn normalize(ext: Option<&str>) -> Self {
        match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("png") => CoverExt::Png,
            Some("webp") => CoverExt::Webp,
            _ => CoverExt::Jpg,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverExt::Png => "png",
            CoverExt::Webp => "webp",
            CoverExt::Jpg => "jpg",
        }
    }
}

/// Relative paths a delete removed from the store
///
/// Either path may be absent if the row vanished between lookup and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedAsset {
    pub asset_rel_path: Option<String>,
    pub cover_rel_path: Option<String>,
}

/// Outcome of an orphan sweep
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SweepReport {
    /// Files on disk no record references (deleted unless dry run)
    pub orphan_files: Vec<PathBuf>,
    /// Referenced relative paths whose files are missing
    pub missing_files: Vec<String>,
    /// Orphans actually removed
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, tags: &str) -> AssetRecord {
        AssetRecord {
            id: "a1".to_string(),
            name: name.to_string(),
            tags: tags.to_string(),
            asset_rel_path: "assets/asset_a1.mp4".to_string(),
            cover_rel_path: "covers/cover_x.jpg".to_string(),
            asset_path: PathBuf::from("/root/assets/asset_a1.mp4"),
            cover_path: PathBuf::from("/root/covers/cover_x.jpg"),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_tag_list() {
        let r = record("Trailer", "video, 2026,,final ");
        assert_eq!(r.tag_list(), vec!["video", "2026", "final"]);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let r = record("Trailer", "video,2026");
        assert!(r.matches("trail"));
        assert!(r.matches("VIDEO"));
        assert!(!r.matches("audio"));
    }

    #[test]
    fn test_cover_ext_normalize() {
        assert_eq!(CoverExt::normalize(Some("PNG")), CoverExt::Png);
        assert_eq!(CoverExt::normalize(Some("webp")), CoverExt::Webp);
        assert_eq!(CoverExt::normalize(Some("jpeg")), CoverExt::Jpg);
        assert_eq!(CoverExt::normalize(Some("gif")), CoverExt::Jpg);
        assert_eq!(CoverExt::normalize(None), CoverExt::Jpg);
    }

    #[test]
    fn test_created_at_utc() {
        let r = record("Trailer", "video");
        assert_eq!(r.created_at_utc().unwrap().timestamp(), 1_700_000_000);
    }
}
