//! SQLite asset store
//!
//! One connection to `asr-db/assetroom.sqlite`, one `assets` table. The
//! store only knows relative paths; callers pass the catalog root when they
//! want absolute ones back.
//!
//! ## Ordering
//!
//! Listing is newest first by `created_at`, compared as an integer so that
//! timestamps of different digit widths still sort correctly. Rows created
//! in the same second keep insertion order (latest insert first).

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{AssetRecord, DeletedAsset};
use crate::storage::layout::resolve_rel;
use crate::storage::schema::{init_schema, needs_init};

const SELECT_COLUMNS: &str = "SELECT id, name, tags, asset_rel_path, cover_rel_path, \
     CAST(created_at AS INTEGER) FROM assets";

/// Single-connection store for asset records
pub struct AssetStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl AssetStore {
    /// Open or create the store at `path`
    ///
    /// The schema is created on first open only; reopening an existing
    /// store leaves its data and schema untouched.
    pub fn open(path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CatalogError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        if needs_init(&conn) {
            init_schema(&conn)?;
            debug!("Initialized asset store schema at {:?}", path);
        }

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Database file backing this store, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> CatalogResult<()> {
        self.conn.close().map_err(|(_, e)| CatalogError::Database(e))
    }

    /// Insert a new asset stamped with the current time
    pub fn insert(
        &self,
        id: &str,
        name: &str,
        tags: &str,
        asset_rel_path: &str,
        cover_rel_path: &str,
    ) -> CatalogResult<()> {
        self.insert_at(
            id,
            name,
            tags,
            asset_rel_path,
            cover_rel_path,
            Utc::now().timestamp(),
        )
    }

    /// Insert a new asset with an explicit `created_at` (seconds)
    ///
    /// Fails with `ConstraintViolation` if `id` is already present.
    pub fn insert_at(
        &self,
        id: &str,
        name: &str,
        tags: &str,
        asset_rel_path: &str,
        cover_rel_path: &str,
        created_at: i64,
    ) -> CatalogResult<()> {
        validate_rel_path(asset_rel_path)?;
        validate_rel_path(cover_rel_path)?;

        self.conn
            .execute(
                "INSERT INTO assets (id, name, tags, asset_rel_path, cover_rel_path, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    name,
                    tags,
                    asset_rel_path,
                    cover_rel_path,
                    created_at.to_string()
                ],
            )
            .map_err(|e| CatalogError::from_insert(e, id))?;

        debug!("Inserted asset {}", id);
        Ok(())
    }

    /// All assets, newest first, with paths resolved against `root`
    pub fn list(&self, root: &Path) -> CatalogResult<Vec<AssetRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} ORDER BY CAST(created_at AS INTEGER) DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt.query_map([], |row| record_from_row(row, root))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Look up one asset by exact id
    pub fn get(&self, root: &Path, id: &str) -> CatalogResult<Option<AssetRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                |row| record_from_row(row, root),
            )
            .optional()?;
        Ok(record)
    }

    /// Number of stored assets
    pub fn count(&self) -> CatalogResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Every relative path the store references (assets and covers)
    pub fn referenced_paths(&self) -> CatalogResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT asset_rel_path, cover_rel_path FROM assets")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut paths = HashSet::new();
        for row in rows {
            let (asset, cover) = row?;
            paths.insert(asset);
            paths.insert(cover);
        }
        Ok(paths)
    }

    /// Update name and tags, and optionally the cover path, atomically
    ///
    /// Both statements run in one immediate transaction: either every change
    /// commits or none does. Name and tags are trimmed and must not be empty.
    pub fn update_name_and_tags(
        &mut self,
        id: &str,
        name: &str,
        tags: &str,
        cover_rel_path: Option<&str>,
    ) -> CatalogResult<()> {
        let (name, tags) = validate_name_and_tags(name, tags)?;
        if let Some(cover) = cover_rel_path {
            validate_rel_path(cover)?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = tx.execute(
            "UPDATE assets SET name = ?1, tags = ?2 WHERE id = ?3",
            params![name, tags, id],
        )?;
        if updated == 0 {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }

        if let Some(cover) = cover_rel_path {
            tx.execute(
                "UPDATE assets SET cover_rel_path = ?1 WHERE id = ?2",
                params![cover, id],
            )?;
        }

        tx.commit()?;
        debug!("Updated asset {} (new cover: {})", id, cover_rel_path.is_some());
        Ok(())
    }

    /// Delete an asset, returning the relative paths it referenced
    pub fn delete(&self, id: &str) -> CatalogResult<DeletedAsset> {
        let paths: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT asset_rel_path, cover_rel_path FROM assets WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let deleted = self
            .conn
            .execute("DELETE FROM assets WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound { id: id.to_string() });
        }

        debug!("Deleted asset {}", id);
        let (asset_rel_path, cover_rel_path) = match paths {
            Some((asset, cover)) => (Some(asset), Some(cover)),
            None => (None, None),
        };
        Ok(DeletedAsset {
            asset_rel_path,
            cover_rel_path,
        })
    }
}

/// Trim name and tags, rejecting values that end up empty
pub fn validate_name_and_tags<'a>(
    name: &'a str,
    tags: &'a str,
) -> CatalogResult<(&'a str, &'a str)> {
    let name = name.trim();
    let tags = tags.trim();
    if name.is_empty() {
        return Err(CatalogError::InvalidArgument(
            "name must not be empty".to_string(),
        ));
    }
    if tags.is_empty() {
        return Err(CatalogError::InvalidArgument(
            "tags must not be empty".to_string(),
        ));
    }
    Ok((name, tags))
}

/// Accept only canonical `seg/seg` paths below the catalog root
///
/// Empty, `.` and `..` segments are refused, as are absolute paths and
/// backslashes, so every stored path has exactly one spelling.
fn validate_rel_path(rel_path: &str) -> CatalogResult<()> {
    let canonical = !rel_path.is_empty()
        && !Path::new(rel_path).is_absolute()
        && !rel_path.contains('\\')
        && rel_path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
        && Path::new(rel_path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

    if !canonical {
        return Err(CatalogError::InvalidArgument(format!(
            "'{}' is not a canonical path relative to the catalog root",
            rel_path
        )));
    }
    Ok(())
}

fn record_from_row(row: &Row<'_>, root: &Path) -> rusqlite::Result<AssetRecord> {
    let asset_rel_path: String = row.get(3)?;
    let cover_rel_path: String = row.get(4)?;
    Ok(AssetRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        tags: row.get(2)?,
        asset_path: resolve_rel(root, &asset_rel_path),
        cover_path: resolve_rel(root, &cover_rel_path),
        asset_rel_path,
        cover_rel_path,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROOT: &str = "/catalog";

    fn store_with_trailer() -> AssetStore {
        let store = AssetStore::open_in_memory().unwrap();
        store
            .insert(
                "a1",
                "Trailer",
                "video,2026",
                "assets/asset_a1.mp4",
                "covers/cover_x.jpg",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_insert_and_list() {
        let store = store_with_trailer();
        let records = store.list(Path::new(ROOT)).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "a1");
        assert_eq!(r.name, "Trailer");
        assert_eq!(r.tags, "video,2026");
        assert_eq!(r.asset_rel_path, "assets/asset_a1.mp4");
        assert_eq!(r.asset_path, PathBuf::from("/catalog/assets/asset_a1.mp4"));
        assert_eq!(r.cover_path, PathBuf::from("/catalog/covers/cover_x.jpg"));
        assert!(r.created_at > 0);
    }

    #[test]
    fn test_created_at_stored_as_decimal_text() {
        let store = AssetStore::open_in_memory().unwrap();
        store
            .insert_at("a1", "n", "t", "assets/a", "covers/c.jpg", 1_700_000_000)
            .unwrap();

        let (kind, value): (String, String) = store
            .connection()
            .query_row(
                "SELECT typeof(created_at), created_at FROM assets WHERE id = 'a1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(kind, "text");
        assert_eq!(value, "1700000000");
    }

    #[test]
    fn test_duplicate_id_is_constraint_violation() {
        let store = store_with_trailer();
        let err = store
            .insert("a1", "Other", "x", "assets/asset_a1.bin", "covers/c.jpg")
            .unwrap_err();

        assert!(matches!(err, CatalogError::ConstraintViolation { .. }));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_rejects_absolute_paths() {
        let store = AssetStore::open_in_memory().unwrap();

        let err = store
            .insert("a1", "n", "t", "/etc/passwd", "covers/c.jpg")
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));

        let err = store
            .insert("a1", "n", "t", "assets/a", "../covers/c.jpg")
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_rejects_non_canonical_paths() {
        let mut store = AssetStore::open_in_memory().unwrap();

        for (asset, cover) in [
            ("./assets/asset_a1.mp4", "covers/cover_x.jpg"),
            ("assets/asset_a1.mp4", "covers//cover_x.jpg"),
            ("assets/./asset_a1.mp4", "covers/cover_x.jpg"),
            ("assets/asset_a1.mp4/", "covers/cover_x.jpg"),
            ("assets\\asset_a1.mp4", "covers/cover_x.jpg"),
        ] {
            let err = store.insert("a1", "n", "t", asset, cover).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidArgument(_)), "{asset} {cover}");
        }
        assert_eq!(store.count().unwrap(), 0);

        store
            .insert("a1", "n", "t", "assets/asset_a1.mp4", "covers/cover_x.jpg")
            .unwrap();
        let err = store
            .update_name_and_tags("a1", "n", "t", Some("./covers/cover_y.jpg"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[test]
    fn test_list_orders_newest_first_numerically() {
        let store = AssetStore::open_in_memory().unwrap();
        // "999999999" sorts after "1000000000" as text; numeric order must win
        store
            .insert_at("old", "Old", "t", "assets/old", "covers/old.jpg", 999_999_999)
            .unwrap();
        store
            .insert_at("new", "New", "t", "assets/new", "covers/new.jpg", 1_000_000_500)
            .unwrap();
        store
            .insert_at("mid", "Mid", "t", "assets/mid", "covers/mid.jpg", 1_000_000_000)
            .unwrap();

        let ids: Vec<String> = store
            .list(Path::new(ROOT))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_list_ties_are_stable() {
        let store = AssetStore::open_in_memory().unwrap();
        for id in ["a", "b", "c"] {
            store
                .insert_at(id, id, "t", "assets/x", "covers/x.jpg", 42)
                .unwrap();
        }

        let first: Vec<String> = store
            .list(Path::new(ROOT))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let second: Vec<String> = store
            .list(Path::new(ROOT))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(first, vec!["c", "b", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_name_and_tags() {
        let mut store = store_with_trailer();
        store
            .update_name_and_tags("a1", "Trailer v2", "video,2026,final", None)
            .unwrap();

        let r = store.get(Path::new(ROOT), "a1").unwrap().unwrap();
        assert_eq!(r.name, "Trailer v2");
        assert_eq!(r.tags, "video,2026,final");
        assert_eq!(r.cover_rel_path, "covers/cover_x.jpg");
    }

    #[test]
    fn test_update_with_cover() {
        let mut store = store_with_trailer();
        store
            .update_name_and_tags("a1", "Trailer", "video", Some("covers/cover_y.png"))
            .unwrap();

        let r = store.get(Path::new(ROOT), "a1").unwrap().unwrap();
        assert_eq!(r.cover_rel_path, "covers/cover_y.png");
        assert_eq!(r.tags, "video");
    }

    #[test]
    fn test_update_trims_values() {
        let mut store = store_with_trailer();
        store
            .update_name_and_tags("a1", "  Trailer v2 ", "\tvideo ", None)
            .unwrap();

        let r = store.get(Path::new(ROOT), "a1").unwrap().unwrap();
        assert_eq!(r.name, "Trailer v2");
        assert_eq!(r.tags, "video");
    }

    #[test]
    fn test_update_missing_id() {
        let mut store = store_with_trailer();
        let err = store
            .update_name_and_tags("nope", "Name", "tags", Some("covers/c.jpg"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { ref id } if id == "nope"));
    }

    #[test]
    fn test_update_rejects_blank_values() {
        let mut store = store_with_trailer();
        let before = store.get(Path::new(ROOT), "a1").unwrap();

        for (name, tags) in [("", "video"), ("   ", "video"), ("Name", ""), ("Name", " \n ")] {
            let err = store
                .update_name_and_tags("a1", name, tags, None)
                .unwrap_err();
            assert!(matches!(err, CatalogError::InvalidArgument(_)));
        }

        assert_eq!(store.get(Path::new(ROOT), "a1").unwrap(), before);
    }

    #[test]
    fn test_update_is_atomic_when_cover_write_fails() {
        let mut store = store_with_trailer();
        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER refuse_cover BEFORE UPDATE OF cover_rel_path ON assets
                 BEGIN SELECT RAISE(ABORT, 'cover write refused'); END;",
            )
            .unwrap();
        let before = store.get(Path::new(ROOT), "a1").unwrap();

        let err = store
            .update_name_and_tags("a1", "Changed", "changed", Some("covers/new.jpg"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Database(_)));
        assert_eq!(store.get(Path::new(ROOT), "a1").unwrap(), before);
    }

    #[test]
    fn test_delete_returns_paths() {
        let store = store_with_trailer();
        let deleted = store.delete("a1").unwrap();

        assert_eq!(deleted.asset_rel_path.as_deref(), Some("assets/asset_a1.mp4"));
        assert_eq!(deleted.cover_rel_path.as_deref(), Some("covers/cover_x.jpg"));
        assert!(store.list(Path::new(ROOT)).unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_exactly_once() {
        let store = store_with_trailer();
        store.delete("a1").unwrap();

        let err = store.delete("a1").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let store = store_with_trailer();
        assert!(store.get(Path::new(ROOT), "a").unwrap().is_none());
        assert!(matches!(
            store.delete("A1").unwrap_err(),
            CatalogError::NotFound { .. }
        ));
    }

    #[test]
    fn test_referenced_paths() {
        let store = store_with_trailer();
        let paths = store.referenced_paths().unwrap();
        assert!(paths.contains("assets/asset_a1.mp4"));
        assert!(paths.contains("covers/cover_x.jpg"));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_reopen_keeps_data_and_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("asr-db").join("assetroom.sqlite");

        {
            let store = AssetStore::open(&path).unwrap();
            store
                .insert("a1", "Trailer", "video", "assets/a", "covers/c.jpg")
                .unwrap();
            store.close().unwrap();
        }

        let store = AssetStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.count().unwrap(), 1);

        let tables: i64 = store
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='assets'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }
}
