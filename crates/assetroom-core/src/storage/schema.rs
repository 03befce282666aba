//! SQLite schema for the asset store
//!
//! The table layout is shared with existing catalogs, so it is created
//! verbatim and never altered. `created_at` keeps its `TEXT` affinity;
//! values are written as decimal seconds and compared numerically.

use rusqlite::{Connection, Result};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            tags TEXT NOT NULL,
            asset_rel_path TEXT NOT NULL,
            cover_rel_path TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
}

/// Check if the assets table is missing
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='assets'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    !table_exists
}
