//! Storage layer
//!
//! Handles the on-disk layout of a catalog root and the SQLite asset store
//! that lives inside it.
//!
//! ## Architecture
//!
//! - **Layout**: directory structure, file copies and cleanup
//! - **Store**: the `assets` table, the catalog's source of truth
//!
//! Neither module knows about the other's failure handling; the catalog
//! service sequences them.

pub mod layout;
pub mod schema;
pub mod store;

pub use layout::{remove_if_exists, CatalogLayout};
pub use schema::{init_schema, needs_init};
pub use store::{validate_name_and_tags, AssetStore};
