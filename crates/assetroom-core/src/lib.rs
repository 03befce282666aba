//! AssetRoom Core Library
//!
//! This crate provides the catalog layer for AssetRoom, a folder-backed
//! asset catalog. A user picks a root folder; imported files and their
//! cover images live in subfolders of that root, and their metadata lives
//! in an embedded SQLite store next to them.
//!
//! # Quick Start
//!
//! ```text
//! let mut session = CatalogSession::new();
//! session.open_catalog(root)?;
//!
//! let record = session.add_asset(&file, &cover, "Trailer", "video,2026")?;
//! let assets = session.list_assets()?;
//! ```
//!
//! # Modules
//!
//! - `catalog`: Catalog service and session (main entry point)
//! - `storage`: Directory layout and SQLite asset store
//! - `models`: Asset records and value types
//! - `error`: Error taxonomy

pub mod catalog;
pub mod error;
pub mod models;
pub mod storage;

pub use catalog::{Catalog, CatalogSession};
pub use error::{CatalogError, CatalogResult};
pub use models::{AssetRecord, CopiedAsset, CoverExt, DeletedAsset, ImportedCover, SweepReport};
pub use storage::{AssetStore, CatalogLayout};
