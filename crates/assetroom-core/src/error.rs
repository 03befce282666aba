//! Catalog error handling
//!
//! Every fallible catalog operation returns a [`CatalogError`]. I/O failures
//! are classified by kind so callers can show a useful message and decide
//! whether a retry makes sense.

use std::io;
use std::path::PathBuf;

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

/// Errors that can occur during catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The chosen root directory does not exist
    #[error("Catalog root '{path}' does not exist")]
    RootNotFound { path: PathBuf },

    /// Caller passed a value the catalog refuses to store
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No asset row matches the given id
    #[error("Asset not found: '{id}'")]
    NotFound { id: String },

    /// An asset with this id already exists
    #[error("Asset '{id}' already exists")]
    ConstraintViolation { id: String },

    /// No catalog is currently open
    #[error("No catalog is open. Open a root folder first.")]
    NotOpen,

    /// The open catalog belongs to a different root
    #[error("Catalog open at '{open}' but '{requested}' was requested")]
    RootMismatch { open: PathBuf, requested: PathBuf },

    /// Failed to create a layout directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file the operation needs is missing
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Any other filesystem failure
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl CatalogError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::PermissionDenied => CatalogError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => CatalogError::FileNotFound { path },
            _ if is_disk_full_error(&error) => CatalogError::DiskFull {
                path,
                source: error,
            },
            _ => CatalogError::Io {
                path,
                source: error,
            },
        }
    }

    /// Map a SQLite error raised while inserting `id`
    ///
    /// Primary key collisions become [`CatalogError::ConstraintViolation`];
    /// other constraint failures (triggers, NOT NULL) stay database errors.
    pub(crate) fn from_insert(error: rusqlite::Error, id: &str) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == ErrorCode::ConstraintViolation
                    && matches!(
                        e.extended_code,
                        ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                    ) =>
            {
                CatalogError::ConstraintViolation { id: id.to_string() }
            }
            _ => CatalogError::Database(error),
        }
    }

    /// True for underlying database or filesystem failures
    pub fn is_storage_io(&self) -> bool {
        matches!(
            self,
            CatalogError::CreateDirectory { .. }
                | CatalogError::PermissionDenied { .. }
                | CatalogError::DiskFull { .. }
                | CatalogError::FileNotFound { .. }
                | CatalogError::Io { .. }
                | CatalogError::Database(_)
        )
    }

    /// Check if this error is recoverable by the user
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::DiskFull { .. }
                | CatalogError::PermissionDenied { .. }
                | CatalogError::RootNotFound { .. }
                | CatalogError::InvalidArgument(_)
                | CatalogError::NotOpen
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            CatalogError::RootNotFound { .. } => {
                Some("Pick an existing folder as the catalog root.")
            }
            CatalogError::InvalidArgument(_) => Some("Name and tags must not be empty."),
            CatalogError::NotOpen => Some("Open a catalog root before running this command."),
            CatalogError::DiskFull { .. } => Some("Free up disk space and try again."),
            CatalogError::PermissionDenied { .. } => {
                Some("Check file and directory permissions on the catalog root.")
            }
            CatalogError::CreateDirectory { .. } => Some("Check that the root folder is writable."),
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
