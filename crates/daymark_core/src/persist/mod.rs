//! Durable blob storage boundary.
//!
//! # Responsibility
//! - Define the adapter contract the annotation store persists through.
//! - Provide in-memory, JSON file and SQLite implementations.
//!
//! # Invariants
//! - `load_blob` returns `Ok(None)` when nothing has been stored yet.
//! - `save_blob` returns only after the blob has been handed to the backend.
//! - Adapters treat the blob as opaque text.

mod file;
mod memory;
pub mod schema;
mod sqlite;

pub use file::JsonFileAdapter;
pub use memory::MemoryAdapter;
pub use schema::SchemaError;
pub use sqlite::{SqliteBlobAdapter, DEFAULT_STORAGE_KEY};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Backend failure while reading or writing the blob.
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
    Schema(SchemaError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "blob io failed: {err}"),
            Self::Sqlite(err) => write!(f, "blob query failed: {err}"),
            Self::Schema(err) => write!(f, "blob database unavailable: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::Schema(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<SchemaError> for PersistError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

/// Durable key-value blob storage used by `AnnotationStore`.
pub trait PersistenceAdapter {
    /// Reads the stored blob, or `None` when nothing was saved yet.
    fn load_blob(&self) -> PersistResult<Option<String>>;
    /// Replaces the stored blob.
    fn save_blob(&mut self, blob: &str) -> PersistResult<()>;
}

impl<A: PersistenceAdapter + ?Sized> PersistenceAdapter for Box<A> {
    fn load_blob(&self) -> PersistResult<Option<String>> {
        (**self).load_blob()
    }

    fn save_blob(&mut self, blob: &str) -> PersistResult<()> {
        (**self).save_blob(blob)
    }
}
