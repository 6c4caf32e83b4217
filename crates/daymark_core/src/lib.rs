//! Core domain logic for Daymark.
//! Month grid generation and the day-keyed annotation store.

pub mod config;
pub mod draft;
pub mod grid;
pub mod logging;
pub mod model;
pub mod persist;
pub mod store;

pub use config::{ConfigError, CoreConfig, StorageBackend};
pub use draft::{AnnotationDraft, DraftError, MAX_UPLOAD_BYTES};
pub use grid::{generate, CalendarGrid, MonthCursor, GRID_SLOTS};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::annotation::{Annotation, AnnotationPatch, DaySummary, PhotoKind};
pub use model::date::{CalendarDate, DateKey, DateKeyError, InvalidDateError};
pub use persist::{
    JsonFileAdapter, MemoryAdapter, PersistError, PersistenceAdapter, SchemaError,
    SqliteBlobAdapter,
};
pub use store::codec::CorruptStateError;
pub use store::{AnnotationStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
