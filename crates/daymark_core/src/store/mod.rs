//! Day-keyed annotation store.
//!
//! # Responsibility
//! - Own the in-memory mapping from `DateKey` to `Annotation`.
//! - Derive keys from `CalendarDate` so every code path collides on one key.
//! - Persist the full mapping through a `PersistenceAdapter` after every
//!   mutation.
//!
//! # Invariants
//! - `set` replaces the whole record; `merge` touches only patched fields.
//! - `clear` removes the entry; clearing a missing day writes nothing.
//! - A failed write leaves the in-memory mutation in place and reports
//!   `StoreError::PersistenceWrite`; `flush` retries.
//! - Log events carry keys and counts only, never annotation content.

pub mod codec;

use crate::grid::{CalendarGrid, GRID_SLOTS};
use crate::model::annotation::{Annotation, AnnotationPatch, DaySummary};
use crate::model::date::{CalendarDate, DateKey};
use crate::persist::{PersistError, PersistenceAdapter};
use codec::{AnnotationMap, CorruptStateError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Annotation store failure.
#[derive(Debug)]
pub enum StoreError {
    /// Persisted blob could not be decoded.
    CorruptState(CorruptStateError),
    /// Adapter failed to read the blob.
    PersistenceRead(PersistError),
    /// Adapter failed to write the blob; memory already holds the change.
    PersistenceWrite(PersistError),
    /// Mapping could not be encoded.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptState(err) => write!(f, "{err}"),
            Self::PersistenceRead(err) => write!(f, "failed to read annotations: {err}"),
            Self::PersistenceWrite(err) => write!(f, "failed to persist annotations: {err}"),
            Self::Encode(err) => write!(f, "failed to encode annotations: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptState(err) => Some(err),
            Self::PersistenceRead(err) => Some(err),
            Self::PersistenceWrite(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<CorruptStateError> for StoreError {
    fn from(value: CorruptStateError) -> Self {
        Self::CorruptState(value)
    }
}

/// Session-owned annotation mapping with write-through persistence.
pub struct AnnotationStore<A: PersistenceAdapter> {
    adapter: A,
    entries: AnnotationMap,
}

impl<A: PersistenceAdapter> AnnotationStore<A> {
    /// Loads the persisted mapping once.
    ///
    /// # Errors
    /// - `CorruptState` when a blob exists but is not a day mapping.
    /// - `PersistenceRead` when the adapter cannot read.
    pub fn load(adapter: A) -> StoreResult<Self> {
        let entries = read_entries(&adapter)?;
        info!(
            "event=store_load module=store status=ok entries={}",
            entries.len()
        );
        Ok(Self { adapter, entries })
    }

    /// Loads the persisted mapping, starting empty when the blob is corrupt.
    ///
    /// The corrupt blob stays untouched until the first mutation overwrites
    /// it. Read failures still propagate.
    pub fn load_or_empty(adapter: A) -> StoreResult<Self> {
        let entries = match read_entries(&adapter) {
            Ok(entries) => entries,
            Err(StoreError::CorruptState(err)) => {
                warn!(
                    "event=store_load module=store status=recovered policy=start_empty reason={}",
                    err.reason()
                );
                AnnotationMap::new()
            }
            Err(err) => return Err(err),
        };
        Ok(Self { adapter, entries })
    }

    /// Returns the record stored for `date`.
    pub fn get(&self, date: &CalendarDate) -> Option<&Annotation> {
        self.entries.get(&date.key())
    }

    /// Returns the record stored under an already-derived key.
    pub fn get_by_key(&self, key: &DateKey) -> Option<&Annotation> {
        self.entries.get(key)
    }

    /// Replaces the record for `date` and persists the mapping.
    pub fn set(&mut self, date: CalendarDate, annotation: Annotation) -> StoreResult<()> {
        let key = date.key();
        self.entries.insert(key.clone(), annotation);
        self.persist("set", &key)
    }

    /// Applies a field-level patch to the record for `date` (starting from an
    /// empty record when none exists) and persists the mapping.
    ///
    /// Returns the merged record.
    pub fn merge(
        &mut self,
        date: CalendarDate,
        patch: AnnotationPatch,
    ) -> StoreResult<&Annotation> {
        let key = date.key();
        self.entries.entry(key.clone()).or_default().apply(patch);
        self.persist("merge", &key)?;
        Ok(&self.entries[&key])
    }

    /// Removes the record for `date`.
    ///
    /// Returns `false` without writing when no record existed.
    pub fn clear(&mut self, date: &CalendarDate) -> StoreResult<bool> {
        let key = date.key();
        if self.entries.remove(&key).is_none() {
            return Ok(false);
        }
        self.persist("clear", &key)?;
        Ok(true)
    }

    /// Re-persists the current mapping, e.g. after a failed write.
    pub fn flush(&mut self) -> StoreResult<()> {
        let blob = codec::encode(&self.entries).map_err(StoreError::Encode)?;
        self.adapter
            .save_blob(&blob)
            .map_err(StoreError::PersistenceWrite)
    }

    /// Whether `date` should show the "has data" indicator.
    pub fn has_content(&self, date: &CalendarDate) -> bool {
        self.get(date).is_some_and(Annotation::has_content)
    }

    /// Indicator per grid slot; blank slots are `false`.
    pub fn indicators(&self, grid: &CalendarGrid) -> [bool; GRID_SLOTS] {
        let slots = grid.slots();
        std::array::from_fn(|index| slots[index].is_some_and(|date| self.has_content(&date)))
    }

    /// Cell projection for `date`.
    pub fn summary(&self, date: &CalendarDate) -> Option<DaySummary> {
        self.get(date).map(Annotation::summary)
    }

    /// Stored records in chronological key order.
    pub fn entries(&self) -> impl Iterator<Item = (&DateKey, &Annotation)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    fn persist(&mut self, op: &'static str, key: &DateKey) -> StoreResult<()> {
        match self.flush() {
            Ok(()) => {
                info!(
                    "event=store_{op} module=store status=ok key={key} entries={}",
                    self.entries.len()
                );
                Ok(())
            }
            Err(err) => {
                error!("event=store_{op} module=store status=error key={key} error={err}");
                Err(err)
            }
        }
    }
}

fn read_entries<A: PersistenceAdapter>(adapter: &A) -> StoreResult<AnnotationMap> {
    match adapter.load_blob().map_err(StoreError::PersistenceRead)? {
        Some(blob) => Ok(codec::decode(&blob)?),
        None => Ok(AnnotationMap::new()),
    }
}
