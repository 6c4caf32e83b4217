//! Blob encoding for the annotation mapping.
//!
//! # Responsibility
//! - Encode the full mapping as one JSON object keyed by `DateKey`.
//! - Decode persisted blobs, rejecting anything that is not that shape.
//!
//! # Invariants
//! - Encoded key order is chronological, so equal mappings encode equally.
//! - Every decoded key is a canonical `DateKey`.
//! - Only the empty string decodes to an empty mapping; a key that appears
//!   twice makes the blob corrupt.

use crate::model::annotation::Annotation;
use crate::model::date::DateKey;
use serde::de::{Deserialize, Deserializer, Error as _, MapAccess, Visitor};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AnnotationMap = BTreeMap<DateKey, Annotation>;

/// Persisted blob exists but is not a valid day mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptStateError {
    reason: String,
}

impl CorruptStateError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for CorruptStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "corrupt annotation state: {}", self.reason)
    }
}

impl Error for CorruptStateError {}

/// Encodes the mapping as a JSON object.
pub fn encode(entries: &AnnotationMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}

/// Decodes a persisted blob into a mapping.
pub fn decode(blob: &str) -> Result<AnnotationMap, CorruptStateError> {
    if blob.is_empty() {
        return Ok(AnnotationMap::new());
    }

    let RawEntries(raw) = serde_json::from_str(blob)
        .map_err(|err| CorruptStateError::new(format!("blob is not a day mapping: {err}")))?;

    raw.into_iter()
        .map(|(key, annotation)| {
            DateKey::parse(&key)
                .map(|key| (key, annotation))
                .map_err(|err| CorruptStateError::new(err.to_string()))
        })
        .collect()
}

/// Blob entries in document order, refusing repeated keys.
struct RawEntries(Vec<(String, Annotation)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawEntriesVisitor)
    }
}

struct RawEntriesVisitor;

impl<'de> Visitor<'de> for RawEntriesVisitor {
    type Value = RawEntries;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("an object keyed by date")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<RawEntries, M::Error> {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, annotation)) = map.next_entry::<String, Annotation>()? {
            if !seen.insert(key.clone()) {
                return Err(M::Error::custom(format!("duplicate key `{key}`")));
            }
            entries.push((key, annotation));
        }
        Ok(RawEntries(entries))
    }
}
