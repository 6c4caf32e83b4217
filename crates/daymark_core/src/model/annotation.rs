//! Day annotation record.
//!
//! # Responsibility
//! - Define the note/links/photos record attached to one calendar day.
//! - Provide the single "has data" predicate used for day indicators.
//! - Provide field-level patches for partial updates.
//!
//! # Invariants
//! - Photo entries are opaque strings; core never decodes or validates them.
//! - An empty record is still a valid stored value until explicitly cleared.

use serde::{Deserialize, Serialize};

const DATA_URI_PREFIX: &str = "data:";
const NOTE_PREVIEW_MAX_CHARS: usize = 48;

/// Content attached to one calendar day.
///
/// Serialized with the same field names as the persisted day payload:
/// optional `note`, and `links`/`photos` arrays that are omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Free-form day note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// URLs in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    /// Image references in insertion order: remote URLs or embedded data URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}

impl Annotation {
    /// Creates an annotation holding only a note.
    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }

    /// Returns whether this record should light the day's indicator.
    ///
    /// True when the note is non-empty or any link or photo exists.
    pub fn has_content(&self) -> bool {
        self.note.as_deref().is_some_and(|note| !note.is_empty())
            || !self.links.is_empty()
            || !self.photos.is_empty()
    }

    /// Applies a field-level patch in place.
    pub fn apply(&mut self, patch: AnnotationPatch) {
        if let Some(note) = patch.note {
            self.note = note;
        }
        if let Some(links) = patch.links {
            self.links = links;
        }
        if let Some(photos) = patch.photos {
            self.photos = photos;
        }
    }

    /// Derives the compact projection shown inside a grid cell.
    pub fn summary(&self) -> DaySummary {
        DaySummary {
            note_preview: self.note.as_deref().and_then(note_preview),
            link_count: self.links.len(),
            photo_count: self.photos.len(),
            has_content: self.has_content(),
        }
    }

    /// Iterates photos with their storage kind.
    pub fn photo_refs(&self) -> impl Iterator<Item = (PhotoKind, &str)> {
        self.photos
            .iter()
            .map(|photo| (PhotoKind::of(photo), photo.as_str()))
    }
}

/// Field-level update for an existing annotation.
///
/// `None` keeps the stored field; `Some(value)` replaces that field only.
/// `note: Some(None)` removes the note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationPatch {
    pub note: Option<Option<String>>,
    pub links: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
}

impl AnnotationPatch {
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(Some(note.into())),
            ..Self::default()
        }
    }

    pub fn links(links: Vec<String>) -> Self {
        Self {
            links: Some(links),
            ..Self::default()
        }
    }

    pub fn photos(photos: Vec<String>) -> Self {
        Self {
            photos: Some(photos),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.links.is_none() && self.photos.is_none()
    }
}

/// How a photo entry is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    /// Self-contained `data:` URI carrying the image bytes.
    Embedded,
    /// Reference to a remote image.
    Remote,
}

impl PhotoKind {
    pub fn of(photo: &str) -> Self {
        if photo.starts_with(DATA_URI_PREFIX) {
            Self::Embedded
        } else {
            Self::Remote
        }
    }
}

/// Compact per-day projection for grid cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    /// First note line, truncated with `...` when long.
    pub note_preview: Option<String>,
    pub link_count: usize,
    pub photo_count: usize,
    pub has_content: bool,
}

fn note_preview(note: &str) -> Option<String> {
    let first_line = note.lines().map(str::trim).find(|line| !line.is_empty())?;
    let mut preview = first_line
        .chars()
        .take(NOTE_PREVIEW_MAX_CHARS)
        .collect::<String>();
    if first_line.chars().count() > NOTE_PREVIEW_MAX_CHARS {
        preview.push_str("...");
    }
    Some(preview)
}
