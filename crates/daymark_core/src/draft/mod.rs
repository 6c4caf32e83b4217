//! Edit session for one day's annotation.
//!
//! # Responsibility
//! - Hold in-progress note/link/photo edits before they are saved.
//! - Check link and photo URL syntax, and convert uploaded image bytes into
//!   embedded data URIs under a size cap.
//! - Produce the full replacement record handed to `AnnotationStore::set`.
//!
//! # Invariants
//! - Links and photos keep insertion order.
//! - Uploads larger than `MAX_UPLOAD_BYTES` are rejected before encoding.
//! - URL checks are syntactic only; reachability is never probed.

use crate::model::annotation::Annotation;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest accepted image upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):(?P<rest>\S+)$").expect("valid url regex")
});
static HIERARCHICAL_REST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//[^/?#\s]+").expect("valid authority regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Input is not an absolute URL.
    InvalidUrl(String),
    /// No link/photo exists at the index.
    IndexOutOfRange { index: usize, len: usize },
    /// Upload exceeds `MAX_UPLOAD_BYTES`.
    UploadTooLarge { size: usize, limit: usize },
    /// Upload MIME type is not `image/*`.
    UnsupportedMediaType(String),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl(value) => write!(f, "not a valid URL: `{value}`"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for {len} item(s)")
            }
            Self::UploadTooLarge { size, limit } => {
                write!(f, "image is {size} bytes; uploads must be at most {limit} bytes")
            }
            Self::UnsupportedMediaType(mime) => write!(f, "`{mime}` is not an image type"),
        }
    }
}

impl Error for DraftError {}

/// In-progress edit of one day's annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationDraft {
    note: String,
    links: Vec<String>,
    photos: Vec<String>,
}

impl AnnotationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a draft from the stored record, or empty when there is none.
    pub fn from_annotation(existing: Option<&Annotation>) -> Self {
        existing.map_or_else(Self::default, |annotation| Self {
            note: annotation.note.clone().unwrap_or_default(),
            links: annotation.links.clone(),
            photos: annotation.photos.clone(),
        })
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn add_link(&mut self, url: &str) -> Result<(), DraftError> {
        self.links.push(checked_url(url)?);
        Ok(())
    }

    pub fn remove_link(&mut self, index: usize) -> Result<String, DraftError> {
        remove_at(&mut self.links, index)
    }

    /// Adds a remote image by URL.
    pub fn add_photo_url(&mut self, url: &str) -> Result<(), DraftError> {
        self.photos.push(checked_url(url)?);
        Ok(())
    }

    /// Embeds uploaded image bytes as a base64 data URI.
    pub fn add_photo_upload(&mut self, bytes: &[u8], mime: &str) -> Result<(), DraftError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") || mime.len() == "image/".len() {
            return Err(DraftError::UnsupportedMediaType(mime));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(DraftError::UploadTooLarge {
                size: bytes.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        self.photos
            .push(format!("data:{mime};base64,{}", STANDARD.encode(bytes)));
        Ok(())
    }

    pub fn remove_photo(&mut self, index: usize) -> Result<String, DraftError> {
        remove_at(&mut self.photos, index)
    }

    /// Full replacement record. A blank note is stored as no note.
    pub fn build(&self) -> Annotation {
        Annotation {
            note: (!self.note.trim().is_empty()).then(|| self.note.clone()),
            links: self.links.clone(),
            photos: self.photos.clone(),
        }
    }
}

fn checked_url(raw: &str) -> Result<String, DraftError> {
    let trimmed = raw.trim();
    let caps = URL_RE
        .captures(trimmed)
        .ok_or_else(|| DraftError::InvalidUrl(trimmed.to_string()))?;

    let rest = &caps["rest"];
    let valid = match caps["scheme"].to_ascii_lowercase().as_str() {
        "http" | "https" | "ftp" | "ws" | "wss" => HIERARCHICAL_REST_RE.is_match(rest),
        "file" => rest.starts_with("//"),
        _ => true,
    };
    if !valid {
        return Err(DraftError::InvalidUrl(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

fn remove_at(items: &mut Vec<String>, index: usize) -> Result<String, DraftError> {
    if index >= items.len() {
        return Err(DraftError::IndexOutOfRange {
            index,
            len: items.len(),
        });
    }
    Ok(items.remove(index))
}
