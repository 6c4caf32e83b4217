//! Single-file JSON blob adapter.
//!
//! # Invariants
//! - A missing file reads as "nothing stored", not as an error.
//! - Writes land in a sibling temp file first and are renamed into place, so
//!   readers never observe a half-written blob. A failed rename removes the
//!   temp file again.

use super::{PersistResult, PersistenceAdapter};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone)]
pub struct JsonFileAdapter {
    path: PathBuf,
}

impl JsonFileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }
}

impl PersistenceAdapter for JsonFileAdapter {
    fn load_blob(&self) -> PersistResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save_blob(&mut self, blob: &str) -> PersistResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, blob)?;
        if let Err(err) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(err.into());
        }

        debug!(
            "event=blob_save module=persist backend=file status=ok bytes={}",
            blob.len()
        );
        Ok(())
    }
}
