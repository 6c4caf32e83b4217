use super::{PersistResult, PersistenceAdapter};
use std::cell::RefCell;
use std::rc::Rc;

/// In-process blob slot.
///
/// Clones share one slot, so a clone kept by the caller observes every blob
/// the store saves and can seed a fresh store to simulate a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter that already holds `blob`.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(blob.into()))),
        }
    }

    /// Last saved blob.
    pub fn blob(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load_blob(&self) -> PersistResult<Option<String>> {
        Ok(self.blob())
    }

    fn save_blob(&mut self, blob: &str) -> PersistResult<()> {
        *self.slot.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}
