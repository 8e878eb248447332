//! Shared handle to the current classifier

use super::model::Classifier;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds at most one classifier. Replacement is a single pointer swap, so a
/// reader sees either the old model or the new one, never a partial write.
#[derive(Clone, Default)]
pub struct ClassifierSlot {
    inner: Arc<RwLock<Option<Arc<Classifier>>>>,
}

impl ClassifierSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<Classifier>> {
        self.inner.read().clone()
    }

    pub fn is_present(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Install a new classifier, returning the one it replaced
    pub fn replace(&self, classifier: Arc<Classifier>) -> Option<Arc<Classifier>> {
        self.inner.write().replace(classifier)
    }
}
