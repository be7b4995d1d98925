//! Per-document cache of retrieved items.
//!
//! Parsing a large file is the slowest step of a pass, so an editor host may parse in the
//! background and keep the result until the document changes. Each document maps to one shared
//! [`CodeModel`]; a model is stale until someone builds it and again after [`stale_code_model`]
//! is called for its document. Readers that arrive while a build is running wait for it, but only
//! for a bounded time.
//!
//! [`stale_code_model`]: CodeModelCache::stale_code_model

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, warn};

use crate::item::StructuralItem;

/// How long a reader waits for a running build by default.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
struct ModelState {
    items: Vec<StructuralItem>,
    is_building: bool,
    is_stale: bool,
}

#[derive(Debug)]
/// Items of one document plus the flags saying whether they can be trusted.
pub struct CodeModel {
    document: String,
    state: Mutex<ModelState>,
    built: Condvar,
}

impl CodeModel {
    #[must_use]
    /// A stale, empty model for `document`.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            state: Mutex::new(ModelState {
                is_stale: true,
                ..ModelState::default()
            }),
            built: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    /// Document identity the model belongs to.
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    /// Whether the items no longer reflect the document.
    pub fn is_stale(&self) -> bool {
        self.lock().is_stale
    }

    #[must_use]
    /// Whether a build is running.
    pub fn is_building(&self) -> bool {
        self.lock().is_building
    }

    /// Claims the build; returns `false` if another build is already running.
    pub fn begin_build(&self) -> bool {
        let mut state = self.lock();
        if state.is_building {
            return false;
        }
        state.is_building = true;
        debug!(document = self.document.as_str(); "Building code model");
        true
    }

    /// Stores freshly built items and wakes every waiting reader.
    pub fn complete_build(&self, items: Vec<StructuralItem>) {
        let mut state = self.lock();
        state.items = items;
        state.is_building = false;
        state.is_stale = false;
        debug!(document = self.document.as_str(), items = state.items.len(); "Built code model");
        self.built.notify_all();
    }

    /// Flags the items as out of date.
    pub fn mark_stale(&self) {
        self.lock().is_stale = true;
    }

    #[must_use]
    /// The items once no build is running, or nothing if the build outlasts `timeout`.
    pub fn wait_for_items(&self, timeout: Duration) -> Vec<StructuralItem> {
        let state = self.lock();
        let (state, wait) = self
            .built
            .wait_timeout_while(state, timeout, |state| state.is_building)
            .unwrap_or_else(PoisonError::into_inner);
        if wait.timed_out() {
            warn!(
                document = self.document.as_str();
                "Timed out after {}ms waiting for the code model", timeout.as_millis()
            );
            return Vec::new();
        }
        state.items.clone()
    }
}

#[derive(Debug, Default)]
/// Code models keyed by document identity.
pub struct CodeModelCache {
    models: Mutex<HashMap<String, Arc<CodeModel>>>,
}

impl CodeModelCache {
    #[must_use]
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<CodeModel>>> {
        self.models.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    /// The model for `document`, inserting a stale one if there is none.
    pub fn get_code_model(&self, document: &str) -> Arc<CodeModel> {
        let mut models = self.lock();
        if let Some(model) = models.get(document) {
            debug!(document, stale = model.is_stale(); "Retrieved code model from cache");
            return Arc::clone(model);
        }
        let model = Arc::new(CodeModel::new(document));
        models.insert(document.to_string(), Arc::clone(&model));
        debug!(document; "Added stale code model to cache");
        model
    }

    /// Drops the model for `document`, if any.
    pub fn remove_code_model(&self, document: &str) {
        if self.lock().remove(document).is_some() {
            debug!(document; "Removed code model from cache");
        }
    }

    /// Flags the model for `document` as stale, if there is one.
    pub fn stale_code_model(&self, document: &str) {
        if let Some(model) = self.lock().get(document) {
            model.mark_stale();
            debug!(document; "Marked code model stale");
        }
    }

    #[must_use]
    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    /// Whether no document is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "tests/cache.rs"]
mod tests;
