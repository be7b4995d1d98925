//! Turning a document's text into the flat item list a pass works on.

use log::error;

use crate::cache::{CodeModelCache, DEFAULT_WAIT};
use crate::error::ModelError;
use crate::formats::Format;
use crate::input;
use crate::item::StructuralItem;
use crate::regions;

/// Anything that can list the members declared in a text.
pub trait ItemSource {
    /// Members of `text`, with spans and modifiers; region markers are not included.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be modeled.
    fn items(&self, text: &str) -> Result<Vec<StructuralItem>, ModelError>;
}

impl<F: Format> ItemSource for F {
    fn items(&self, text: &str) -> Result<Vec<StructuralItem>, ModelError> {
        input::extract_items(text, self)
    }
}

#[derive(Clone, Copy)]
/// Combines parser output with the document's region markers.
pub struct ItemRetriever<'a> {
    source: &'a dyn ItemSource,
}

impl<'a> ItemRetriever<'a> {
    #[must_use]
    /// A retriever reading members from `source`.
    pub fn new(source: &'a dyn ItemSource) -> Self {
        Self { source }
    }

    #[must_use]
    /// Members and regions of `text`.
    ///
    /// Regions wrapping exactly one member under its name are attached to that member; the
    /// others become region items. A document the parser cannot model yields no items.
    pub fn retrieve(&self, text: &str) -> Vec<StructuralItem> {
        let mut items = match self.source.items(text) {
            Ok(items) => items,
            Err(err) => {
                error!("Unable to build code model: {err}");
                return Vec::new();
            }
        };
        regions::attach(&mut items, regions::scan(text));
        items
    }

    #[must_use]
    /// Like [`ItemRetriever::retrieve`], served from `cache` while the model for `document` is
    /// fresh. A stale model is rebuilt here unless another caller is already rebuilding it, in
    /// which case this waits for that build.
    pub fn retrieve_cached(
        &self,
        cache: &CodeModelCache,
        document: &str,
        text: &str,
    ) -> Vec<StructuralItem> {
        let model = cache.get_code_model(document);
        if model.is_stale() && model.begin_build() {
            model.complete_build(self.retrieve(text));
        }
        model.wait_for_items(DEFAULT_WAIT)
    }
}

#[cfg(test)]
#[path = "tests/retrieve.rs"]
mod tests;
