//! One complete clean-up pass over a document.
//!
//! The pass runs inside a single undo scope:
//!
//! 1. retrieve items and strip every existing region;
//! 2. nest the items and move members into canonical order;
//! 3. retrieve again, since every offset has moved, and nest again;
//! 4. write the required regions and pad them with blank lines.
//!
//! Any failing edit rolls the whole pass back, so a document is either fully cleaned or
//! untouched.

use log::info;
use serde::{Deserialize, Serialize};

use crate::blank_lines::BlankLineService;
use crate::buffer::TextBuffer;
use crate::cache::CodeModelCache;
use crate::error::CleanUpError;
use crate::item::Kind;
use crate::order::OrderPolicy;
use crate::region_service::RegionService;
use crate::reorganize::{default_order_critical_attributes, Reorganizer};
use crate::retrieve::{ItemRetriever, ItemSource};
use crate::tree::TreeBuilder;
use crate::undo::UndoTransaction;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Switches for the parts of a pass beyond reordering.
pub struct CleanUpOptions {
    /// Write regions after reordering.
    pub add_regions: bool,
    /// Attributes that pin the member order of the type carrying them.
    pub order_critical_attributes: Vec<String>,
}

impl Default for CleanUpOptions {
    fn default() -> Self {
        Self {
            add_regions: true,
            order_critical_attributes: default_order_critical_attributes(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// What a pass did.
pub struct CleanUpReport {
    /// Members moved.
    pub moves: usize,
    /// Regions stripped before reordering.
    pub regions_removed: usize,
    /// Regions written after reordering.
    pub regions_added: usize,
}

/// Runs clean-up passes over documents.
pub struct CleanUpManager<'a> {
    retriever: ItemRetriever<'a>,
    policy: OrderPolicy,
    options: CleanUpOptions,
    cache: Option<&'a CodeModelCache>,
}

impl<'a> CleanUpManager<'a> {
    #[must_use]
    /// A manager reading members from `source`.
    pub fn new(source: &'a dyn ItemSource, policy: OrderPolicy, options: CleanUpOptions) -> Self {
        Self {
            retriever: ItemRetriever::new(source),
            policy,
            options,
            cache: None,
        }
    }

    #[must_use]
    /// Serves the first retrieval of each pass from `cache`.
    pub fn with_cache(mut self, cache: &'a CodeModelCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Cleans up `buffer`, known to the cache as `document`.
    ///
    /// # Errors
    ///
    /// Returns the failing edit's error after every change of the pass has been undone.
    pub fn execute<B: TextBuffer + ?Sized>(
        &self,
        document: &str,
        buffer: &mut B,
    ) -> Result<CleanUpReport, CleanUpError> {
        let result = UndoTransaction::new(format!("Clean up {document}"))
            .run(buffer, |buffer| self.run_pass(document, buffer));
        if let Some(cache) = self.cache {
            cache.stale_code_model(document);
        }
        result
    }

    fn run_pass<B: TextBuffer + ?Sized>(
        &self,
        document: &str,
        buffer: &mut B,
    ) -> Result<CleanUpReport, CleanUpError> {
        let items = match self.cache {
            Some(cache) => self
                .retriever
                .retrieve_cached(cache, document, buffer.text()),
            None => self.retriever.retrieve(buffer.text()),
        };
        if items.is_empty() {
            info!(document; "Nothing to clean up");
            return Ok(CleanUpReport::default());
        }

        let mut report = CleanUpReport {
            regions_removed: items
                .iter()
                .filter(|item| {
                    (item.kind == Kind::Region && !item.is_invalidated && !item.is_pseudo_group)
                        || item.live_region().is_some()
                })
                .count(),
            ..CleanUpReport::default()
        };

        let items = RegionService.cleanup_existing_regions(buffer, items)?;
        let mut forest = TreeBuilder.build(items);
        report.moves = Reorganizer::new(self.policy.clone())
            .with_order_critical_attributes(self.options.order_critical_attributes.clone())
            .reorganize(buffer, &mut forest)?;

        if self.options.add_regions {
            let mut forest = TreeBuilder.build(self.retriever.retrieve(buffer.text()));
            let added = RegionService.add_required_regions(buffer, &mut forest)?;
            BlankLineService.pad_regions(buffer, &added)?;
            report.regions_added = added.len();
        }

        info!(
            document, moves = report.moves, removed = report.regions_removed,
            added = report.regions_added;
            "Cleaned up document"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "tests/cleanup.rs"]
mod tests;
