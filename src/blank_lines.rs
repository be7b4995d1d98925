//! Single blank lines around region markers.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::buffer::{is_blank, BufferError, TextBuffer};
use crate::item::{RegionMarker, StructuralItem};

static PADDABLE_ABOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[^\s\{]").expect("pattern is valid"));
static PADDABLE_BELOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[^\s\}]").expect("pattern is valid"));

#[derive(Clone, Copy, Debug, Default)]
/// Keeps region markers visually separated from the code around them.
pub struct BlankLineService;

impl BlankLineService {
    #[must_use]
    /// Whether a blank line belongs above `item` when it is placed under a neighbour.
    pub fn should_be_preceded_by_blank_line(self, item: &StructuralItem) -> bool {
        item.live_region().is_some()
    }

    #[must_use]
    /// Whether a blank line belongs below `item` when a neighbour is placed under it.
    pub fn should_be_followed_by_blank_line(self, item: &StructuralItem) -> bool {
        item.live_region().is_some()
    }

    /// Puts one blank line above every open marker and below every close marker of `regions`,
    /// unless the neighbouring line is already blank or is a brace line. Returns the number of
    /// lines inserted.
    ///
    /// # Errors
    ///
    /// Propagates buffer failures.
    pub fn pad_regions<B: TextBuffer + ?Sized>(
        self,
        buffer: &mut B,
        regions: &[RegionMarker],
    ) -> Result<usize, BufferError> {
        let mut markers: Vec<(usize, bool)> = Vec::new();
        for region in regions.iter().filter(|region| !region.is_invalidated) {
            markers.push((buffer.line_start(region.span.start_offset), true));
            markers.push((buffer.line_start(region.span.end_offset), false));
        }
        markers.sort_unstable();
        markers.dedup();

        let newline = buffer.line_ending();
        let mut inserted = 0;
        for (line, is_open) in markers.into_iter().rev() {
            if is_open {
                if line == 0 {
                    continue;
                }
                let above = buffer.line_start(line - 1);
                let text = &buffer.text()[above..line];
                if is_blank(text)
                    || !PADDABLE_ABOVE.is_match(text)
                    || text.trim_end().ends_with('{')
                {
                    continue;
                }
                buffer.insert(line, newline)?;
            } else {
                let below = buffer.next_line_start(line);
                if below >= buffer.len() || below == line {
                    continue;
                }
                let text = &buffer.text()[below..buffer.line_end(below)];
                if is_blank(text) || !PADDABLE_BELOW.is_match(text) {
                    continue;
                }
                buffer.insert(below, newline)?;
            }
            inserted += 1;
        }

        debug!(inserted; "Padded region markers");
        Ok(inserted)
    }
}

#[cfg(test)]
#[path = "tests/blank_lines.rs"]
mod tests;
