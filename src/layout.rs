//! Where members sit in the text, and how the gaps between them are tidied.
//!
//! Moves and region markers operate on blocks. A member that owns its lines has a line-aligned
//! block: it starts at the line of its first leading `//` comment (or its region's open marker)
//! and ends after the line break of its last line (or its region's close marker).
//!
//! Members may share a line with other code, as in `class B { int z; int a; }`. Such a block
//! starts right after the last visible character before the member, so it carries the
//! whitespace in front of it, and stops at the member's end when code follows on the line.
//! The shared code never travels with the block; edits that need the member on a line of its
//! own split the line first.

use std::ops::Range;

use crate::buffer::{indentation, is_blank, Anchor, Bias, BufferError, TextBuffer};
use crate::item::{Span, StructuralItem};

const INDENT_UNIT: &str = "    ";

#[derive(Clone, Copy, Debug)]
/// A range held by two anchors: the start moves past text pasted at it, the end stays put.
pub struct TrackedRange {
    start: Anchor,
    end: Anchor,
}

impl TrackedRange {
    /// Anchors `range` in `buffer`.
    pub fn new<B: TextBuffer + ?Sized>(buffer: &mut B, range: Range<usize>) -> Self {
        Self {
            start: buffer.anchor(range.start, Bias::Right),
            end: buffer.anchor(range.end, Bias::Left),
        }
    }

    #[must_use]
    /// Anchor at the start of the range.
    pub fn start(self) -> Anchor {
        self.start
    }

    #[must_use]
    /// Current offsets of the range.
    pub fn range<B: TextBuffer + ?Sized>(self, buffer: &B) -> Range<usize> {
        let start = buffer.resolve(self.start);
        start..buffer.resolve(self.end).max(start)
    }

    #[must_use]
    /// Current span of the range, lines included.
    pub fn span<B: TextBuffer + ?Sized>(self, buffer: &B) -> Span {
        let range = self.range(buffer);
        Span::from_offsets(buffer.text(), range.start, range.end)
    }
}

#[must_use]
/// The block `item` occupies, leading comments and live region included.
pub fn block_range<B: TextBuffer + ?Sized>(buffer: &B, item: &StructuralItem) -> Range<usize> {
    let (mut start, mut end) = (item.start_offset(), item.end_offset());
    if let Some(region) = item.live_region() {
        start = start.min(region.span.start_offset);
        end = end.max(region.span.end_offset);
    }

    let text = buffer.text();
    let owns_line = starts_line(buffer, start);
    let line = buffer.line_start(start);
    let mut start = if owns_line {
        line
    } else {
        line + text[line..start].trim_end().len()
    };
    while owns_line && start > 0 {
        let previous = buffer.line_start(start - 1);
        if text[previous..start].trim_start().starts_with("//") {
            start = previous;
        } else {
            break;
        }
    }

    let end = end.max(start);
    let end = if (end > start && end == buffer.line_start(end)) || !ends_line(buffer, end) {
        end
    } else if owns_line {
        buffer.next_line_start(end)
    } else {
        // The line break stays with the code the line starts with.
        end + text[end..buffer.line_end(end)].trim_end_matches('\r').len()
    };
    start..end
}

#[must_use]
/// Whether only whitespace precedes `offset` on its line.
pub fn starts_line<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> bool {
    let offset = offset.min(buffer.len());
    is_blank(&buffer.text()[buffer.line_start(offset)..offset])
}

#[must_use]
/// Whether only whitespace or a trailing `//` comment follows `offset` on its line.
pub fn ends_line<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> bool {
    let offset = offset.min(buffer.len());
    let rest = buffer.text()[offset..buffer.line_end(offset)].trim();
    rest.is_empty() || rest.starts_with("//")
}

#[must_use]
/// Indentation for a member at `offset`: its line's, or one level in when the member shares a
/// line whose code before it opens a block.
pub fn member_indent<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> String {
    if starts_line(buffer, offset) {
        return indent_at(buffer, offset);
    }
    let prefix = &buffer.text()[buffer.line_start(offset)..offset];
    let mut indent = indentation(prefix).to_string();
    if prefix.trim_end().ends_with('{') {
        indent.push_str(if indent.contains('\t') { "\t" } else { INDENT_UNIT });
    }
    indent
}

#[must_use]
/// `indent` one level shallower.
pub fn outdent(indent: &str) -> &str {
    indent
        .strip_suffix('\t')
        .or_else(|| indent.strip_suffix(INDENT_UNIT))
        .unwrap_or("")
}

/// Deletes the spaces and tabs right after `offset`.
///
/// # Errors
///
/// Propagates buffer failures.
pub fn delete_space_after<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    offset: usize,
) -> Result<(), BufferError> {
    let rest = &buffer.text()[offset..buffer.line_end(offset)];
    let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    if width > 0 {
        buffer.delete(offset..offset + width)?;
    }
    Ok(())
}

/// Splits the line at `offset`, so the code after it starts a new line indented by `indent`.
///
/// Anchors at `offset` that stay before insertions keep to the first line; the others follow
/// the code onto the new one.
///
/// # Errors
///
/// Propagates buffer failures.
pub fn break_line<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    offset: usize,
    indent: &str,
    newline: &str,
) -> Result<(), BufferError> {
    delete_space_after(buffer, offset)?;
    buffer.insert(offset, &format!("{newline}{indent}"))
}

#[must_use]
/// Indentation of the line holding `offset`.
pub fn indent_at<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> String {
    let start = buffer.line_start(offset);
    indentation(&buffer.text()[start..buffer.line_end(start)]).to_string()
}

#[must_use]
/// Whether the line holding `offset` opens a block (its last visible character is `{`).
pub fn opens_block<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> bool {
    let start = buffer.line_start(offset);
    buffer.text()[start..buffer.line_end(start)]
        .trim_end()
        .ends_with('{')
}

#[must_use]
/// Whether the line holding `offset` closes a block (it starts with `}`).
pub fn closes_block<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> bool {
    let start = buffer.line_start(offset);
    buffer.text()[start..buffer.line_end(start)]
        .trim_start()
        .starts_with('}')
}

/// Collapses the run of blank lines around the line start `at`.
///
/// One blank line, ended by `newline`, survives when code sits on both sides of the gap; next to
/// a line opening or closing a block, or at either end of the text, the gap is removed entirely.
///
/// # Errors
///
/// Propagates buffer failures.
pub fn tidy_gap<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    at: usize,
    newline: &str,
) -> Result<(), BufferError> {
    let at = buffer.line_start(at);

    let mut start = at;
    while start > 0 {
        let previous = buffer.line_start(start - 1);
        if is_blank(&buffer.text()[previous..start]) {
            start = previous;
        } else {
            break;
        }
    }

    let mut end = at;
    while end < buffer.len() {
        let next = buffer.next_line_start(end);
        if is_blank(&buffer.text()[end..next]) && next > end {
            end = next;
        } else {
            break;
        }
    }

    if start == end {
        return Ok(());
    }

    let keep_one = start > 0
        && end < buffer.len()
        && !opens_block(buffer, start - 1)
        && !closes_block(buffer, end);
    if keep_one && buffer.text().get(start..end) == Some(newline) {
        return Ok(());
    }
    buffer.delete(start..end)?;
    if keep_one {
        buffer.insert(start, newline)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/layout.rs"]
mod tests;
