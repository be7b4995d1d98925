//! The text buffer the engine edits.
//!
//! Editors expose documents through cut/paste/insert primitives addressed by offset, plus
//! edit-points that stay attached to the text around them while other parts change. The
//! [`TextBuffer`] trait captures exactly that surface; [`Document`] is the in-memory
//! implementation used by the CLI and the tests.
//!
//! Anchors are how positions survive edits: an anchor after an edit shifts with it, an anchor
//! inside a deleted range collapses to its start, and an anchor sitting exactly at an insertion
//! point stays put ([`Bias::Left`]) or moves past the new text ([`Bias::Right`]). A [`Clip`]
//! remembers the anchors that were inside the range it was cut from, so pasting it carries them
//! to the new location.

use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// Failure of a buffer mutation.
pub enum BufferError {
    /// The offset lies past the end of the text.
    #[error("offset {offset} is past the end of the buffer ({len} bytes)")]
    OutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Text length at the time of the request.
        len: usize,
    },
    /// The offset splits a multi-byte character.
    #[error("offset {offset} does not fall on a character boundary")]
    NotCharBoundary {
        /// Requested offset.
        offset: usize,
    },
    /// The buffer refused the edit, e.g. because the document changed underneath.
    #[error("edit rejected: {0}")]
    Rejected(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Handle to a position that follows edits.
pub struct Anchor(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which side of an insertion made exactly at an anchor the anchor ends up on.
pub enum Bias {
    /// Stay before inserted text.
    Left,
    /// Move past inserted text.
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Text removed by [`TextBuffer::cut`], with the anchors that travelled with it.
pub struct Clip {
    text: String,
    anchors: Vec<(Anchor, usize)>,
}

impl Clip {
    #[must_use]
    /// The cut text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends `text` after the cut text; carried anchors keep their offsets.
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Appends `newline` unless the text already ends with a line break.
    pub fn ensure_trailing_newline(&mut self, newline: &str) {
        if !self.text.ends_with('\n') {
            self.text.push_str(newline);
        }
    }
}

#[must_use]
/// Whether a line (with or without its terminator) holds only whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[must_use]
/// Leading spaces and tabs of a line.
pub fn indentation(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..end]
}

/// Offset-addressed text editing with edit-tracking anchors and an undo scope.
pub trait TextBuffer {
    /// Current contents.
    fn text(&self) -> &str;

    /// Inserts `text` at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is out of bounds or splits a character.
    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError>;

    /// Deletes `range`, returning the removed text.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or splits a character.
    fn delete(&mut self, range: Range<usize>) -> Result<String, BufferError>;

    /// Removes `range`, keeping the anchors inside it for a later [`TextBuffer::paste`].
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or splits a character.
    fn cut(&mut self, range: Range<usize>) -> Result<Clip, BufferError>;

    /// Inserts a clip at `offset`, restoring its anchors, and returns the pasted range.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is out of bounds or splits a character.
    fn paste(&mut self, offset: usize, clip: Clip) -> Result<Range<usize>, BufferError>;

    /// Cursor position.
    fn cursor(&self) -> usize;

    /// Moves the cursor, clamped to the text.
    fn move_cursor(&mut self, offset: usize);

    /// Creates an anchor at `offset`.
    fn anchor(&mut self, offset: usize, bias: Bias) -> Anchor;

    /// Current offset of an anchor.
    fn resolve(&self, anchor: Anchor) -> usize;

    /// Opens an undo scope named `name`; returns `false` if one was already open.
    fn begin_undo(&mut self, name: &str) -> bool;

    /// Closes the open undo scope, keeping its edits.
    fn end_undo(&mut self);

    /// Closes the open undo scope, reverting every edit made inside it.
    fn abort_undo(&mut self);

    /// Length in bytes.
    fn len(&self) -> usize {
        self.text().len()
    }

    /// Whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    /// Number of lines; a trailing line break does not start a new line.
    fn line_count(&self) -> usize {
        let text = self.text();
        let breaks = text.matches('\n').count();
        if text.is_empty() || text.ends_with('\n') {
            breaks
        } else {
            breaks + 1
        }
    }

    /// Line break the text uses, judged by its first line: `\r\n` or `\n`.
    fn line_ending(&self) -> &'static str {
        let text = self.text();
        match text.find('\n') {
            Some(newline) if text[..newline].ends_with('\r') => "\r\n",
            _ => "\n",
        }
    }

    /// Line (0-based) holding `offset`.
    fn line_of(&self, offset: usize) -> usize {
        let text = self.text();
        text[..offset.min(text.len())].matches('\n').count()
    }

    /// Start of the line holding `offset`.
    fn line_start(&self, offset: usize) -> usize {
        let text = self.text();
        text[..offset.min(text.len())]
            .rfind('\n')
            .map_or(0, |newline| newline + 1)
    }

    /// End of the line holding `offset`, before its line break.
    fn line_end(&self, offset: usize) -> usize {
        let text = self.text();
        let offset = offset.min(text.len());
        text[offset..]
            .find('\n')
            .map_or(text.len(), |newline| offset + newline)
    }

    /// Start of the line after the one holding `offset`, or the end of the text.
    fn next_line_start(&self, offset: usize) -> usize {
        let end = self.line_end(offset);
        if end < self.len() {
            end + 1
        } else {
            end
        }
    }

    /// Offset where line `line` starts.
    fn offset_of_line(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return Some(0);
        }
        self.text()
            .match_indices('\n')
            .nth(line - 1)
            .map(|(newline, _)| newline + 1)
            .filter(|start| *start < self.len() || line < self.line_count())
    }

    /// Text of line `line`, without its line break.
    fn line_text(&self, line: usize) -> Option<&str> {
        let start = self.offset_of_line(line)?;
        Some(&self.text()[start..self.line_end(start)])
    }

    /// Deletes the whole line holding `offset`, line break included.
    ///
    /// # Errors
    ///
    /// Propagates deletion failures.
    fn delete_line(&mut self, offset: usize) -> Result<String, BufferError> {
        let start = self.line_start(offset);
        let end = self.next_line_start(offset);
        self.delete(start..end)
    }

    /// Re-indents the lines touching `range` so the first non-blank one starts with `indent`,
    /// shifting the others by the same amount.
    ///
    /// # Errors
    ///
    /// Propagates edit failures.
    fn reformat(&mut self, range: Range<usize>, indent: &str) -> Result<(), BufferError> {
        let mut starts = Vec::new();
        let mut line = self.line_start(range.start);
        loop {
            starts.push(line);
            let next = self.next_line_start(line);
            if next >= range.end || next == line || next >= self.len() {
                break;
            }
            line = next;
        }

        let text = self.text();
        let Some(base) = starts
            .iter()
            .map(|&start| &text[start..self.line_end(start)])
            .find(|line| !is_blank(line))
            .map(|line| indentation(line).to_string())
        else {
            return Ok(());
        };
        if base == indent {
            return Ok(());
        }

        for &start in starts.iter().rev() {
            let line = &self.text()[start..self.line_end(start)];
            if is_blank(line) {
                continue;
            }
            let current = indentation(line);
            let replacement = match current.strip_prefix(base.as_str()) {
                Some(extra) => format!("{indent}{extra}"),
                None => indent.to_string(),
            };
            if replacement == current {
                continue;
            }
            // Swap the indentation together with the first visible character, so an anchor at
            // the line start never sits at the insertion point.
            let width = current.len();
            let lead = line[width..].chars().next().map_or(0, char::len_utf8);
            let swapped = format!("{replacement}{}", &line[width..width + lead]);
            self.insert(start + width + lead, &swapped)?;
            self.delete(start..start + width + lead)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct AnchorSlot {
    offset: usize,
    bias: Bias,
}

#[derive(Clone, Debug)]
struct Snapshot {
    name: String,
    text: String,
    cursor: usize,
    anchors: Vec<AnchorSlot>,
}

#[derive(Clone, Debug, Default)]
/// In-memory [`TextBuffer`].
pub struct Document {
    text: String,
    cursor: usize,
    anchors: Vec<AnchorSlot>,
    undo: Option<Snapshot>,
}

impl Document {
    #[must_use]
    /// A document holding `text` with the cursor at the start.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    /// Consumes the document, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    #[must_use]
    /// Name of the open undo scope, if any.
    pub fn undo_scope(&self) -> Option<&str> {
        self.undo.as_ref().map(|snapshot| snapshot.name.as_str())
    }

    fn check(&self, offset: usize) -> Result<(), BufferError> {
        if offset > self.text.len() {
            return Err(BufferError::OutOfBounds {
                offset,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(BufferError::NotCharBoundary { offset });
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), BufferError> {
        self.check(range.start)?;
        self.check(range.end)?;
        if range.start > range.end {
            return Err(BufferError::Rejected(format!(
                "inverted range {}..{}",
                range.start, range.end
            )));
        }
        Ok(())
    }
}

impl TextBuffer for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError> {
        self.check(offset)?;
        self.text.insert_str(offset, text);
        let added = text.len();
        for slot in &mut self.anchors {
            if slot.offset > offset || (slot.offset == offset && slot.bias == Bias::Right) {
                slot.offset += added;
            }
        }
        if self.cursor >= offset {
            self.cursor += added;
        }
        Ok(())
    }

    fn delete(&mut self, range: Range<usize>) -> Result<String, BufferError> {
        self.check_range(&range)?;
        let removed: String = self.text.drain(range.clone()).collect();
        let shift = |offset: usize| {
            if offset >= range.end {
                offset - removed.len()
            } else if offset > range.start {
                range.start
            } else {
                offset
            }
        };
        for slot in &mut self.anchors {
            slot.offset = shift(slot.offset);
        }
        self.cursor = shift(self.cursor);
        Ok(removed)
    }

    fn cut(&mut self, range: Range<usize>) -> Result<Clip, BufferError> {
        self.check_range(&range)?;
        let anchors = self
            .anchors
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                (range.start < slot.offset && slot.offset < range.end)
                    || (slot.offset == range.start && slot.bias == Bias::Right)
                    || (slot.offset == range.end && slot.bias == Bias::Left)
            })
            .map(|(id, slot)| (Anchor(id), slot.offset - range.start))
            .collect();
        let text = self.delete(range)?;
        Ok(Clip { text, anchors })
    }

    fn paste(&mut self, offset: usize, clip: Clip) -> Result<Range<usize>, BufferError> {
        self.insert(offset, &clip.text)?;
        for (Anchor(id), relative) in clip.anchors {
            if let Some(slot) = self.anchors.get_mut(id) {
                slot.offset = offset + relative;
            }
        }
        Ok(offset..offset + clip.text.len())
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn move_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.text.len());
    }

    fn anchor(&mut self, offset: usize, bias: Bias) -> Anchor {
        self.anchors.push(AnchorSlot {
            offset: offset.min(self.text.len()),
            bias,
        });
        Anchor(self.anchors.len() - 1)
    }

    fn resolve(&self, anchor: Anchor) -> usize {
        self.anchors
            .get(anchor.0)
            .map_or(0, |slot| slot.offset.min(self.text.len()))
    }

    fn begin_undo(&mut self, name: &str) -> bool {
        if self.undo.is_some() {
            return false;
        }
        self.undo = Some(Snapshot {
            name: name.to_string(),
            text: self.text.clone(),
            cursor: self.cursor,
            anchors: self.anchors.clone(),
        });
        true
    }

    fn end_undo(&mut self) {
        self.undo = None;
    }

    fn abort_undo(&mut self) {
        if let Some(snapshot) = self.undo.take() {
            log::debug!("Reverting '{}'", snapshot.name);
            self.text = snapshot.text;
            self.cursor = snapshot.cursor;
            self.anchors = snapshot.anchors;
        }
    }
}

#[cfg(test)]
#[path = "tests/buffer.rs"]
mod tests;
