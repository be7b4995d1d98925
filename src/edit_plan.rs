//! The edit plan manages document modifications using textum patches.
//!
//! A pass runs on an in-memory document; this module turns the before/after pair into the
//! smallest line window that changed, so a plan can be printed, saved, reviewed and applied to
//! the files on disk later.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use textum::{Boundary, BoundaryMode, Patch, PatchSet, Snippet, Target};

use crate::error::EditError;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
/// Serialisable collection of file modifications for atomic application.
pub struct EditPlan {
    /// Individual line-window replacements grouped for batch processing.
    pub edits: Vec<Edit>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// Line window and content replacing it in one file.
pub struct Edit {
    /// Target file path for this modification.
    pub file_name: String,
    /// First line to replace (0-based, inclusive).
    pub line_start: i64,
    /// Line after the last one replaced (0-based, exclusive).
    pub line_end: i64,
    /// New lines, each with its line break.
    pub replacement: String,
    /// Summary of what the pass did, for review.
    pub description: String,
}

impl Edit {
    #[must_use]
    /// The smallest non-empty line window turning `before` into `after`, if they differ.
    pub fn between(
        file_name: &str,
        before: &str,
        after: &str,
        description: impl Into<String>,
    ) -> Option<Self> {
        if before == after {
            return None;
        }
        let old: Vec<&str> = before.split_inclusive('\n').collect();
        let new: Vec<&str> = after.split_inclusive('\n').collect();

        let mut prefix = old.iter().zip(&new).take_while(|(x, y)| x == y).count();
        let room = old.len().min(new.len()) - prefix;
        let mut suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(room)
            .take_while(|(x, y)| x == y)
            .count();
        if prefix + suffix == old.len() {
            if prefix > 0 {
                prefix -= 1;
            } else if suffix > 0 {
                suffix -= 1;
            }
        }

        Some(Self {
            file_name: file_name.to_string(),
            line_start: i64::try_from(prefix).ok()?,
            line_end: i64::try_from(old.len() - suffix).ok()?,
            replacement: new[prefix..new.len() - suffix].concat(),
            description: description.into(),
        })
    }
}

impl EditPlan {
    #[must_use]
    /// Whether the plan changes nothing.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits in the plan using textum patches.
    ///
    /// Groups edits by file and uses textum's `PatchSet` to apply all changes atomically per
    /// file. A window touching the first or the last line of a file is spliced directly, since
    /// there is no neighbouring line to anchor the patch on.
    ///
    /// # Errors
    ///
    /// Returns an error if file operations or patching fails, or if an edit addresses lines the
    /// file does not have.
    pub fn apply(&self) -> Result<(), EditError> {
        let mut file_groups: HashMap<String, Vec<&Edit>> = HashMap::new();

        for edit in &self.edits {
            file_groups
                .entry(edit.file_name.clone())
                .or_default()
                .push(edit);
        }

        for (file_name, edits) in file_groups {
            let content = fs::read_to_string(&file_name)?;
            let line_count =
                i64::try_from(content.split_inclusive('\n').count()).unwrap_or(i64::MAX);

            for edit in &edits {
                if edit.line_start < 0 || edit.line_start > edit.line_end {
                    return Err(EditError::LineOutOfRange {
                        file: file_name,
                        line: edit.line_start,
                    });
                }
                if edit.line_end > line_count {
                    return Err(EditError::LineOutOfRange {
                        file: file_name,
                        line: edit.line_end,
                    });
                }
            }

            let anchored = edits
                .iter()
                .all(|edit| edit.line_start > 0 && edit.line_end < line_count);
            let new_content = if anchored {
                patch(&file_name, &edits)?
            } else {
                splice(&content, &edits)
            };
            fs::write(&file_name, new_content)?;
        }

        Ok(())
    }
}

fn patch(file_name: &str, edits: &[&Edit]) -> Result<String, EditError> {
    let mut patchset = PatchSet::new();

    for edit in edits {
        let out_of_range = |line: i64| EditError::LineOutOfRange {
            file: file_name.to_string(),
            line,
        };
        let first = (edit.line_start + 1)
            .try_into()
            .map_err(|_| out_of_range(edit.line_start))?;
        let after = (edit.line_end + 1)
            .try_into()
            .map_err(|_| out_of_range(edit.line_end))?;
        let start = Boundary::new(Target::Line(first), BoundaryMode::Include);
        let end = Boundary::new(Target::Line(after), BoundaryMode::Exclude);
        let snippet = Snippet::Between { start, end };

        let patch = Patch {
            file: file_name.to_string(),
            snippet,
            replacement: format!("\n{}", edit.replacement),
        };

        patchset.add(patch);
    }

    let mut results = patchset
        .apply_to_files()
        .map_err(|err| EditError::Patch(err.to_string()))?;
    results
        .remove(file_name)
        .ok_or_else(|| EditError::Patch(format!("no result for {file_name}")))
}

/// Replaces line windows directly, bottom-up so earlier windows keep their numbers.
fn splice(content: &str, edits: &[&Edit]) -> String {
    let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
    let mut ordered = edits.to_vec();
    ordered.sort_by(|x, y| y.line_start.cmp(&x.line_start));

    for edit in ordered {
        let start = usize::try_from(edit.line_start).unwrap_or(0).min(lines.len());
        let end = usize::try_from(edit.line_end).unwrap_or(0).clamp(start, lines.len());
        lines.splice(
            start..end,
            edit.replacement.split_inclusive('\n').map(str::to_string),
        );
    }
    lines.concat()
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;
