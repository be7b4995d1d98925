//! Undo scoping for a whole pass.

use std::fmt::Display;

use log::error;

use crate::buffer::TextBuffer;

#[derive(Clone, Debug)]
/// A named undo scope wrapped around an action on a buffer.
///
/// When the buffer already has an open scope the transaction joins it: the outermost owner
/// decides whether the edits stay.
pub struct UndoTransaction {
    name: String,
}

impl UndoTransaction {
    #[must_use]
    /// A transaction shown to the user as `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    /// Name of the scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    /// The one-line status reported when the action fails.
    pub fn status_message(&self, err: &impl Display) -> String {
        format!("{} stopped! {err}", self.name)
    }

    /// Runs `action` inside the scope, rolling every edit back if it fails.
    ///
    /// # Errors
    ///
    /// Returns the action's error after the buffer has been restored.
    pub fn run<B, T, E>(
        &self,
        buffer: &mut B,
        action: impl FnOnce(&mut B) -> Result<T, E>,
    ) -> Result<T, E>
    where
        B: TextBuffer + ?Sized,
        E: Display,
    {
        let owner = buffer.begin_undo(&self.name);
        match action(buffer) {
            Ok(value) => {
                if owner {
                    buffer.end_undo();
                }
                Ok(value)
            }
            Err(err) => {
                error!(transaction = self.name.as_str(); "{}", self.status_message(&err));
                if owner {
                    buffer.abort_undo();
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/undo.rs"]
mod tests;
