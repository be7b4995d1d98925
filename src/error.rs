//! Error types for regiment operations.
//!
//! Buffer mutation failures live next to the buffer in [`crate::buffer::BufferError`]; this
//! module holds the errors of the collaborators around it and of a whole pass.

use std::io;

use thiserror::Error;

use crate::buffer::BufferError;

#[derive(Debug, Error)]
/// The parser could not model a document.
pub enum ModelError {
    /// The grammar could not be loaded into the parser.
    #[error("language error: {0}")]
    Language(String),

    /// A structural query failed to compile against the grammar.
    #[error("query error: {0}")]
    Query(String),

    /// The parser produced no tree.
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
/// Why a clean-up pass stopped; the buffer has been rolled back when this is returned.
pub enum CleanUpError {
    /// A buffer edit failed mid-pass.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
}

#[derive(Debug, Error)]
/// Failure while building or applying an edit plan.
pub enum EditError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The patch set could not be applied.
    #[error("patch error: {0}")]
    Patch(String),

    /// An edit addresses a line the file does not have.
    #[error("line {line} is out of range for {file}")]
    LineOutOfRange {
        /// File the edit targets.
        file: String,
        /// Offending line.
        line: i64,
    },
}
