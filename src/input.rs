//! Finding documents on disk and extracting their structural items.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor};

use crate::error::ModelError;
use crate::formats::Format;
use crate::item::StructuralItem;

/// Collect files matching `extensions` from `paths`, descending into directories.
///
/// Files named explicitly are kept whatever their extension. The result is sorted.
///
/// # Errors
///
/// Returns an error if a path or directory cannot be read.
pub fn find_documents(paths: Vec<PathBuf>, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(&path, extensions, &mut documents)?;
        } else if path.is_file() {
            documents.push(path);
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
    }
    documents.sort();
    documents.dedup();
    Ok(documents)
}

fn walk(directory: &Path, extensions: &[String], documents: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, extensions, documents)?;
        } else if has_extension(&path, extensions) {
            documents.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(extension))
        })
}

/// Parse `source` with `format` and classify every captured member declaration.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded, the query does not compile, or the parser
/// gives up.
pub fn extract_items<F: Format + ?Sized>(
    source: &str,
    format: &F,
) -> Result<Vec<StructuralItem>, ModelError> {
    let language = format.language();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|err| ModelError::Language(err.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ModelError::Parse("parser returned no tree".to_string()))?;
    if tree.root_node().has_error() {
        warn!("Document has syntax errors, spans may be incomplete");
    }

    let query = Query::new(&language, format.member_query())
        .map_err(|err| ModelError::Query(err.to_string()))?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

    let mut items = Vec::new();
    while let Some(found) = matches.next() {
        for capture in found.captures {
            items.extend(format.classify(capture.node, source));
        }
    }
    Ok(items)
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
