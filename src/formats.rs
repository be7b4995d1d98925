//! Format trait and implementations for different source languages.
//!
//! This module defines the `Format` trait which abstracts over different languages by providing
//! the tree-sitter grammar, a query capturing every member declaration, and the mapping from a
//! captured node to the structural items it declares.

pub mod csharp;

use crate::item::StructuralItem;

/// Tree-sitter description of a language's member declarations.
pub trait Format {
    /// Grammar used to parse documents.
    fn language(&self) -> tree_sitter::Language;

    /// Query capturing every member declaration node.
    fn member_query(&self) -> &str;

    /// Items declared by one captured node; a node may declare several (`int a, b;`) or none.
    fn classify(&self, node: tree_sitter::Node<'_>, source: &str) -> Vec<StructuralItem>;
}
