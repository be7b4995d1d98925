//! Structural items discovered in a source file.
//!
//! An item is one member (class, field, method, ...) or one region marker pair, described by its
//! kind, its name, the byte span it occupies and the modifiers that drive ordering. Items arrive
//! as a flat list from a parser and are nested later by the tree builder.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Structural classification of an item.
pub enum Kind {
    /// A class or record declaration.
    Class,
    /// An interface declaration.
    Interface,
    /// A struct declaration.
    Struct,
    /// An instance or static constructor.
    Constructor,
    /// A finalizer.
    Destructor,
    /// A delegate type declaration.
    Delegate,
    /// An event, with or without accessors.
    Event,
    /// An enum declaration.
    Enum,
    /// A field or enum member.
    Field,
    /// A constant field.
    Constant,
    /// An ordinary method or operator.
    Method,
    /// A method carrying a test attribute.
    TestMethod,
    /// A property.
    Property,
    /// An indexer.
    Indexer,
    /// A namespace, block-bodied or file-scoped.
    Namespace,
    /// A named folding region delimited by marker lines.
    Region,
}

impl Kind {
    #[must_use]
    /// Whether items of this kind own children in the tree.
    pub fn is_parent_capable(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Struct
                | Self::Interface
                | Self::Enum
                | Self::Namespace
                | Self::Region
        )
    }

    #[must_use]
    /// Whether items of this kind are fields, to which the constant and read-only keys apply.
    pub fn is_field_like(self) -> bool {
        matches!(self, Self::Field | Self::Constant)
    }

    #[must_use]
    /// Whether items of this kind are type declarations wrapped by namespace-level regions.
    pub fn is_type_declaration(self) -> bool {
        matches!(self, Self::Class | Self::Struct | Self::Interface)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Declared accessibility, ordered from most to least visible.
pub enum Visibility {
    /// `public`
    Public,
    /// `protected internal`
    ProtectedInternal,
    /// `internal`
    Internal,
    /// `protected`
    Protected,
    /// `private protected`
    PrivateProtected,
    /// `private`
    Private,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// A byte span plus the lines it starts and ends on.
pub struct Span {
    /// Byte offset of the first character.
    pub start_offset: usize,
    /// Byte offset one past the last character.
    pub end_offset: usize,
    /// Line holding `start_offset` (0-based).
    pub start_line: usize,
    /// Line holding the last character (0-based).
    pub end_line: usize,
}

impl Span {
    #[must_use]
    /// Span between two offsets, with lines computed from `text`.
    pub fn from_offsets(text: &str, start_offset: usize, end_offset: usize) -> Self {
        let line_at = |offset: usize| text[..offset.min(text.len())].matches('\n').count();
        Self {
            start_offset,
            end_offset,
            start_line: line_at(start_offset),
            end_line: line_at(end_offset.saturating_sub(1).max(start_offset)),
        }
    }

    #[must_use]
    /// Whether `other` lies within this span.
    pub fn contains(&self, other: &Self) -> bool {
        self.start_offset <= other.start_offset && other.end_offset <= self.end_offset
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One parameter of a method-like member.
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type as written.
    pub type_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A region marker pair as it sits in the text.
pub struct RegionMarker {
    /// Text following `#region` on the open marker.
    pub name: String,
    /// From the start of the open marker line to the end of the close marker line.
    pub span: Span,
    /// Set once the marker lines have been deleted from the buffer.
    pub is_invalidated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One discovered member or region.
pub struct StructuralItem {
    /// Structural classification.
    pub kind: Kind,
    /// Declared name; may be empty, or dotted for explicit interface implementations.
    pub name: String,
    /// Where the item sits in the text.
    pub span: Span,
    /// Declared accessibility, `None` where it does not apply.
    pub visibility: Option<Visibility>,
    /// `static` modifier.
    pub is_static: bool,
    /// `const` modifier (fields only).
    pub is_constant: bool,
    /// `readonly` modifier (fields only).
    pub is_read_only: bool,
    /// Whether the name is qualified by the interface it implements.
    pub is_explicit_interface_impl: bool,
    /// Attribute names as written.
    pub attributes: Vec<String>,
    /// Parameters of method-like members.
    pub parameters: Vec<Parameter>,
    /// Region wrapping exactly this member, if one was matched or synthesized.
    pub associated_region: Option<RegionMarker>,
    /// Region only: already removed from the buffer.
    pub is_invalidated: bool,
    /// Region only: synthetic grouping that is never removed on its own.
    pub is_pseudo_group: bool,
}

impl StructuralItem {
    #[must_use]
    /// An item with default modifiers covering `span`.
    pub fn new(kind: Kind, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            name: name.into(),
            span,
            visibility: None,
            is_static: false,
            is_constant: false,
            is_read_only: false,
            is_explicit_interface_impl: false,
            attributes: Vec::new(),
            parameters: Vec::new(),
            associated_region: None,
            is_invalidated: false,
            is_pseudo_group: false,
        }
    }

    #[must_use]
    /// Builder-style visibility setter.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    /// Byte offset where the item starts.
    pub fn start_offset(&self) -> usize {
        self.span.start_offset
    }

    #[must_use]
    /// Byte offset where the item ends.
    pub fn end_offset(&self) -> usize {
        self.span.end_offset
    }

    #[must_use]
    /// Whether the item occupies more than one line.
    pub fn is_multiline(&self) -> bool {
        self.span.start_line != self.span.end_line
    }

    #[must_use]
    /// The associated region, unless its markers are gone.
    pub fn live_region(&self) -> Option<&RegionMarker> {
        self.associated_region
            .as_ref()
            .filter(|region| !region.is_invalidated)
    }

    #[must_use]
    /// The region view of a `Region` item.
    pub fn as_region_marker(&self) -> RegionMarker {
        RegionMarker {
            name: self.name.clone(),
            span: self.span.clone(),
            is_invalidated: self.is_invalidated,
        }
    }

    #[must_use]
    /// Name used for ordering and display: explicit interface implementations drop the
    /// interface qualifier (everything through the last `.`).
    pub fn normalized_name(&self) -> &str {
        if self.is_explicit_interface_impl {
            if let Some(dot) = self.name.rfind('.') {
                if dot + 1 < self.name.len() {
                    return &self.name[dot + 1..];
                }
            }
        }
        &self.name
    }

    #[must_use]
    /// Region name that tells overloads apart, e.g. `Go(int, string)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self
            .parameters
            .iter()
            .map(|param| param.type_name.as_str())
            .collect();
        format!("{}({})", self.name, types.join(", "))
    }
}

#[cfg(test)]
#[path = "tests/item.rs"]
mod tests;
