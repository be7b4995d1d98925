//! C# format implementation using tree-sitter-c-sharp.
//!
//! Every type and member declaration is captured. Field and event-field declarations produce one
//! item per declarator, all sharing the declaration's span, so `int a, b;` moves as one unit.

use tree_sitter::Node;

use crate::formats::Format;
use crate::item::{Kind, Parameter, Span, StructuralItem, Visibility};

const MEMBER_QUERY: &str = r"
[
  (namespace_declaration)
  (file_scoped_namespace_declaration)
  (class_declaration)
  (record_declaration)
  (struct_declaration)
  (interface_declaration)
  (enum_declaration)
  (enum_member_declaration)
  (delegate_declaration)
  (event_declaration)
  (event_field_declaration)
  (constructor_declaration)
  (destructor_declaration)
  (method_declaration)
  (operator_declaration)
  (conversion_operator_declaration)
  (field_declaration)
  (property_declaration)
  (indexer_declaration)
] @member
";

/// Attributes marking a method as a unit test.
pub const TEST_ATTRIBUTES: [&str; 4] = ["TestMethod", "Test", "Fact", "Theory"];

/// Tree-sitter queries and classification for C# sources.
pub struct CSharpFormat;

impl Format for CSharpFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_c_sharp::LANGUAGE.into()
    }

    fn member_query(&self) -> &'static str {
        MEMBER_QUERY
    }

    fn classify(&self, node: Node<'_>, source: &str) -> Vec<StructuralItem> {
        let Some(mut kind) = member_kind(node.kind()) else {
            return Vec::new();
        };

        let modifiers = modifiers(node, source);
        let attributes = attributes(node, source);
        if kind == Kind::Method
            && attributes
                .iter()
                .any(|attribute| TEST_ATTRIBUTES.contains(&short_attribute_name(attribute)))
        {
            kind = Kind::TestMethod;
        }

        let specifier = named_child(node, "explicit_interface_specifier")
            .map(|specifier| text(specifier, source).trim().trim_end_matches('.').trim());
        let names = match node.kind() {
            "field_declaration" | "event_field_declaration" => declarators(node, source),
            _ => vec![member_name(node, source)],
        };
        let visibility = visibility(node, kind, &modifiers, specifier.is_some());
        let parameters = parameters(node, source);
        let span = Span::from_offsets(source, node.start_byte(), node.end_byte());
        let has = |modifier: &str| modifiers.contains(&modifier);

        names
            .into_iter()
            .map(|name| {
                let name = match specifier {
                    Some(specifier) => format!("{specifier}.{name}"),
                    None => name,
                };
                let mut item = StructuralItem::new(kind, name, span.clone());
                item.visibility = visibility;
                item.is_static = has("static");
                item.is_constant = has("const");
                item.is_read_only = has("readonly");
                item.is_explicit_interface_impl = specifier.is_some();
                item.attributes.clone_from(&attributes);
                item.parameters.clone_from(&parameters);
                item
            })
            .collect()
    }
}

fn member_kind(node_kind: &str) -> Option<Kind> {
    Some(match node_kind {
        "namespace_declaration" | "file_scoped_namespace_declaration" => Kind::Namespace,
        "class_declaration" | "record_declaration" => Kind::Class,
        "struct_declaration" => Kind::Struct,
        "interface_declaration" => Kind::Interface,
        "enum_declaration" => Kind::Enum,
        "enum_member_declaration" | "field_declaration" => Kind::Field,
        "delegate_declaration" => Kind::Delegate,
        "event_declaration" | "event_field_declaration" => Kind::Event,
        "constructor_declaration" => Kind::Constructor,
        "destructor_declaration" => Kind::Destructor,
        "method_declaration" | "operator_declaration" | "conversion_operator_declaration" => {
            Kind::Method
        }
        "property_declaration" => Kind::Property,
        "indexer_declaration" => Kind::Indexer,
        _ => return None,
    })
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

fn named_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == kind);
    found
}

fn named_children<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

fn field_text(node: Node<'_>, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|child| text(child, source).trim().to_string())
}

fn member_name(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "indexer_declaration" => "this".to_string(),
        "operator_declaration" => {
            let operator = field_text(node, "operator", source).unwrap_or_default();
            format!("operator {operator}").trim_end().to_string()
        }
        "conversion_operator_declaration" => {
            let target = field_text(node, "type", source).unwrap_or_default();
            format!("operator {target}").trim_end().to_string()
        }
        "destructor_declaration" => {
            format!("~{}", field_text(node, "name", source).unwrap_or_default())
        }
        _ => field_text(node, "name", source).unwrap_or_default(),
    }
}

fn declarators(node: Node<'_>, source: &str) -> Vec<String> {
    let Some(declaration) = named_child(node, "variable_declaration") else {
        return Vec::new();
    };
    named_children(declaration, "variable_declarator")
        .into_iter()
        .filter_map(|declarator| {
            field_text(declarator, "name", source).or_else(|| {
                let mut cursor = declarator.walk();
                let first = declarator.named_children(&mut cursor).next();
                first.map(|name| text(name, source).trim().to_string())
            })
        })
        .collect()
}

fn modifiers<'s>(node: Node<'_>, source: &'s str) -> Vec<&'s str> {
    named_children(node, "modifier")
        .into_iter()
        .map(|modifier| text(modifier, source).trim())
        .collect()
}

fn attributes(node: Node<'_>, source: &str) -> Vec<String> {
    named_children(node, "attribute_list")
        .into_iter()
        .flat_map(|list| named_children(list, "attribute"))
        .filter_map(|attribute| field_text(attribute, "name", source))
        .collect()
}

fn short_attribute_name(name: &str) -> &str {
    let name = name.rsplit(['.', ':']).next().unwrap_or(name);
    name.strip_suffix("Attribute")
        .filter(|stripped| !stripped.is_empty())
        .unwrap_or(name)
}

fn parameters(node: Node<'_>, source: &str) -> Vec<Parameter> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(list, "parameter")
        .into_iter()
        .map(|parameter| Parameter {
            name: field_text(parameter, "name", source).unwrap_or_default(),
            type_name: field_text(parameter, "type", source).unwrap_or_default(),
        })
        .collect()
}

/// The declaration enclosing `node`, looking through declaration bodies.
fn container_kind(node: Node<'_>) -> &'static str {
    let mut parent = node.parent();
    while let Some(current) = parent {
        match current.kind() {
            "declaration_list" | "enum_member_declaration_list" => parent = current.parent(),
            kind => return kind,
        }
    }
    "compilation_unit"
}

fn visibility(
    node: Node<'_>,
    kind: Kind,
    modifiers: &[&str],
    explicit: bool,
) -> Option<Visibility> {
    if kind == Kind::Namespace || node.kind() == "enum_member_declaration" {
        return None;
    }

    let has = |modifier: &str| modifiers.contains(&modifier);
    let declared = if has("public") {
        Some(Visibility::Public)
    } else if has("protected") && has("internal") {
        Some(Visibility::ProtectedInternal)
    } else if has("private") && has("protected") {
        Some(Visibility::PrivateProtected)
    } else if has("protected") {
        Some(Visibility::Protected)
    } else if has("internal") {
        Some(Visibility::Internal)
    } else if has("private") {
        Some(Visibility::Private)
    } else {
        None
    };

    declared.or(Some(
        if explicit || (kind == Kind::Constructor && has("static")) {
            Visibility::Public
        } else {
            match container_kind(node) {
                "interface_declaration" => Visibility::Public,
                "namespace_declaration"
                | "file_scoped_namespace_declaration"
                | "compilation_unit" => Visibility::Internal,
                _ => Visibility::Private,
            }
        },
    ))
}

#[cfg(test)]
#[path = "../tests/csharp.rs"]
mod tests;
