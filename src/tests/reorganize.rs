use super::Reorganizer;
use crate::buffer::{Anchor, Bias, BufferError, Clip, Document, TextBuffer};
use crate::formats::csharp::CSharpFormat;
use crate::item::{Kind, Span, StructuralItem};
use crate::order::OrderPolicy;
use crate::retrieve::ItemRetriever;
use crate::tree::{ItemNode, TreeBuilder};
use crate::undo::UndoTransaction;
use std::ops::Range;

fn forest(text: &str) -> Vec<ItemNode> {
    TreeBuilder.build(ItemRetriever::new(&CSharpFormat).retrieve(text))
}

fn reorganize(doc: &mut Document) -> usize {
    let mut forest = forest(doc.text());
    Reorganizer::new(OrderPolicy::default())
        .reorganize(doc, &mut forest)
        .unwrap()
}

/// A document whose pastes are refused.
struct ReadOnlyPaste(Document);

impl TextBuffer for ReadOnlyPaste {
    fn text(&self) -> &str {
        self.0.text()
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError> {
        self.0.insert(offset, text)
    }

    fn delete(&mut self, range: Range<usize>) -> Result<String, BufferError> {
        self.0.delete(range)
    }

    fn cut(&mut self, range: Range<usize>) -> Result<Clip, BufferError> {
        self.0.cut(range)
    }

    fn paste(&mut self, _offset: usize, _clip: Clip) -> Result<Range<usize>, BufferError> {
        Err(BufferError::Rejected("document is read-only".to_string()))
    }

    fn cursor(&self) -> usize {
        self.0.cursor()
    }

    fn move_cursor(&mut self, offset: usize) {
        self.0.move_cursor(offset);
    }

    fn anchor(&mut self, offset: usize, bias: Bias) -> Anchor {
        self.0.anchor(offset, bias)
    }

    fn resolve(&self, anchor: Anchor) -> usize {
        self.0.resolve(anchor)
    }

    fn begin_undo(&mut self, name: &str) -> bool {
        self.0.begin_undo(name)
    }

    fn end_undo(&mut self) {
        self.0.end_undo();
    }

    fn abort_undo(&mut self) {
        self.0.abort_undo();
    }
}

const UNORDERED: &str = "class A
{
    public void Zeta() { }

    private int a;

    public void Alpha() { }
}
";

#[test]
fn test_two_moves_put_field_and_methods_in_order() {
    let mut doc = Document::new(UNORDERED);

    let moves = reorganize(&mut doc);

    assert_eq!(moves, 2);
    assert_eq!(
        doc.text(),
        "class A
{
    private int a;

    public void Alpha() { }

    public void Zeta() { }
}
"
    );
}

#[test]
fn test_second_pass_makes_no_moves() {
    let mut doc = Document::new(UNORDERED);
    reorganize(&mut doc);
    let once = doc.text().to_string();

    assert_eq!(reorganize(&mut doc), 0);
    assert_eq!(doc.text(), once);
}

#[test]
fn test_returned_forest_tracks_new_positions() {
    let mut doc = Document::new(UNORDERED);
    let mut forest = forest(doc.text());

    Reorganizer::new(OrderPolicy::default())
        .reorganize(&mut doc, &mut forest)
        .unwrap();

    let names: Vec<&str> = forest[0]
        .children
        .iter()
        .map(|child| child.item.name.as_str())
        .collect();
    assert_eq!(names, ["a", "Alpha", "Zeta"]);
    for child in &forest[0].children {
        let text = &doc.text()[child.item.start_offset()..child.item.end_offset()];
        assert!(text.contains(child.item.name.as_str()), "{text:?}");
    }
}

#[test]
fn test_enum_members_keep_declared_order() {
    let text = "enum Letters\n{\n    B,\n    A,\n    C\n}\n";
    let mut doc = Document::new(text);

    assert_eq!(reorganize(&mut doc), 0);
    assert_eq!(doc.text(), text);
}

#[test]
fn test_layout_attribute_pins_member_order() {
    let text = concat!(
        "[StructLayout(LayoutKind.Sequential)]\n",
        "struct Header\n{\n    int b;\n    int a;\n}\n",
    );
    let mut doc = Document::new(text);

    assert_eq!(reorganize(&mut doc), 0);
    assert_eq!(doc.text(), text);
}

#[test]
fn test_attribute_names_are_normalized() {
    let reorganizer = Reorganizer::new(OrderPolicy::default());
    let mut item = StructuralItem::new(Kind::Struct, "Header", Span::default());

    item.attributes = vec!["System.Runtime.InteropServices.StructLayoutAttribute".to_string()];
    assert!(reorganizer.is_exempt(&item));

    item.attributes = vec!["Serializable".to_string()];
    assert!(!reorganizer.is_exempt(&item));

    let custom = reorganizer.with_order_critical_attributes(vec!["Serializable".to_string()]);
    assert!(custom.is_exempt(&item));
}

#[test]
fn test_nested_levels_are_sorted() {
    let text = "namespace App
{
    class Zed
    {
        void B() { }

        void A() { }
    }

    class Abc
    {
    }
}
";
    let mut doc = Document::new(text);

    assert_eq!(reorganize(&mut doc), 2);
    assert_eq!(
        doc.text(),
        "namespace App
{
    class Abc
    {
    }

    class Zed
    {
        void A() { }

        void B() { }
    }
}
"
    );
}

#[test]
fn test_leading_comments_travel_with_member() {
    let text = "class A
{
    // Last.
    public void Zeta() { }

    public void Alpha() { }
}
";
    let mut doc = Document::new(text);

    assert_eq!(reorganize(&mut doc), 1);
    assert_eq!(
        doc.text(),
        "class A
{
    public void Alpha() { }

    // Last.
    public void Zeta() { }
}
"
    );
}

#[test]
fn test_shared_declaration_moves_as_one() {
    let text = "class A\n{\n    void Go() { }\n\n    int b, a;\n}\n";
    let mut doc = Document::new(text);

    assert_eq!(reorganize(&mut doc), 1);
    assert_eq!(doc.text(), "class A\n{\n    int b, a;\n\n    void Go() { }\n}\n");
}

#[test]
fn test_cursor_stays_on_moved_text() {
    let mut doc = Document::new(UNORDERED);
    let inside = UNORDERED.find("Alpha").unwrap() + 2;
    doc.move_cursor(inside);

    reorganize(&mut doc);

    assert!(doc.text()[doc.cursor()..].starts_with("pha()"));
}

#[test]
fn test_failed_move_is_rolled_back() {
    let mut buffer = ReadOnlyPaste(Document::new(UNORDERED));
    let mut forest = forest(UNORDERED);
    let reorganizer = Reorganizer::new(OrderPolicy::default());

    let result = UndoTransaction::new("Reorganize")
        .run(&mut buffer, |buffer| reorganizer.reorganize(buffer, &mut forest));

    assert!(matches!(result, Err(BufferError::Rejected(_))));
    assert_eq!(buffer.text(), UNORDERED);
}

#[test]
fn test_member_sharing_closing_brace_line_moves_alone() {
    let mut doc = Document::new("class A\n{\n    void Y() { }\n    void B() { } }\n");

    assert_eq!(reorganize(&mut doc), 1);
    assert_eq!(doc.text(), "class A\n{\n    void B() { }\n    void Y() { }\n}\n");
    assert_eq!(reorganize(&mut doc), 0);
}

#[test]
fn test_member_on_header_line_gets_its_own_line() {
    let mut doc = Document::new("class A { void Z() { }\n    void B() { }\n}\n");

    assert_eq!(reorganize(&mut doc), 1);
    assert_eq!(doc.text(), "class A {\n    void B() { }\n    void Z() { }\n}\n");
}

#[test]
fn test_member_later_on_a_line_moves_without_its_neighbour() {
    let mut doc = Document::new("class A\n{\n    void Zeta() { } void Alpha() { }\n}\n");

    assert_eq!(reorganize(&mut doc), 1);
    assert_eq!(doc.text(), "class A\n{\n    void Alpha() { }\n    void Zeta() { }\n}\n");
}

#[test]
fn test_crlf_moves_keep_crlf() {
    let mut doc = Document::new(UNORDERED.replace('\n', "\r\n"));

    assert_eq!(reorganize(&mut doc), 2);
    assert_eq!(
        doc.text(),
        concat!(
            "class A\r\n{\r\n    private int a;\r\n\r\n",
            "    public void Alpha() { }\r\n\r\n",
            "    public void Zeta() { }\r\n}\r\n",
        )
    );
}
