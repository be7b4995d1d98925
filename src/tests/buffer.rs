use super::{indentation, is_blank, Bias, BufferError, Document, TextBuffer};

#[test]
fn test_insert_shifts_anchors_by_bias() {
    let mut doc = Document::new("abcdef");
    let left = doc.anchor(3, Bias::Left);
    let right = doc.anchor(3, Bias::Right);
    let before = doc.anchor(1, Bias::Right);
    let after = doc.anchor(5, Bias::Left);

    doc.insert(3, "XY").unwrap();

    assert_eq!(doc.text(), "abcXYdef");
    assert_eq!(doc.resolve(left), 3);
    assert_eq!(doc.resolve(right), 5);
    assert_eq!(doc.resolve(before), 1);
    assert_eq!(doc.resolve(after), 7);
}

#[test]
fn test_delete_collapses_anchors_inside() {
    let mut doc = Document::new("abcdef");
    let inside = doc.anchor(3, Bias::Right);
    let after = doc.anchor(5, Bias::Left);

    let removed = doc.delete(2..4).unwrap();

    assert_eq!(removed, "cd");
    assert_eq!(doc.text(), "abef");
    assert_eq!(doc.resolve(inside), 2);
    assert_eq!(doc.resolve(after), 3);
}

#[test]
fn test_cut_and_paste_carry_anchors() {
    let mut doc = Document::new("abcdef");
    let first = doc.anchor(2, Bias::Left);
    let second = doc.anchor(4, Bias::Right);

    let clip = doc.cut(1..5).unwrap();
    assert_eq!(clip.text(), "bcde");
    assert_eq!(doc.text(), "af");

    let pasted = doc.paste(2, clip).unwrap();
    assert_eq!(pasted, 2..6);
    assert_eq!(doc.text(), "afbcde");
    assert_eq!(doc.resolve(first), 3);
    assert_eq!(doc.resolve(second), 5);
}

#[test]
fn test_cut_edges_follow_bias() {
    let mut doc = Document::new("abcdef");
    let start_right = doc.anchor(1, Bias::Right);
    let start_left = doc.anchor(1, Bias::Left);
    let end_left = doc.anchor(3, Bias::Left);
    let end_right = doc.anchor(3, Bias::Right);

    let clip = doc.cut(1..3).unwrap();
    doc.paste(4, clip).unwrap();

    assert_eq!(doc.text(), "adefbc");
    assert_eq!(doc.resolve(start_right), 4);
    assert_eq!(doc.resolve(end_left), 6);
    assert_eq!(doc.resolve(start_left), 1);
    assert_eq!(doc.resolve(end_right), 1);
}

#[test]
fn test_clip_append_and_trailing_newline() {
    let mut doc = Document::new("int a;");
    let mut clip = doc.cut(0..6).unwrap();

    clip.ensure_trailing_newline("\n");
    clip.ensure_trailing_newline("\n");
    clip.append("\n");

    assert_eq!(clip.text(), "int a;\n\n");
}

#[test]
fn test_line_ending_follows_first_line() {
    assert_eq!(Document::new("int a;\r\nint b;\n").line_ending(), "\r\n");
    assert_eq!(Document::new("int a;\nint b;\r\n").line_ending(), "\n");
    assert_eq!(Document::new("int a;").line_ending(), "\n");

    let mut doc = Document::new("int a;\r\n");
    let mut clip = doc.cut(0..6).unwrap();
    clip.ensure_trailing_newline(doc.line_ending());
    assert_eq!(clip.text(), "int a;\r\n");
}

#[test]
fn test_cursor_follows_edits() {
    let mut doc = Document::new("hello world");
    doc.move_cursor(6);

    doc.insert(0, ">> ").unwrap();
    assert_eq!(doc.cursor(), 9);

    doc.delete(0..3).unwrap();
    assert_eq!(doc.cursor(), 6);

    doc.delete(4..8).unwrap();
    assert_eq!(doc.cursor(), 4);

    doc.move_cursor(100);
    assert_eq!(doc.cursor(), doc.len());
}

#[test]
fn test_line_helpers() {
    let doc = Document::new("one\ntwo\nthree\n");

    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_of(5), 1);
    assert_eq!(doc.line_start(6), 4);
    assert_eq!(doc.line_end(4), 7);
    assert_eq!(doc.next_line_start(4), 8);
    assert_eq!(doc.next_line_start(10), 14);
    assert_eq!(doc.offset_of_line(2), Some(8));
    assert_eq!(doc.offset_of_line(3), None);
    assert_eq!(doc.line_text(1), Some("two"));

    assert_eq!(Document::new("a\nb").line_count(), 2);
    assert_eq!(Document::new("").line_count(), 0);
}

#[test]
fn test_delete_line_removes_line_break() {
    let mut doc = Document::new("one\ntwo\nthree\n");

    let removed = doc.delete_line(5).unwrap();

    assert_eq!(removed, "two\n");
    assert_eq!(doc.text(), "one\nthree\n");
}

#[test]
fn test_reformat_shifts_nested_lines_together() {
    let text = "  void Go()\n  {\n    Run();\n\n  }\n";
    let mut doc = Document::new(text);

    doc.reformat(0..text.len(), "    ").unwrap();

    assert_eq!(doc.text(), "    void Go()\n    {\n      Run();\n\n    }\n");
}

#[test]
fn test_reformat_is_noop_when_indent_matches() {
    let text = "    int a;\n    int b;\n";
    let mut doc = Document::new(text);
    let start = doc.anchor(0, Bias::Right);

    doc.reformat(0..text.len(), "    ").unwrap();

    assert_eq!(doc.text(), text);
    assert_eq!(doc.resolve(start), 0);
}

#[test]
fn test_reformat_keeps_line_start_anchor_before_text() {
    let mut doc = Document::new("int a;\nint b;\n");
    let start = doc.anchor(7, Bias::Right);

    doc.reformat(7..14, "    ").unwrap();

    assert_eq!(doc.text(), "int a;\n    int b;\n");
    assert_eq!(doc.resolve(start), 7);
}

#[test]
fn test_invalid_offsets_are_rejected() {
    let mut doc = Document::new("é");

    assert_eq!(
        doc.insert(5, "x"),
        Err(BufferError::OutOfBounds { offset: 5, len: 2 })
    );
    assert_eq!(
        doc.insert(1, "x"),
        Err(BufferError::NotCharBoundary { offset: 1 })
    );
    assert!(matches!(doc.delete(2..0), Err(BufferError::Rejected(_))));
    assert_eq!(doc.text(), "é");
}

#[test]
fn test_undo_scope_reverts_on_abort() {
    let mut doc = Document::new("abc");
    let anchor = doc.anchor(2, Bias::Left);

    assert!(doc.begin_undo("Clean up"));
    assert!(!doc.begin_undo("Nested"));
    assert_eq!(doc.undo_scope(), Some("Clean up"));

    doc.insert(0, "xyz").unwrap();
    doc.move_cursor(1);
    doc.abort_undo();

    assert_eq!(doc.text(), "abc");
    assert_eq!(doc.cursor(), 0);
    assert_eq!(doc.resolve(anchor), 2);
    assert_eq!(doc.undo_scope(), None);
}

#[test]
fn test_undo_scope_keeps_edits_on_end() {
    let mut doc = Document::new("abc");

    assert!(doc.begin_undo("Clean up"));
    doc.insert(3, "d").unwrap();
    doc.end_undo();
    doc.abort_undo();

    assert_eq!(doc.into_text(), "abcd");
}

#[test]
fn test_blank_and_indentation() {
    assert!(is_blank("   \t\n"));
    assert!(!is_blank("  x"));
    assert_eq!(indentation("\t  int a;"), "\t  ");
    assert_eq!(indentation("int a;"), "");
}
