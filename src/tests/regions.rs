use super::{attach, close_marker, is_marker, marker, open_marker, scan, Marker};
use crate::item::{Kind, Parameter, Span, StructuralItem};

#[test]
fn test_marker_classification() {
    assert_eq!(marker("#region Fields"), Some(Marker::Open("Fields".to_string())));
    assert_eq!(
        marker("    #Region \"My Name\"\r"),
        Some(Marker::Open("My Name".to_string()))
    );
    assert_eq!(marker("\t#REGION"), Some(Marker::Open(String::new())));
    assert_eq!(marker("    #endregion"), Some(Marker::Close));
    assert_eq!(marker("#endregion // Fields"), Some(Marker::Close));
    assert_eq!(marker("#End Region"), Some(Marker::Close));

    assert_eq!(marker("#regional"), None);
    assert_eq!(marker("// #region Fields"), None);
    assert!(!is_marker("int region;"));
    assert!(is_marker("  #region"));
}

#[test]
fn test_close_keywords_match_in_any_case() {
    assert_eq!(marker("#EndRegion"), Some(Marker::Close));
    assert_eq!(marker("#ENDREGION"), Some(Marker::Close));
    assert_eq!(marker("  #EndRegion // Fields"), Some(Marker::Close));
    assert_eq!(marker("#end region"), Some(Marker::Close));
    assert_eq!(marker("#ENDREGIONS"), None);

    let text = "#REGION Outer\n#Region Inner\nint a;\n#EndRegion\n#ENDREGION\n";
    let regions = scan(text);
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].name, "Outer");
    assert_eq!(regions[0].span.end_offset, text.len() - 1);
}

#[test]
fn test_scan_pairs_nested_markers() {
    let text = "#region Outer\n#region Inner\nint a;\n#endregion\n#endregion\n";
    let regions = scan(text);

    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].name, "Outer");
    assert_eq!(regions[1].name, "Inner");

    let inner = &regions[1].span;
    assert_eq!(&text[inner.start_offset..inner.end_offset], "#region Inner\nint a;\n#endregion");
    assert_eq!((inner.start_line, inner.end_line), (1, 3));

    let outer = &regions[0].span;
    assert_eq!(outer.start_offset, 0);
    assert_eq!(outer.end_offset, text.len() - 1);
    assert!(outer.contains(inner));
}

#[test]
fn test_scan_handles_crlf() {
    let text = "#region A\r\nint a;\r\n#endregion\r\n";
    let regions = scan(text);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].name, "A");
    assert!(text[..regions[0].span.end_offset].ends_with("#endregion"));
}

#[test]
fn test_stray_end_discards_all_regions() {
    let text = "#region A\n#endregion\n#endregion\n";

    assert!(scan(text).is_empty());
}

#[test]
fn test_unclosed_region_is_ignored() {
    let text = "#region Open\n#region Closed\n#endregion\n";
    let regions = scan(text);

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].name, "Closed");
}

#[test]
fn test_marker_lines() {
    assert_eq!(open_marker("    ", "Methods"), "    #region Methods");
    assert_eq!(open_marker("", ""), "#region");
    assert_eq!(close_marker("\t"), "\t#endregion");
}

#[test]
fn test_attach_matches_member_by_name_or_signature() {
    let text = "#region Go(int)\nvoid Go(int x) { }\n#endregion\n\
                #region Helpers\nvoid Run() { }\n#endregion\n";
    let go_start = text.find("void Go").unwrap();
    let run_start = text.find("void Run").unwrap();

    let mut go = StructuralItem::new(
        Kind::Method,
        "Go",
        Span::from_offsets(text, go_start, go_start + "void Go(int x) { }".len()),
    );
    go.parameters.push(Parameter {
        name: "x".to_string(),
        type_name: "int".to_string(),
    });
    let run = StructuralItem::new(
        Kind::Method,
        "Run",
        Span::from_offsets(text, run_start, run_start + "void Run() { }".len()),
    );

    let mut items = vec![go, run];
    attach(&mut items, scan(text));

    assert_eq!(items.len(), 3);
    assert_eq!(
        items[0].live_region().map(|region| region.name.as_str()),
        Some("Go(int)")
    );
    assert!(items[1].associated_region.is_none());
    assert_eq!(items[2].kind, Kind::Region);
    assert_eq!(items[2].name, "Helpers");
    assert!(items[2].span.contains(&items[1].span));
}

#[test]
fn test_attach_requires_containment() {
    let text = "#region Go\n#endregion\nvoid Go() { }\n";
    let start = text.find("void").unwrap();
    let go = StructuralItem::new(
        Kind::Method,
        "Go",
        Span::from_offsets(text, start, text.len() - 1),
    );

    let mut items = vec![go];
    attach(&mut items, scan(text));

    assert!(items[0].associated_region.is_none());
    assert_eq!(items[1].kind, Kind::Region);
}
