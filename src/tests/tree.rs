use super::{flatten, ItemNode, TreeBuilder};
use crate::item::{Kind, Span, StructuralItem};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn item(kind: Kind, name: &str, start: usize, end: usize) -> StructuralItem {
    StructuralItem::new(
        kind,
        name,
        Span {
            start_offset: start,
            end_offset: end,
            ..Span::default()
        },
    )
}

fn names(forest: &[ItemNode]) -> Vec<(String, usize)> {
    flatten(forest)
        .into_iter()
        .map(|(item, depth)| (item.name.clone(), depth))
        .collect()
}

#[test]
fn test_nests_members_in_class() {
    let items = vec![
        item(Kind::Method, "Go", 20, 30),
        item(Kind::Class, "Widget", 5, 100),
        item(Kind::Field, "count", 10, 15),
        item(Kind::Namespace, "App", 0, 200),
    ];

    let forest = TreeBuilder.build(items);

    assert_eq!(forest.len(), 1);
    assert_eq!(
        names(&forest),
        [
            ("App".to_string(), 0),
            ("Widget".to_string(), 1),
            ("count".to_string(), 2),
            ("Go".to_string(), 2),
        ]
    );
}

#[test]
fn test_siblings_become_roots() {
    let items = vec![
        item(Kind::Class, "A", 0, 10),
        item(Kind::Class, "B", 20, 30),
    ];

    let forest = TreeBuilder.build(items);

    assert_eq!(forest.len(), 2);
    assert!(forest.iter().all(|node| node.children.is_empty()));
}

#[test]
fn test_region_inside_method_is_dropped() {
    let items = vec![
        item(Kind::Class, "Widget", 0, 100),
        item(Kind::Method, "Go", 10, 60),
        item(Kind::Region, "Inner", 20, 40),
        item(Kind::Method, "Stop", 70, 90),
    ];

    let forest = TreeBuilder.build(items);

    assert_eq!(
        names(&forest),
        [
            ("Widget".to_string(), 0),
            ("Go".to_string(), 1),
            ("Stop".to_string(), 1),
        ]
    );
}

#[test]
fn test_region_owns_wrapped_members() {
    let items = vec![
        item(Kind::Class, "Widget", 0, 100),
        item(Kind::Region, "Methods", 10, 80),
        item(Kind::Method, "Go", 20, 40),
        item(Kind::Method, "Stop", 50, 70),
    ];

    let forest = TreeBuilder.build(items);
    let region = &forest[0].children[0];

    assert_eq!(region.kind(), Kind::Region);
    assert_eq!(region.children.len(), 2);
}

#[test]
fn test_member_after_leaf_is_not_nested_in_it() {
    let items = vec![
        item(Kind::Class, "Widget", 0, 100),
        item(Kind::Method, "Go", 10, 60),
        item(Kind::Field, "inner", 20, 30),
    ];

    let forest = TreeBuilder.build(items);

    assert_eq!(forest[0].children.len(), 2);
    assert!(forest[0].children.iter().all(|node| node.children.is_empty()));
}

#[test]
fn test_empty_input() {
    assert!(TreeBuilder.build(Vec::new()).is_empty());
}

// ===================
// Proptest Strategies
// ===================

/// Items with properly nested spans, built from a stream of open (`true`) and close (`false`)
/// events, paired with the depth each one is expected at. Items are returned in start order.
fn nested_items(events: &[bool]) -> (Vec<StructuralItem>, Vec<usize>) {
    let mut items = Vec::new();
    let mut depths = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut position = 0;

    for &opens in events {
        position += 1;
        if opens {
            depths.push(open.len());
            open.push(items.len());
            items.push(item(Kind::Class, &format!("n{}", items.len()), position, 0));
        } else if let Some(index) = open.pop() {
            items[index].span.end_offset = position;
        }
    }
    while let Some(index) = open.pop() {
        position += 1;
        items[index].span.end_offset = position;
    }
    (items, depths)
}

fn span_contains_descendants(node: &ItemNode) -> bool {
    node.children.iter().all(|child| {
        node.item.span.contains(&child.item.span) && span_contains_descendants(child)
    })
}

// ===================
// Property Checks
// ===================

/// Flattening the built forest yields start order with containment depths.
fn check_flatten_matches_nesting(events: &[bool], rotate: usize) -> Result<(), TestCaseError> {
    let (items, depths) = nested_items(events);
    let expected: Vec<(String, usize)> = items
        .iter()
        .map(|item| item.name.clone())
        .zip(depths)
        .collect();

    let mut shuffled = items;
    if !shuffled.is_empty() {
        let by = rotate % shuffled.len();
        shuffled.rotate_left(by);
    }

    let forest = TreeBuilder.build(shuffled);
    prop_assert_eq!(names(&forest), expected);
    Ok(())
}

/// Every parent's span contains every descendant's span.
fn check_parents_contain_children(events: &[bool]) -> Result<(), TestCaseError> {
    let (items, _) = nested_items(events);
    let forest = TreeBuilder.build(items);

    prop_assert!(forest.iter().all(span_contains_descendants));
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn flatten_matches_nesting(
        events in prop::collection::vec(any::<bool>(), 0..64),
        rotate in 0usize..64
    ) {
        check_flatten_matches_nesting(&events, rotate)?;
    }

    #[test]
    fn parents_contain_children(events in prop::collection::vec(any::<bool>(), 0..64)) {
        check_parents_contain_children(&events)?;
    }
}
