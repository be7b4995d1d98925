//! Nesting a flat item list into a tree by span containment.
//!
//! The parser hands over items in no particular nesting order. Sorting by start offset and
//! walking with an explicit stack recovers the source nesting in one pass: each item is pushed
//! once and popped at most once.

use crate::item::{Kind, StructuralItem};

#[derive(Clone, Debug)]
/// An item together with the items nested inside it, in source order.
pub struct ItemNode {
    /// The item itself.
    pub item: StructuralItem,
    /// Directly nested items.
    pub children: Vec<ItemNode>,
}

impl ItemNode {
    #[must_use]
    /// A node without children.
    pub fn leaf(item: StructuralItem) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    #[must_use]
    /// Shorthand for the item's kind.
    pub fn kind(&self) -> Kind {
        self.item.kind
    }

    /// Visits this node and its descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ItemNode, usize)) {
        fn go<'a>(node: &'a ItemNode, depth: usize, visit: &mut impl FnMut(&'a ItemNode, usize)) {
            visit(node, depth);
            for child in &node.children {
                go(child, depth + 1, visit);
            }
        }
        go(self, 0, visit);
    }
}

#[must_use]
/// Flattens a forest back to pre-order, pairing every item with its depth.
pub fn flatten(forest: &[ItemNode]) -> Vec<(&StructuralItem, usize)> {
    let mut flat = Vec::new();
    for root in forest {
        root.walk(&mut |node, depth| flat.push((&node.item, depth)));
    }
    flat
}

#[derive(Clone, Copy, Debug, Default)]
/// Builds item trees from flat, span-annotated lists.
pub struct TreeBuilder;

impl TreeBuilder {
    #[must_use]
    /// Nests `items` by offset containment.
    ///
    /// An item nests under the top of the stack when it ends strictly before it and the top can
    /// own children. A region that would land inside a member that cannot (a method body) is
    /// dropped. Anything else pops the stack and retries; an empty stack makes a new root.
    pub fn build(self, items: Vec<StructuralItem>) -> Vec<ItemNode> {
        let mut items = items;
        items.sort_by_key(StructuralItem::start_offset);

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
        let mut roots = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        for index in 0..items.len() {
            loop {
                let Some(&top) = stack.last() else {
                    roots.push(index);
                    stack.push(index);
                    break;
                };

                if items[index].end_offset() < items[top].end_offset() {
                    if items[top].kind.is_parent_capable() {
                        children[top].push(index);
                        stack.push(index);
                        break;
                    }

                    if items[index].kind == Kind::Region {
                        log::debug!(
                            "Dropping region '{}' nested in non-parent '{}'",
                            items[index].name,
                            items[top].name
                        );
                        break;
                    }
                }

                stack.pop();
            }
        }

        let mut slots: Vec<Option<StructuralItem>> = items.into_iter().map(Some).collect();
        roots
            .into_iter()
            .filter_map(|root| assemble(root, &mut slots, &children))
            .collect()
    }
}

fn assemble(
    index: usize,
    slots: &mut [Option<StructuralItem>],
    children: &[Vec<usize>],
) -> Option<ItemNode> {
    let item = slots[index].take()?;
    let nested = children[index]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(ItemNode {
        item,
        children: nested,
    })
}

#[cfg(test)]
#[path = "tests/tree.rs"]
mod tests;
