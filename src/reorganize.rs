//! Moving members into canonical order with as few edits as possible.
//!
//! Each level of the tree is sorted by selection: walk the desired order and, whenever the item
//! that belongs at position `i` is somewhere else, cut its block and paste it above the item
//! currently at `i`. Items already in place cost nothing, so `n` siblings take at most `n - 1`
//! moves and an ordered level takes none.
//!
//! Every block is anchored before the first edit. Cutting and pasting carries the anchors inside
//! the block along, so offsets of items not yet visited stay correct however much text moves
//! around them.

use std::collections::HashSet;

use log::{debug, info};

use crate::blank_lines::BlankLineService;
use crate::buffer::{indentation, is_blank, Bias, BufferError, TextBuffer};
use crate::item::{Kind, StructuralItem};
use crate::layout::{self, TrackedRange};
use crate::order::OrderPolicy;
use crate::tree::ItemNode;

struct Placed {
    item: StructuralItem,
    block: TrackedRange,
    own: TrackedRange,
    region: Option<TrackedRange>,
    children: Vec<Placed>,
}

impl Placed {
    fn new<B: TextBuffer + ?Sized>(buffer: &mut B, node: ItemNode) -> Self {
        let block = TrackedRange::new(buffer, layout::block_range(&*buffer, &node.item));
        let own = TrackedRange::new(buffer, node.item.start_offset()..node.item.end_offset());
        let region = node
            .item
            .live_region()
            .map(|region| region.span.start_offset..region.span.end_offset)
            .map(|range| TrackedRange::new(buffer, range));
        let children = node
            .children
            .into_iter()
            .map(|child| Self::new(buffer, child))
            .collect();
        Self {
            item: node.item,
            block,
            own,
            region,
            children,
        }
    }

    fn into_node<B: TextBuffer + ?Sized>(self, buffer: &B) -> ItemNode {
        let mut item = self.item;
        item.span = self.own.span(buffer);
        if let (Some(region), Some(tracked)) = (item.associated_region.as_mut(), self.region) {
            region.span = tracked.span(buffer);
        }
        ItemNode {
            item,
            children: self
                .children
                .into_iter()
                .map(|child| child.into_node(buffer))
                .collect(),
        }
    }
}

/// Attributes that pin the member order of the type carrying them, unless configured otherwise.
pub const DEFAULT_ORDER_CRITICAL_ATTRIBUTES: &[&str] = &["StructLayout", "ComImport"];

#[must_use]
/// [`DEFAULT_ORDER_CRITICAL_ATTRIBUTES`] as owned strings.
pub fn default_order_critical_attributes() -> Vec<String> {
    DEFAULT_ORDER_CRITICAL_ATTRIBUTES
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[derive(Clone, Debug)]
/// Reorders sibling members to match an [`OrderPolicy`].
pub struct Reorganizer {
    policy: OrderPolicy,
    order_critical_attributes: Vec<String>,
}

impl Reorganizer {
    #[must_use]
    /// A reorganizer ordering by `policy`, with the default order-critical attributes.
    pub fn new(policy: OrderPolicy) -> Self {
        Self {
            policy,
            order_critical_attributes: default_order_critical_attributes(),
        }
    }

    #[must_use]
    /// Replaces the attributes that pin a type's member order.
    pub fn with_order_critical_attributes(mut self, attributes: Vec<String>) -> Self {
        self.order_critical_attributes = attributes;
        self
    }

    #[must_use]
    /// Whether the members of `item` must keep their declared order.
    ///
    /// Enum members are load-bearing by position, and so are the fields of types whose layout is
    /// fixed by an attribute.
    pub fn is_exempt(&self, item: &StructuralItem) -> bool {
        item.kind == Kind::Enum
            || item.attributes.iter().any(|attribute| {
                let attribute = normalize_attribute(attribute);
                self.order_critical_attributes
                    .iter()
                    .any(|critical| normalize_attribute(critical) == attribute)
            })
    }

    /// Moves members of `forest` into canonical order, returning the number of moves made.
    ///
    /// On return every node's span reflects the edited text and siblings are in their new order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing buffer edit; rolling back is left to the enclosing undo scope.
    pub fn reorganize<B: TextBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        forest: &mut Vec<ItemNode>,
    ) -> Result<usize, BufferError> {
        let mut placed: Vec<Placed> = std::mem::take(forest)
            .into_iter()
            .map(|node| Placed::new(buffer, node))
            .collect();

        let newline = buffer.line_ending();
        let mut moves = 0;
        let result = self.reorder(buffer, &mut placed, &mut moves, newline);
        *forest = placed
            .into_iter()
            .map(|node| node.into_node(&*buffer))
            .collect();
        result?;

        info!(moves; "Reorganized members");
        Ok(moves)
    }

    fn reorder<B: TextBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        siblings: &mut [Placed],
        moves: &mut usize,
        newline: &str,
    ) -> Result<(), BufferError> {
        let mut seen = HashSet::new();
        let mut current: Vec<usize> = (0..siblings.len())
            .filter(|&index| siblings[index].item.kind != Kind::Region)
            .filter(|&index| seen.insert(buffer.resolve(siblings[index].block.start())))
            .collect();
        current.sort_by_key(|&index| buffer.resolve(siblings[index].block.start()));

        let mut desired = current.clone();
        desired.sort_by(|&x, &y| self.policy.compare(&siblings[x].item, &siblings[y].item));

        for (desired_index, &index) in desired.iter().enumerate() {
            let item = &siblings[index].item;
            if item.kind.is_parent_capable() && !self.is_exempt(item) {
                let mut children = std::mem::take(&mut siblings[index].children);
                let result = self.reorder(buffer, &mut children, moves, newline);
                siblings[index].children = children;
                result?;
            }

            let Some(current_index) = current.iter().position(|&other| other == index) else {
                continue;
            };
            if current_index == desired_index {
                continue;
            }

            let base = current[desired_index];
            self.move_above(buffer, siblings, index, base, newline)?;
            *moves += 1;

            current.remove(current_index);
            let target = if desired_index > current_index {
                desired_index - 1
            } else {
                desired_index
            };
            current.insert(target, index);
        }

        siblings.sort_by_key(|sibling| buffer.resolve(sibling.block.start()));
        Ok(())
    }

    fn move_above<B: TextBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        siblings: &[Placed],
        index: usize,
        base: usize,
        newline: &str,
    ) -> Result<(), BufferError> {
        let (moved, base) = (&siblings[index], &siblings[base]);
        let blank_lines = BlankLineService;

        // The moved block lands on a line of its own above the base.
        let base_start = buffer.resolve(base.block.start());
        if !layout::starts_line(&*buffer, base_start) {
            let indent = layout::member_indent(&*buffer, base_start);
            layout::break_line(buffer, base_start, &indent, newline)?;
        }
        let target = buffer.line_start(buffer.resolve(base.block.start()));

        let mut block = moved.block.range(&*buffer);
        if layout::starts_line(&*buffer, block.start) {
            block.start = buffer.line_start(block.start);
            if block.end != buffer.line_start(block.end) && layout::ends_line(&*buffer, block.end) {
                block.end = buffer.next_line_start(block.end);
            }
        }
        let owns_start = block.start == buffer.line_start(block.start);
        let owns_end = block.end == buffer.line_start(block.end) || block.end == buffer.len();

        let separate = blank_lines.should_be_followed_by_blank_line(&moved.item)
            || blank_lines.should_be_preceded_by_blank_line(&base.item)
            || blank_line_above(&*buffer, target)
            || blank_line_above(&*buffer, block.start)
            || blank_line_at(&*buffer, block.end);
        let indent = layout::indent_at(&*buffer, target);

        let cursor = buffer.cursor();
        let mark = (block.start <= cursor && cursor < block.end)
            .then(|| buffer.anchor(cursor, Bias::Right));

        debug!(
            item = moved.item.name.as_str(), above = base.item.name.as_str();
            "Moving member"
        );
        let mut clip = buffer.cut(block.clone())?;
        if owns_start && owns_end {
            layout::tidy_gap(buffer, block.start, newline)?;
        } else if owns_start {
            // Code that followed the member on its line keeps the line, at the member's indent.
            let rest = indentation(&buffer.text()[block.start..]).len();
            let lead = indentation(clip.text());
            let lead = if buffer.text()[block.start + rest..].starts_with('}') {
                layout::outdent(lead)
            } else {
                lead
            };
            buffer.delete(block.start..block.start + rest)?;
            buffer.insert(block.start, lead)?;
        }
        clip.ensure_trailing_newline(newline);
        if separate {
            clip.append(newline);
        }

        let target = buffer.line_start(buffer.resolve(base.block.start()));
        let pasted = buffer.paste(target, clip)?;
        buffer.reformat(pasted, &indent)?;

        if let Some(mark) = mark {
            let cursor = buffer.resolve(mark);
            buffer.move_cursor(cursor);
        }
        Ok(())
    }
}

/// Whether the line before the line start `offset` is blank.
fn blank_line_above<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> bool {
    offset > 0
        && offset == buffer.line_start(offset)
        && is_blank(&buffer.text()[buffer.line_start(offset - 1)..offset])
}

/// Whether the line starting at `offset` is blank.
fn blank_line_at<B: TextBuffer + ?Sized>(buffer: &B, offset: usize) -> bool {
    offset < buffer.len()
        && offset == buffer.line_start(offset)
        && is_blank(&buffer.text()[offset..buffer.line_end(offset)])
}

/// Attribute name without namespace qualifier or `Attribute` suffix.
fn normalize_attribute(name: &str) -> &str {
    let name = name.rsplit(['.', ':']).next().unwrap_or(name).trim();
    name.strip_suffix("Attribute")
        .filter(|stripped| !stripped.is_empty())
        .unwrap_or(name)
}

#[cfg(test)]
#[path = "tests/reorganize.rs"]
mod tests;
