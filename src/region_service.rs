//! Removing the regions a file has and adding the ones it should have.
//!
//! Regions are derived from the member layout, so a pass strips every existing marker pair
//! before reorganizing and synthesizes a fresh set afterwards:
//!
//! - overloads and multi-line properties get one region per member (overloads named by their
//!   signature), and adjacent overloads are wrapped again in a `Name...` region;
//! - runs of fields, constructors, methods, properties and tests get a block region;
//! - every class, struct or interface directly in a namespace gets a `: Name :` region.
//!
//! Inner regions are written before the ones enclosing them. Anchors keep every planned range
//! valid while markers are inserted around it.

use log::{debug, info};

use crate::buffer::{is_blank, Anchor, Bias, BufferError, TextBuffer};
use crate::item::{Kind, RegionMarker, StructuralItem};
use crate::layout::{self, TrackedRange};
use crate::regions;
use crate::tree::ItemNode;

const CLASS_VARIABLES: &str = "Class Variables";

struct Slot {
    item: StructuralItem,
    own: TrackedRange,
    outer_start: Anchor,
    outer_end: Anchor,
    region: Option<(String, TrackedRange)>,
    children: Vec<Slot>,
}

impl Slot {
    fn new<B: TextBuffer + ?Sized>(buffer: &mut B, node: ItemNode) -> Self {
        let block = layout::block_range(&*buffer, &node.item);
        let own = TrackedRange::new(buffer, node.item.start_offset()..node.item.end_offset());
        let outer_start = buffer.anchor(block.start, Bias::Right);
        let outer_end = buffer.anchor(block.end, Bias::Left);
        let children = node
            .children
            .into_iter()
            .map(|child| Self::new(buffer, child))
            .collect();
        Self {
            item: node.item,
            own,
            outer_start,
            outer_end,
            region: None,
            children,
        }
    }

    fn into_node<B: TextBuffer + ?Sized>(
        self,
        buffer: &B,
        added: &mut Vec<RegionMarker>,
    ) -> ItemNode {
        let mut item = self.item;
        item.span = self.own.span(buffer);
        if let Some((name, tracked)) = self.region {
            let region = RegionMarker {
                name,
                span: tracked.span(buffer),
                is_invalidated: false,
            };
            added.push(region.clone());
            item.associated_region = Some(region);
        }
        ItemNode {
            item,
            children: self
                .children
                .into_iter()
                .map(|child| child.into_node(buffer, added))
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Strips and synthesizes region markers.
pub struct RegionService;

impl RegionService {
    /// Deletes the markers of every region in `items`: standalone regions and regions matched
    /// to members alike. Regions are removed bottom-up, each taking any blank line its markers
    /// leave behind. Returns the remaining items with spans moved to the edited text and
    /// member regions marked invalidated.
    ///
    /// # Errors
    ///
    /// Propagates buffer failures.
    pub fn cleanup_existing_regions<B: TextBuffer + ?Sized>(
        self,
        buffer: &mut B,
        items: Vec<StructuralItem>,
    ) -> Result<Vec<StructuralItem>, BufferError> {
        let tracked: Vec<TrackedRange> = items
            .iter()
            .map(|item| TrackedRange::new(buffer, item.start_offset()..item.end_offset()))
            .collect();

        let mut targets: Vec<(usize, String, TrackedRange)> = Vec::new();
        for item in &items {
            let marker = if item.kind == Kind::Region {
                (!item.is_invalidated && !item.is_pseudo_group).then(|| item.as_region_marker())
            } else {
                item.live_region().cloned()
            };
            if let Some(marker) = marker {
                let range = marker.span.start_offset..marker.span.end_offset;
                let tracked = TrackedRange::new(buffer, range);
                targets.push((marker.span.start_offset, marker.name, tracked));
            }
        }
        targets.sort_by(|x, y| y.0.cmp(&x.0));

        let newline = buffer.line_ending();
        for (_, name, range) in &targets {
            debug!(region = name.as_str(); "Removing region");
            remove_markers(buffer, *range, newline)?;
        }
        info!(removed = targets.len(); "Cleaned up existing regions");

        Ok(items
            .into_iter()
            .zip(tracked)
            .filter(|(item, _)| item.kind != Kind::Region)
            .map(|(mut item, range)| {
                item.span = range.span(&*buffer);
                if let Some(region) = item.associated_region.as_mut() {
                    region.is_invalidated = true;
                }
                item
            })
            .collect())
    }

    /// Writes the regions the members of `forest` should have and records member regions as
    /// their `associated_region`. Returns every region written, with its final span.
    ///
    /// # Errors
    ///
    /// Propagates buffer failures.
    pub fn add_required_regions<B: TextBuffer + ?Sized>(
        self,
        buffer: &mut B,
        forest: &mut Vec<ItemNode>,
    ) -> Result<Vec<RegionMarker>, BufferError> {
        let mut slots: Vec<Slot> = std::mem::take(forest)
            .into_iter()
            .map(|node| Slot::new(buffer, node))
            .collect();

        let mut groups = Vec::new();
        let newline = buffer.line_ending();
        let result = add_level(buffer, Kind::Namespace, &mut slots, &mut groups, newline);

        let mut added = Vec::new();
        *forest = slots
            .into_iter()
            .map(|slot| slot.into_node(&*buffer, &mut added))
            .collect();
        result?;

        for (name, tracked) in groups {
            added.push(RegionMarker {
                name,
                span: tracked.span(&*buffer),
                is_invalidated: false,
            });
        }
        added.sort_by_key(|region| region.span.start_offset);
        info!(added = added.len(); "Added required regions");
        Ok(added)
    }
}

fn remove_markers<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    range: TrackedRange,
    newline: &str,
) -> Result<(), BufferError> {
    let close = buffer.line_start(range.range(&*buffer).end);
    if regions::is_marker(&buffer.text()[close..buffer.line_end(close)]) {
        buffer.delete_line(close)?;
        layout::tidy_gap(buffer, close, newline)?;
    }

    let open = buffer.line_start(range.range(&*buffer).start);
    if regions::is_marker(&buffer.text()[open..buffer.line_end(open)]) {
        buffer.delete_line(open)?;
        layout::tidy_gap(buffer, open, newline)?;
    }
    Ok(())
}

fn is_regioned_member(slot: &Slot) -> bool {
    match slot.item.kind {
        Kind::Method | Kind::TestMethod => true,
        Kind::Property => slot.item.is_multiline(),
        _ => false,
    }
}

fn block_name(parent: Kind, kind: Kind) -> Option<&'static str> {
    match kind {
        Kind::Field | Kind::Constant if matches!(parent, Kind::Class | Kind::Struct) => {
            Some(CLASS_VARIABLES)
        }
        Kind::Constructor => Some("Constructors"),
        Kind::Method => Some("Methods"),
        Kind::Property => Some("Properties"),
        Kind::TestMethod => Some("Tests"),
        _ => None,
    }
}

/// Maximal runs of adjacent indices.
fn runs(indices: &[usize]) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &index in indices {
        match runs.last_mut() {
            Some((_, last)) if *last + 1 == index => *last = index,
            _ => runs.push((index, index)),
        }
    }
    runs
}

fn add_level<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    parent: Kind,
    slots: &mut [Slot],
    groups: &mut Vec<(String, TrackedRange)>,
    newline: &str,
) -> Result<(), BufferError> {
    for slot in slots.iter_mut() {
        if slot.item.kind.is_parent_capable() && !slot.children.is_empty() {
            add_level(buffer, slot.item.kind, &mut slot.children, groups, newline)?;
        }
    }

    if parent != Kind::Interface {
        let mut by_name: Vec<((Kind, String), Vec<usize>)> = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            if !is_regioned_member(slot) {
                continue;
            }
            let key = (slot.item.kind, slot.item.name.clone());
            match by_name.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, members)) => members.push(index),
                None => by_name.push((key, vec![index])),
            }
        }

        for ((_, name), members) in &by_name {
            let overloaded = members.len() > 1;
            for &index in members {
                let region_name = if overloaded {
                    slots[index].item.signature()
                } else {
                    name.clone()
                };
                let tracked = wrap(buffer, &mut slots[index..=index], &region_name, newline)?;
                slots[index].region = Some((region_name, tracked));
            }
            if overloaded {
                for (first, last) in runs(members) {
                    if first < last {
                        let group = format!("{name}...");
                        let tracked = wrap(buffer, &mut slots[first..=last], &group, newline)?;
                        groups.push((group, tracked));
                    }
                }
            }
        }
    }

    let mut start = 0;
    while start < slots.len() {
        let mut end = start;
        let Some(name) = block_name(parent, slots[start].item.kind) else {
            start += 1;
            continue;
        };
        while end + 1 < slots.len() && block_name(parent, slots[end + 1].item.kind) == Some(name) {
            end += 1;
        }
        let tracked = wrap(buffer, &mut slots[start..=end], name, newline)?;
        groups.push((name.to_string(), tracked));
        start = end + 1;
    }

    if parent == Kind::Namespace {
        for slot in slots.iter_mut() {
            if slot.item.kind.is_type_declaration() {
                let name = format!(": {} :", slot.item.name);
                let tracked = wrap(buffer, std::slice::from_mut(slot), &name, newline)?;
                slot.region = Some((name, tracked));
            }
        }
    }
    Ok(())
}

/// Writes a marker pair around `run`, which must be non-empty and contiguous, and widens the
/// run's outer range to include the new markers. A run sharing its first or last line with
/// other code gets that line split, so each marker sits on a line of its own.
fn wrap<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    run: &mut [Slot],
    name: &str,
    newline: &str,
) -> Result<TrackedRange, BufferError> {
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return Err(BufferError::Rejected(format!("empty region '{name}'")));
    };
    let (start_anchor, end_anchor) = (first.outer_start, last.outer_end);
    let indent = layout::member_indent(&*buffer, buffer.resolve(start_anchor));

    let mut end = buffer.resolve(end_anchor);
    if end != buffer.line_start(end) && layout::ends_line(&*buffer, end) {
        end = buffer.next_line_start(end);
    }
    let shared_end = end != buffer.line_start(end);
    if shared_end {
        layout::delete_space_after(buffer, end)?;
    }
    let mut close = String::new();
    if end > 0 && !buffer.text()[..end].ends_with('\n') {
        close.push_str(newline);
    }
    close.push_str(&regions::close_marker(&indent));
    let close_text_end = end + close.len();
    close.push_str(newline);
    buffer.insert(end, &close)?;
    let close_text = buffer.anchor(close_text_end, Bias::Left);
    let after = end + close.len();
    let outer_end = buffer.anchor(after, Bias::Left);
    if shared_end {
        let rest = if buffer.text()[after..].starts_with('}') {
            layout::outdent(&indent)
        } else {
            indent.as_str()
        };
        buffer.insert(after, rest)?;
    }
    if after < buffer.len()
        && !is_blank(&buffer.text()[after..buffer.line_end(after)])
        && !layout::closes_block(&*buffer, after)
    {
        buffer.insert(after, newline)?;
    }

    let mut start = buffer.resolve(start_anchor);
    if layout::starts_line(&*buffer, start) {
        start = buffer.line_start(start);
    }
    let shared_start = start != buffer.line_start(start);
    let mut open = String::new();
    if shared_start {
        layout::delete_space_after(buffer, start)?;
        open.push_str(newline);
        if !buffer.text()[..start].ends_with('{') {
            open.push_str(newline);
        }
    } else if start > 0
        && !is_blank(&buffer.text()[buffer.line_start(start - 1)..start])
        && !layout::opens_block(&*buffer, start - 1)
    {
        open.push_str(newline);
    }
    let open_line = start + open.len();
    open.push_str(&regions::open_marker(&indent, name));
    open.push_str(newline);
    if shared_start {
        open.push_str(&indent);
    }
    buffer.insert(start, &open)?;

    let tracked = TrackedRange::new(buffer, open_line..buffer.resolve(close_text));
    debug!(region = name; "Added region");

    if let Some(first) = run.first_mut() {
        first.outer_start = tracked.start();
    }
    if let Some(last) = run.last_mut() {
        last.outer_end = outer_end;
    }
    Ok(tracked)
}

#[cfg(test)]
#[path = "tests/region_service.rs"]
mod tests;
