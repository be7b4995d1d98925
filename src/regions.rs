//! Region marker lines: recognising them, pairing them and writing them.
//!
//! A marker is a whole line. `#region` opens a region and may carry a free-text name;
//! `#endregion` or `#End Region` closes the innermost open one. Keywords match in any case.
//! Marker pairs are matched with a stack in one pass over the lines.

use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::item::{Kind, RegionMarker, Span, StructuralItem};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*#(?i:(region|endregion|end region))\b(.*)$")
        .expect("marker pattern is valid")
});

#[derive(Clone, Debug, PartialEq, Eq)]
/// What a single line says about regions.
pub enum Marker {
    /// Opens a region with the given (possibly empty) name.
    Open(String),
    /// Closes the innermost open region.
    Close,
}

#[must_use]
/// Classifies one line (without its line break).
pub fn marker(line: &str) -> Option<Marker> {
    let captures = MARKER.captures(line.trim_end_matches('\r'))?;
    let keyword = captures.get(1)?.as_str();
    if keyword.eq_ignore_ascii_case("region") {
        let name = captures.get(2).map_or("", |name| name.as_str()).trim();
        Some(Marker::Open(unquote(name).to_string()))
    } else {
        Some(Marker::Close)
    }
}

fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(name)
}

#[must_use]
/// Whether a line is a region marker of either kind.
pub fn is_marker(line: &str) -> bool {
    marker(line).is_some()
}

#[must_use]
/// Every marker pair in `text`, ordered by where it opens.
///
/// A closing marker without an open region makes the whole document's regions unreliable, so
/// nothing is returned for it. Regions left open at the end are ignored.
pub fn scan(text: &str) -> Vec<RegionMarker> {
    let mut open: Vec<(String, usize)> = Vec::new();
    let mut regions = Vec::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let content = line.trim_end_matches('\n');
        match marker(content) {
            Some(Marker::Open(name)) => open.push((name, start)),
            Some(Marker::Close) => {
                let Some((name, region_start)) = open.pop() else {
                    warn!(offset = start; "Unmatched region end, ignoring all regions");
                    return Vec::new();
                };
                let end = start + content.trim_end_matches('\r').len();
                regions.push(RegionMarker {
                    name,
                    span: Span::from_offsets(text, region_start, end),
                    is_invalidated: false,
                });
            }
            None => {}
        }
    }

    if !open.is_empty() {
        debug!("{} region(s) left open at end of document", open.len());
    }
    regions.sort_by_key(|region| region.span.start_offset);
    regions
}

#[must_use]
/// The open marker line for `name`, without a line break.
pub fn open_marker(indent: &str, name: &str) -> String {
    if name.is_empty() {
        format!("{indent}#region")
    } else {
        format!("{indent}#region {name}")
    }
}

#[must_use]
/// The close marker line, without a line break.
pub fn close_marker(indent: &str) -> String {
    format!("{indent}#endregion")
}

/// Pairs scanned regions with the members they wrap and appends the rest as region items.
///
/// A region belongs to a member when it carries the member's name (or its overload signature)
/// and encloses it; such a region becomes the member's `associated_region` instead of an item.
pub fn attach(items: &mut Vec<StructuralItem>, regions: Vec<RegionMarker>) {
    for region in regions {
        let owner = items.iter_mut().find(|item| {
            item.kind != Kind::Region
                && item.associated_region.is_none()
                && region.span.contains(&item.span)
                && (region.name == item.name || region.name == item.signature())
        });
        if let Some(owner) = owner {
            debug!(region = region.name.as_str(); "Matched region to member");
            owner.associated_region = Some(region);
        } else {
            let mut item = StructuralItem::new(Kind::Region, region.name, region.span);
            item.is_invalidated = region.is_invalidated;
            items.push(item);
        }
    }
}

#[cfg(test)]
#[path = "tests/regions.rs"]
mod tests;
