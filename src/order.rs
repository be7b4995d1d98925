//! Canonical ordering of sibling members.
//!
//! Every item is reduced to one numeric rank built from its kind bucket, its accessibility and
//! its field modifiers. The weights keep each key inside its own decimal place, so a lower key
//! can never outweigh a higher one. Equal ranks fall back to the normalized name and then to the
//! source position, which makes the order total.

use crate::item::{Kind, StructuralItem, Visibility};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Which fixed kind arrangement to sort by.
pub enum OrderingBucket {
    /// Every declaration kind, types first, then constructors, fields, methods, properties.
    #[default]
    Standard,
    /// Members only: constants, fields, constructors, methods, tests, properties.
    Simplified,
}

impl OrderingBucket {
    fn kinds(self) -> &'static [Kind] {
        match self {
            Self::Standard => &[
                Kind::Namespace,
                Kind::Class,
                Kind::Interface,
                Kind::Struct,
                Kind::Constructor,
                Kind::Destructor,
                Kind::Delegate,
                Kind::Event,
                Kind::Enum,
                Kind::Constant,
                Kind::Field,
                Kind::Method,
                Kind::TestMethod,
                Kind::Property,
                Kind::Indexer,
            ],
            Self::Simplified => &[
                Kind::Constant,
                Kind::Field,
                Kind::Constructor,
                Kind::Destructor,
                Kind::Method,
                Kind::TestMethod,
                Kind::Property,
                Kind::Indexer,
            ],
        }
    }
}

impl FromStr for OrderingBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "simplified" => Ok(Self::Simplified),
            other => Err(format!("unknown ordering bucket '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Comparator deciding the canonical order of siblings.
pub struct OrderPolicy {
    /// Kind arrangement used for the primary key.
    pub bucket: OrderingBucket,
    /// Rank accessibility above kind.
    pub order_by_access_level_first: bool,
    /// Break rank ties by normalized name before falling back to position.
    pub order_by_name: bool,
    /// Sort constant fields into their own bucket ahead of variables.
    pub separate_constants_from_fields: bool,
    /// Put `readonly` fields ahead of mutable ones.
    pub read_only_before_mutable: bool,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            bucket: OrderingBucket::Standard,
            order_by_access_level_first: false,
            order_by_name: true,
            separate_constants_from_fields: true,
            read_only_before_mutable: true,
        }
    }
}

impl OrderPolicy {
    #[must_use]
    /// Orders `x` against `y`: rank, then name, then start offset.
    pub fn compare(&self, x: &StructuralItem, y: &StructuralItem) -> Ordering {
        self.rank(x)
            .cmp(&self.rank(y))
            .then_with(|| {
                if self.order_by_name {
                    compare_names(x.normalized_name(), y.normalized_name())
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| x.start_offset().cmp(&y.start_offset()))
    }

    #[must_use]
    /// The kind an item sorts as: constants either get their own bucket or join the fields.
    pub fn effective_kind(&self, item: &StructuralItem) -> Kind {
        match item.kind {
            Kind::Field if item.is_constant && self.separate_constants_from_fields => {
                Kind::Constant
            }
            Kind::Constant if !self.separate_constants_from_fields => Kind::Field,
            kind => kind,
        }
    }

    #[must_use]
    /// Composite numeric rank; lower sorts first.
    pub fn rank(&self, item: &StructuralItem) -> u32 {
        let type_offset = self.type_offset(item);
        let access_offset = access_offset(item);
        let modifiers =
            constant_offset(item) * 100 + static_offset(item) * 10 + self.read_only_offset(item);

        if self.order_by_access_level_first {
            access_offset * 100_000 + type_offset * 1_000 + modifiers
        } else {
            type_offset * 10_000 + access_offset * 1_000 + modifiers
        }
    }

    fn type_offset(&self, item: &StructuralItem) -> u32 {
        let kinds = self.bucket.kinds();
        let kind = self.effective_kind(item);
        let position = kinds
            .iter()
            .position(|candidate| *candidate == kind)
            .unwrap_or(kinds.len());
        u32::try_from(position).map_or(16, |position| position + 1)
    }

    fn read_only_offset(&self, item: &StructuralItem) -> u32 {
        if !self.read_only_before_mutable || !item.kind.is_field_like() {
            return 0;
        }
        u32::from(!item.is_read_only)
    }
}

fn access_offset(item: &StructuralItem) -> u32 {
    match item.visibility {
        None => 0,
        Some(Visibility::Public) => 1,
        Some(Visibility::ProtectedInternal) => 2,
        Some(Visibility::Internal) => 3,
        Some(Visibility::Protected) => 4,
        Some(Visibility::PrivateProtected) => 5,
        Some(Visibility::Private) => 6,
    }
}

fn constant_offset(item: &StructuralItem) -> u32 {
    if item.kind.is_field_like() {
        u32::from(!(item.is_constant || item.kind == Kind::Constant))
    } else {
        0
    }
}

fn static_offset(item: &StructuralItem) -> u32 {
    if item.kind == Kind::Region {
        0
    } else {
        u32::from(!item.is_static)
    }
}

fn compare_names(x: &str, y: &str) -> Ordering {
    x.to_lowercase()
        .cmp(&y.to_lowercase())
        .then_with(|| x.cmp(y))
}

#[cfg(test)]
#[path = "tests/order.rs"]
mod tests;
