//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! Specifically, we try to find a regiment.toml, and if present we load settings from there.
//! This provides ordering preferences, region switches and file extension preferences.

use facet::Facet;
use log::warn;
use std::fs;
use std::path::Path;

use crate::cleanup::CleanUpOptions;
use crate::order::{OrderPolicy, OrderingBucket};
use crate::reorganize::default_order_critical_attributes;

/// File looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = "regiment.toml";

#[derive(Facet, Clone, Debug)]
/// User preferences loaded from regiment.toml or falling back to defaults.
pub struct Config {
    #[facet(default = vec!["cs".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
    #[facet(default = true)]
    /// Sort constants into their own group ahead of the other fields.
    pub separate_constants_from_fields: bool,
    #[facet(default = false)]
    /// Rank by accessibility before kind.
    pub order_by_access_level_first: bool,
    #[facet(default = true)]
    /// Break ties between equally ranked members by name.
    pub order_by_name: bool,
    #[facet(default = true)]
    /// Put `readonly` fields ahead of mutable ones.
    pub read_only_before_mutable: bool,
    #[facet(default = "standard".to_string())]
    /// Kind arrangement: `standard` or `simplified`.
    pub ordering_bucket: String,
    #[facet(default = true)]
    /// Write regions after reordering.
    pub add_regions: bool,
    #[facet(default = default_order_critical_attributes())]
    /// Attributes that pin the member order of the type carrying them.
    pub order_critical_attributes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_extensions: vec!["cs".to_string()],
            separate_constants_from_fields: true,
            order_by_access_level_first: false,
            order_by_name: true,
            read_only_before_mutable: true,
            ordering_bucket: "standard".to_string(),
            add_regions: true,
            order_critical_attributes: default_order_critical_attributes(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from regiment.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, falling back to defaults when it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        Self::parse(&contents).unwrap_or_else(|err| {
            warn!(path:?; "Ignoring invalid configuration: {err}");
            Self::default()
        })
    }

    /// Parse configuration from TOML text; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error message if the text does not describe a configuration.
    pub fn parse(contents: &str) -> Result<Self, String> {
        facet_toml::from_str::<Self>(contents).map_err(|err| err.to_string())
    }

    #[must_use]
    /// Comparator settings described by this configuration.
    pub fn order_policy(&self) -> OrderPolicy {
        let bucket = self.ordering_bucket.parse().unwrap_or_else(|err| {
            warn!("{err}, using the standard ordering");
            OrderingBucket::Standard
        });
        OrderPolicy {
            bucket,
            order_by_access_level_first: self.order_by_access_level_first,
            order_by_name: self.order_by_name,
            separate_constants_from_fields: self.separate_constants_from_fields,
            read_only_before_mutable: self.read_only_before_mutable,
        }
    }

    #[must_use]
    /// Pass settings described by this configuration.
    pub fn cleanup_options(&self) -> CleanUpOptions {
        CleanUpOptions {
            add_regions: self.add_regions,
            order_critical_attributes: self.order_critical_attributes.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
