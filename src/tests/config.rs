use super::Config;
use crate::cleanup::CleanUpOptions;
use crate::order::OrderingBucket;
use crate::reorganize::DEFAULT_ORDER_CRITICAL_ATTRIBUTES;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.file_extensions, ["cs"]);
    assert!(config.add_regions);

    let policy = config.order_policy();
    assert_eq!(policy.bucket, OrderingBucket::Standard);
    assert!(policy.order_by_name);
    assert!(policy.separate_constants_from_fields);
    assert!(policy.read_only_before_mutable);
    assert!(!policy.order_by_access_level_first);

    let options = config.cleanup_options();
    assert!(options.add_regions);
    assert_eq!(options.order_critical_attributes, DEFAULT_ORDER_CRITICAL_ATTRIBUTES);
}

#[test]
fn test_every_default_shares_the_order_critical_attributes() {
    let parsed = Config::parse("add_regions = true").unwrap();

    assert_eq!(parsed.order_critical_attributes, DEFAULT_ORDER_CRITICAL_ATTRIBUTES);
    assert_eq!(Config::default().order_critical_attributes, DEFAULT_ORDER_CRITICAL_ATTRIBUTES);
    assert_eq!(
        CleanUpOptions::default().order_critical_attributes,
        DEFAULT_ORDER_CRITICAL_ATTRIBUTES
    );
    assert_eq!(DEFAULT_ORDER_CRITICAL_ATTRIBUTES, ["StructLayout", "ComImport"]);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let config = Config::parse(
        r#"
add_regions = false
ordering_bucket = "simplified"
order_critical_attributes = ["StructLayout"]
"#,
    )
    .unwrap();

    assert!(!config.add_regions);
    assert_eq!(config.order_policy().bucket, OrderingBucket::Simplified);
    assert_eq!(config.order_critical_attributes, ["StructLayout"]);
    assert_eq!(config.file_extensions, ["cs"]);
    assert!(config.order_by_name);
}

#[test]
fn test_invalid_toml_is_an_error() {
    assert!(Config::parse("add_regions = \"maybe\"").is_err());
    assert!(Config::parse("add_regions = ").is_err());
}

#[test]
fn test_unknown_bucket_falls_back_to_standard() {
    let config = Config {
        ordering_bucket: "alphabetical".to_string(),
        ..Config::default()
    };

    assert_eq!(config.order_policy().bucket, OrderingBucket::Standard);
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regiment.toml");
    fs::write(&path, "order_by_access_level_first = true\nfile_extensions = [\"cs\", \"csx\"]\n")
        .unwrap();

    let config = Config::load_from(&path);

    assert!(config.order_policy().order_by_access_level_first);
    assert_eq!(config.file_extensions, ["cs", "csx"]);
}

#[test]
fn test_missing_or_broken_file_gives_defaults() {
    let dir = tempdir().unwrap();

    let missing = Config::load_from(&dir.path().join("missing.toml"));
    assert!(missing.add_regions);

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "add_regions = [").unwrap();
    let config = Config::load_from(&broken);
    assert!(config.add_regions);
    assert_eq!(config.ordering_bucket, "standard");
}
