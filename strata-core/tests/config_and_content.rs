//! Config loading error messages and content parsing integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use strata_core::{content, BuildConfig, ConfigError, ContentError, MetaValue, CONFIG_FILE_NAME};

// ---------------------------------------------------------------------------
// 1. Config errors
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child(CONFIG_FILE_NAME);
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = BuildConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(CONFIG_FILE_NAME), "got: {err}");
}

#[test]
fn wrong_shape_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child(CONFIG_FILE_NAME);
    file.write_str("- this is a list, not a mapping\n").expect("write");

    let err = BuildConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn directory_in_place_of_config_is_an_io_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(CONFIG_FILE_NAME).create_dir_all().expect("mkdir");

    let err = BuildConfig::load(&home.path().join(CONFIG_FILE_NAME)).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
}

#[rstest]
#[case("copy_static: false\n", false, false)]
#[case("copy_sources: true\n", true, true)]
#[case("", true, false)]
fn copy_flags(#[case] yaml: &str, #[case] copy_static: bool, #[case] copy_sources: bool) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let config =
        BuildConfig::from_yaml_str(yaml, &home.path().join(CONFIG_FILE_NAME)).expect("parse");
    assert_eq!(config.copy_static, copy_static);
    assert_eq!(config.copy_sources, copy_sources);
}

#[rstest]
#[case("content_extension: .markdown\n", "markdown")]
#[case("content_extension: txt\n", "txt")]
fn content_extension_drops_leading_dot(#[case] yaml: &str, #[case] expected: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let config =
        BuildConfig::from_yaml_str(yaml, &home.path().join(CONFIG_FILE_NAME)).expect("parse");
    assert_eq!(config.content_extension, expected);
    assert_eq!(config.content_pattern(), format!(".{expected}"));
}

// ---------------------------------------------------------------------------
// 2. Content files on disk
// ---------------------------------------------------------------------------

#[test]
fn load_item_from_disk_keeps_utf8() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let config = BuildConfig::defaults_at(home.path()).expect("config");
    let source = home.child("content/blåbær.md");
    source
        .write_str("Title: Blåbærsyltetøy\nTemplate: post\n\nSøt og god.\n")
        .expect("write");

    let item = content::load_item(source.path(), &config).expect("load");
    assert_eq!(item.title, "Blåbærsyltetøy");
    assert!(item.rendered_body.contains("Søt og god."));
    assert_eq!(
        item.metadata.get("template"),
        Some(&MetaValue::from("post"))
    );

    home.child("content").assert(predicate::path::is_dir());
}

#[rstest]
#[case("")]
#[case("Just text without a header line\n\nMore text")]
#[case("\nTitle: starts with a blank line\n")]
fn sources_without_metadata_are_rejected(#[case] input: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let config = BuildConfig::defaults_at(home.path()).expect("config");
    let err = content::parse_item(&config.content_dir.join("x.md"), input, &config).unwrap_err();
    assert!(matches!(err, ContentError::MissingMetadata { .. }), "got: {err}");
}

#[rstest]
#[case("rust", vec!["rust"])]
#[case(" Rust , Static Sites ", vec!["rust", "static sites"])]
#[case(",,", vec![])]
fn tags_are_normalised(#[case] input: &str, #[case] expected: Vec<&str>) {
    assert_eq!(content::split_tags(input), expected);
}
