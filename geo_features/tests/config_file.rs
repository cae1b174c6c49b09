use assert_fs::prelude::*;
use geo_features::{FeatureConfig, FeatureError};
use predicates::prelude::*;

#[test]
fn load_config_from_json() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("features.json");
    file.write_str(r#"{ "compute_bounding_box_when_missing": true }"#)
        .unwrap();
    file.assert(predicate::str::contains("compute_bounding_box_when_missing"));

    let config = FeatureConfig::from_json(file.path().to_str().unwrap()).unwrap();
    assert!(config.compute_bounding_box_when_missing);
    assert!(!config.add_attribute_with_indexer);
    dir.close().unwrap();
}

#[test]
fn malformed_config_is_rejected() {
    let file = assert_fs::NamedTempFile::new("broken.json").unwrap();
    file.write_str("{ not json").unwrap();
    let err = FeatureConfig::from_json(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, FeatureError::Config(_)));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    let missing = dir.child("absent.json");
    missing.assert(predicate::path::missing());
    let err = FeatureConfig::from_json(missing.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, FeatureError::Io(_)));
}
