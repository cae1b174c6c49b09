use geo_features::{
    geometry::rectangle, AttributeBag, BoundingBox, Feature, FeatureConfig, FeatureError,
    FeatureSet,
};
use geo_types::MultiPolygon;

// One test function so the process-wide switches are never raced.
#[test]
fn process_wide_switches() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut set: FeatureSet<MultiPolygon<f64>> = FeatureSet::new();
    set.push_placeholder();
    set.push(Feature::from_geometry(rectangle(0.0, 0.0, 1.0, 1.0)));
    set.push_placeholder();
    set.push(Feature::from_geometry(rectangle(2.0, 2.0, 3.0, 3.0)));

    FeatureConfig::set_global(FeatureConfig::new());
    assert_eq!(set.bounding_box(), None);
    assert_eq!(set.get(1).and_then(Feature::bounding_box), None);

    FeatureConfig::set_global(FeatureConfig::new().with_compute_bounding_box_when_missing(true));
    let expected = BoundingBox::new(0.0, 3.0, 0.0, 3.0);
    assert_eq!(set.bounding_box(), Some(expected));

    FeatureConfig::set_global(FeatureConfig::new());
    assert_eq!(set.bounding_box(), Some(expected));
    assert_eq!(
        set.get(1).and_then(Feature::bounding_box),
        Some(BoundingBox::new(0.0, 1.0, 0.0, 1.0))
    );

    let mut bag = AttributeBag::new();
    assert!(matches!(
        bag.set("Name", "A"),
        Err(FeatureError::AttributeNotFound { .. })
    ));

    FeatureConfig::set_global(FeatureConfig::new().with_add_attribute_with_indexer(true));
    bag.set("Name", "A").unwrap();
    assert_eq!(bag.get("Name").unwrap().as_str(), Some("A"));

    let mut strict = AttributeBag::new().with_silent_upsert(false);
    assert!(strict.set("Name", "A").is_err());

    FeatureConfig::set_global(FeatureConfig::new());
    let mut lenient = AttributeBag::new().with_silent_upsert(true);
    lenient.set("Name", "A").unwrap();
    assert!(bag.set("Other", 1).is_err());
}
