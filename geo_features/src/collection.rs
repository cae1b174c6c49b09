//! Ordered feature collections with an aggregated bounding box.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::FeatureConfig;
use crate::envelope::BoundingBox;
use crate::feature::Feature;
use crate::geometry::OverlayGeometry;
use crate::overlay::{self, SpatialFunction};

/// Ordered sequence of features. A slot may hold a placeholder (`None`),
/// which enumeration reports and aggregation skips.
///
/// As with [`Feature`], equality and encoding ignore the derived box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet<G> {
    features: Vec<Option<Feature<G>>>,
    #[serde(with = "crate::envelope::optional")]
    bounding_box: Option<BoundingBox>,
    #[serde(skip)]
    derived_box: OnceCell<BoundingBox>,
}

impl<G> Default for FeatureSet<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> FeatureSet<G> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
            bounding_box: None,
            derived_box: OnceCell::new(),
        }
    }

    pub fn push(&mut self, feature: Feature<G>) {
        self.features.push(Some(feature));
    }

    /// Appends an empty slot.
    pub fn push_placeholder(&mut self) {
        self.features.push(None);
    }

    /// Inserts a feature or placeholder at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, feature: Option<Feature<G>>) {
        self.features.insert(index, feature);
    }

    /// Removes the slot at `index`, returning its feature. Out of range
    /// indices leave the collection unchanged.
    pub fn remove(&mut self, index: usize) -> Option<Feature<G>> {
        if index < self.features.len() {
            self.features.remove(index)
        } else {
            None
        }
    }

    /// Feature at `index`; `None` for placeholders and out of range indices.
    pub fn get(&self, index: usize) -> Option<&Feature<G>> {
        self.features.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Feature<G>> {
        self.features.get_mut(index).and_then(Option::as_mut)
    }

    /// Number of slots, placeholders included.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// All slots in order, placeholders as `None`.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Feature<G>>> + '_ {
        self.features.iter().map(Option::as_ref)
    }

    /// Features in order, placeholders skipped.
    pub fn features(&self) -> impl Iterator<Item = &Feature<G>> + Clone + '_ {
        self.features.iter().flatten()
    }

    /// Stores `bounding_box` verbatim and drops any derived box.
    pub fn set_bounding_box(&mut self, bounding_box: Option<BoundingBox>) {
        self.bounding_box = bounding_box;
        self.derived_box = OnceCell::new();
    }
}

impl<G: OverlayGeometry> FeatureSet<G> {
    /// Bounding box under the process-wide configuration.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box_with(&FeatureConfig::global())
    }

    /// Bounding box under `config`.
    ///
    /// Without a stored box and with `compute_bounding_box_when_missing` set,
    /// the boxes of all members are folded together and the result is cached.
    /// A member contributes its own box or else its geometry envelope. When
    /// no member contributes, `None` is returned and nothing is cached.
    pub fn bounding_box_with(&self, config: &FeatureConfig) -> Option<BoundingBox> {
        if let Some(bbox) = self.bounding_box.or_else(|| self.derived_box.get().copied()) {
            return Some(bbox);
        }
        if !config.compute_bounding_box_when_missing {
            return None;
        }
        let folded = self
            .features()
            .filter_map(|f| {
                f.bounding_box_with(config)
                    .or_else(|| f.geometry().map(OverlayGeometry::envelope))
            })
            .filter(|bbox| !bbox.is_null())
            .fold(None, |acc: Option<BoundingBox>, bbox| {
                let mut acc = acc.unwrap_or_else(BoundingBox::null);
                acc.expand_to_include(&bbox);
                Some(acc)
            })?;
        log::debug!("computed collection bounding box {folded:?}");
        Some(*self.derived_box.get_or_init(|| folded))
    }

    pub fn intersection(&self, other: &FeatureSet<G>) -> FeatureSet<G> {
        overlay::intersection(self.features(), other.features()).collect()
    }

    pub fn difference(&self, other: &FeatureSet<G>) -> FeatureSet<G> {
        overlay::difference(self.features(), other.features()).collect()
    }

    pub fn union(&self, other: &FeatureSet<G>) -> FeatureSet<G> {
        overlay::union(self.features(), other.features()).collect()
    }

    pub fn sym_difference(&self, other: &FeatureSet<G>) -> FeatureSet<G> {
        overlay::sym_difference(self.features(), other.features()).collect()
    }

    pub fn overlay(&self, other: &FeatureSet<G>, function: SpatialFunction) -> FeatureSet<G> {
        overlay::overlay(self.features(), other.features(), function).collect()
    }
}

impl<G: PartialEq> PartialEq for FeatureSet<G> {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features && self.bounding_box == other.bounding_box
    }
}

impl<G> FromIterator<Feature<G>> for FeatureSet<G> {
    fn from_iter<I: IntoIterator<Item = Feature<G>>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().map(Some).collect(),
            bounding_box: None,
            derived_box: OnceCell::new(),
        }
    }
}

impl<G> Extend<Feature<G>> for FeatureSet<G> {
    fn extend<I: IntoIterator<Item = Feature<G>>>(&mut self, iter: I) {
        self.features.extend(iter.into_iter().map(Some));
    }
}

impl<G> IntoIterator for FeatureSet<G> {
    type Item = Feature<G>;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Option<Feature<G>>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeBag;
    use crate::geometry::rectangle;
    use geo_types::MultiPolygon;

    fn computing() -> FeatureConfig {
        FeatureConfig::new().with_compute_bounding_box_when_missing(true)
    }

    fn sample() -> FeatureSet<MultiPolygon<f64>> {
        let mut set = FeatureSet::new();
        set.push_placeholder();
        set.push(Feature::from_geometry(rectangle(0.0, 0.0, 1.0, 1.0)));
        set.push_placeholder();
        set.push(Feature::from_geometry(rectangle(2.0, 2.0, 3.0, 3.0)));
        set
    }

    #[test]
    fn placeholders_are_reported_and_skipped() {
        let set = sample();
        assert_eq!(set.len(), 4);
        assert_eq!(set.iter().filter(Option::is_none).count(), 2);
        assert_eq!(set.features().count(), 2);
        assert!(set.get(0).is_none());
        assert!(set.get(1).is_some());
        assert!(set.get(10).is_none());
    }

    #[test]
    fn bounding_box_follows_switch_and_cache() {
        let set = sample();
        assert_eq!(set.bounding_box_with(&FeatureConfig::new()), None);

        let expected = BoundingBox::new(0.0, 3.0, 0.0, 3.0);
        assert_eq!(set.bounding_box_with(&computing()), Some(expected));
        assert_eq!(set.bounding_box_with(&FeatureConfig::new()), Some(expected));
    }

    #[test]
    fn member_boxes_take_precedence_over_envelopes() {
        let mut set = sample();
        if let Some(f) = set.get_mut(1) {
            f.set_bounding_box(Some(BoundingBox::new(-5.0, 0.5, -5.0, 0.5)));
        }
        assert_eq!(
            set.bounding_box_with(&computing()),
            Some(BoundingBox::new(-5.0, 3.0, -5.0, 3.0))
        );
    }

    #[test]
    fn empty_collection_has_no_box() {
        let mut set: FeatureSet<MultiPolygon<f64>> = FeatureSet::new();
        set.push_placeholder();
        set.push(Feature::try_new(None, Some(AttributeBag::new())).unwrap());
        assert_eq!(set.bounding_box_with(&computing()), None);

        set.push(Feature::from_geometry(rectangle(1.0, 1.0, 2.0, 2.0)));
        assert_eq!(
            set.bounding_box_with(&computing()),
            Some(BoundingBox::new(1.0, 2.0, 1.0, 2.0))
        );
    }

    #[test]
    fn reading_a_derived_box_keeps_equality() {
        let original = sample();
        let copy = original.clone();
        assert!(original.bounding_box_with(&computing()).is_some());
        assert_eq!(original, copy);
        assert_eq!(copy, original);

        let json = serde_json::to_value(&original).unwrap();
        assert_eq!(json["bounding_box"]["has_bbox"], false);
        let back: FeatureSet<MultiPolygon<f64>> = serde_json::from_value(json).unwrap();
        assert_eq!(back, copy);
    }

    #[test]
    fn explicit_box_replaces_cache() {
        let mut set = sample();
        set.bounding_box_with(&computing());
        let explicit = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        set.set_bounding_box(Some(explicit));
        assert_eq!(set.bounding_box_with(&FeatureConfig::new()), Some(explicit));
    }

    #[test]
    fn insert_and_remove() {
        let mut set = sample();
        set.insert(0, Some(Feature::from_geometry(rectangle(9.0, 9.0, 10.0, 10.0))));
        assert_eq!(set.len(), 5);
        assert!(set.remove(1).is_none());
        assert_eq!(set.len(), 4);
        assert!(set.remove(0).is_some());
        assert!(set.remove(42).is_none());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn overlay_methods_collect_results() {
        let left: FeatureSet<_> = vec![Feature::new(
            rectangle(0.0, 0.0, 2.0, 2.0),
            AttributeBag::from_pairs([("ID", 1)]).unwrap(),
        )]
        .into_iter()
        .collect();
        let right: FeatureSet<_> = vec![Feature::new(
            rectangle(1.0, 1.0, 3.0, 3.0),
            AttributeBag::from_pairs([("Name", "A")]).unwrap(),
        )]
        .into_iter()
        .collect();

        assert_eq!(left.intersection(&right).len(), 1);
        assert_eq!(left.difference(&right).len(), 1);
        assert_eq!(left.sym_difference(&right).len(), 2);
        assert_eq!(left.union(&right).len(), 3);
        assert_eq!(left.overlay(&right, SpatialFunction::Union).len(), 3);
    }
}
