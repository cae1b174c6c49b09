//! Geographic features and the overlay algebra over feature collections.
//!
//! A [`Feature`] pairs a geometry with an [`AttributeBag`] and an optional
//! cached [`BoundingBox`]. The [`overlay`] module combines two feature
//! sequences pairwise (intersection, difference, union and symmetric
//! difference) and merges the attributes of the paired features.

pub mod attributes;
pub mod collection;
pub mod config;
pub mod envelope;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod overlay;
pub mod store;

pub use attributes::{AttributeBag, AttributeType, AttributeValue, NameMatching};
pub use collection::FeatureSet;
pub use config::FeatureConfig;
pub use envelope::{BoundingBox, BoundingBoxRecord};
pub use error::{FeatureError, Result};
pub use feature::Feature;
pub use geometry::{OverlayGeometry, PreparedGeometry};
pub use overlay::SpatialFunction;
pub use store::{IgnoreCase, KeyComparer, NamedValueStore, ReadOnlyStore};
