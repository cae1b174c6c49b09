//! A geometry paired with its attributes.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeBag, AttributeValue};
use crate::config::FeatureConfig;
use crate::envelope::BoundingBox;
use crate::error::{FeatureError, Result};
use crate::geometry::OverlayGeometry;

/// Geometry with an attribute bag and an optional bounding box.
///
/// The bounding box is either set explicitly or, when the
/// compute-when-missing switch is on, derived from the geometry envelope on
/// first read and cached. A cached box is kept until replaced with
/// [`Feature::set_bounding_box`], even when the geometry changes.
///
/// Equality and encoding cover the geometry, the attributes and the
/// explicitly set box; the derived cache takes no part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature<G> {
    geometry: Option<G>,
    attributes: AttributeBag,
    #[serde(with = "crate::envelope::optional")]
    bounding_box: Option<BoundingBox>,
    #[serde(skip)]
    derived_box: OnceCell<BoundingBox>,
}

impl<G> Feature<G> {
    /// Creates a new feature.
    pub fn new(geometry: G, attributes: AttributeBag) -> Self {
        Self {
            geometry: Some(geometry),
            attributes,
            bounding_box: None,
            derived_box: OnceCell::new(),
        }
    }

    /// Creates a feature from optional parts; the attribute bag is required.
    pub fn try_new(geometry: Option<G>, attributes: Option<AttributeBag>) -> Result<Self> {
        let attributes = attributes.ok_or(FeatureError::NullArgument { name: "attributes" })?;
        Ok(Self {
            geometry,
            attributes,
            bounding_box: None,
            derived_box: OnceCell::new(),
        })
    }

    /// Creates a new feature with empty attributes.
    pub fn from_geometry(geometry: G) -> Self {
        Self::new(geometry, AttributeBag::new())
    }

    pub fn geometry(&self) -> Option<&G> {
        self.geometry.as_ref()
    }

    pub fn geometry_mut(&mut self) -> Option<&mut G> {
        self.geometry.as_mut()
    }

    pub fn set_geometry(&mut self, geometry: Option<G>) {
        self.geometry = geometry;
    }

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        &mut self.attributes
    }

    /// Replaces the attribute bag; `None` is rejected.
    pub fn set_attributes(&mut self, attributes: Option<AttributeBag>) -> Result<()> {
        self.attributes = attributes.ok_or(FeatureError::NullArgument { name: "attributes" })?;
        Ok(())
    }

    /// Stores `bounding_box` verbatim and drops any derived box.
    pub fn set_bounding_box(&mut self, bounding_box: Option<BoundingBox>) {
        self.bounding_box = bounding_box;
        self.derived_box = OnceCell::new();
    }

    /// Value of the attribute holding the feature's identifier, if any.
    pub fn optional_id(&self, id_attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get_optional(id_attribute)
    }

    pub fn into_parts(self) -> (Option<G>, AttributeBag) {
        (self.geometry, self.attributes)
    }
}

impl<G: OverlayGeometry> Feature<G> {
    /// Bounding box under the process-wide configuration.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box_with(&FeatureConfig::global())
    }

    /// Bounding box under `config`.
    ///
    /// A stored box is returned as is. Otherwise the box is derived from the
    /// geometry only when `compute_bounding_box_when_missing` is set, and the
    /// derived box is cached.
    pub fn bounding_box_with(&self, config: &FeatureConfig) -> Option<BoundingBox> {
        if let Some(bbox) = self.bounding_box.or_else(|| self.derived_box.get().copied()) {
            return Some(bbox);
        }
        if !config.compute_bounding_box_when_missing {
            return None;
        }
        let geometry = self.geometry.as_ref()?;
        Some(*self.derived_box.get_or_init(|| geometry.envelope()))
    }
}

impl<G: PartialEq> PartialEq for Feature<G> {
    fn eq(&self, other: &Self) -> bool {
        self.geometry == other.geometry
            && self.attributes == other.attributes
            && self.bounding_box == other.bounding_box
    }
}

impl<G> From<G> for Feature<G> {
    fn from(geometry: G) -> Self {
        Self::from_geometry(geometry)
    }
}
