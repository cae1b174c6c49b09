//! Geometry kernel interface used by features and the overlay operations.
//!
//! The feature model never inspects coordinates itself. Everything it needs
//! from a geometry (envelope, intersects test, boolean operations) goes
//! through [`OverlayGeometry`], so another kernel can be plugged in by
//! implementing that trait.

pub mod polygonal;

use crate::envelope::BoundingBox;

pub use polygonal::{polygon, rectangle, PreparedPolygons};

/// Geometry supporting the predicates and boolean operations of the overlay
/// algebra.
pub trait OverlayGeometry: Clone {
    /// Geometry wrapped with a precomputed structure for repeated
    /// intersects tests.
    type Prepared<'a>: PreparedGeometry<Self>
    where
        Self: 'a;

    /// Builds the accelerated intersects predicate for this geometry.
    fn prepare(&self) -> Self::Prepared<'_>;

    /// Returns true when the geometry covers no points.
    fn is_empty(&self) -> bool;

    /// Bounding box of the geometry, null when the geometry is empty.
    fn envelope(&self) -> BoundingBox;

    fn intersects(&self, other: &Self) -> bool;

    fn intersection(&self, other: &Self) -> Self;

    fn union(&self, other: &Self) -> Self;

    fn difference(&self, other: &Self) -> Self;

    /// Unions all geometries of the sequence, `None` when it is empty.
    fn unary_union<I>(geometries: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        geometries
            .into_iter()
            .reduce(|acc, geometry| acc.union(&geometry))
    }
}

/// Intersects predicate prepared once and evaluated against many geometries.
pub trait PreparedGeometry<G> {
    fn intersects(&self, other: &G) -> bool;
}
