//! Polygonal geometries backed by the `geo` crate.

use geo::{BooleanOps, BoundingRect, Intersects};
use geo_types::{LineString, MultiPolygon, Polygon, Rect};

use super::{OverlayGeometry, PreparedGeometry};
use crate::envelope::BoundingBox;

/// Builds a single-part polygonal geometry from its exterior ring.
///
/// The ring is closed automatically when the last vertex differs from the
/// first.
pub fn polygon(exterior: &[(f64, f64)]) -> MultiPolygon<f64> {
    let ring = LineString::from(exterior.to_vec());
    MultiPolygon::new(vec![Polygon::new(ring, Vec::new())])
}

/// Builds an axis-aligned rectangle from two opposite corners.
pub fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64) -> MultiPolygon<f64> {
    let rect = Rect::new((x1, y1), (x2, y2));
    MultiPolygon::new(vec![rect.to_polygon()])
}

/// Prepared form of a polygonal geometry.
///
/// Bounding rectangles of the whole geometry and of each part are computed
/// once, so most non-intersecting candidates are rejected without running the
/// exact predicate.
#[derive(Debug, Clone)]
pub struct PreparedPolygons<'a> {
    bounds: Option<Rect<f64>>,
    parts: Vec<(Rect<f64>, &'a Polygon<f64>)>,
}

impl<'a> PreparedPolygons<'a> {
    /// Prepares `geometry` for repeated intersects tests.
    pub fn new(geometry: &'a MultiPolygon<f64>) -> Self {
        let parts = geometry
            .0
            .iter()
            .filter_map(|p| p.bounding_rect().map(|rect| (rect, p)))
            .collect();
        Self {
            bounds: geometry.bounding_rect(),
            parts,
        }
    }
}

impl PreparedGeometry<MultiPolygon<f64>> for PreparedPolygons<'_> {
    fn intersects(&self, other: &MultiPolygon<f64>) -> bool {
        let (Some(bounds), Some(other_bounds)) = (self.bounds, other.bounding_rect()) else {
            return false;
        };
        if !bounds.intersects(&other_bounds) {
            return false;
        }
        self.parts
            .iter()
            .any(|(rect, part)| rect.intersects(&other_bounds) && Intersects::intersects(other, *part))
    }
}

impl OverlayGeometry for MultiPolygon<f64> {
    type Prepared<'a> = PreparedPolygons<'a>;

    fn prepare(&self) -> Self::Prepared<'_> {
        PreparedPolygons::new(self)
    }

    fn is_empty(&self) -> bool {
        self.0.iter().all(|p| p.exterior().0.is_empty())
    }

    fn envelope(&self) -> BoundingBox {
        self.bounding_rect()
            .map(BoundingBox::from)
            .unwrap_or_else(BoundingBox::null)
    }

    fn intersects(&self, other: &Self) -> bool {
        self.0.iter().any(|part| Intersects::intersects(other, part))
    }

    fn intersection(&self, other: &Self) -> Self {
        BooleanOps::intersection(self, other)
    }

    fn union(&self, other: &Self) -> Self {
        BooleanOps::union(self, other)
    }

    fn difference(&self, other: &Self) -> Self {
        BooleanOps::difference(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn area(g: &MultiPolygon<f64>) -> f64 {
        g.unsigned_area()
    }

    #[test]
    fn rectangle_envelope() {
        let g = rectangle(0.0, 0.0, 2.0, 1.0);
        assert_eq!(g.envelope(), BoundingBox::new(0.0, 2.0, 0.0, 1.0));
        assert!(!OverlayGeometry::is_empty(&g));
    }

    #[test]
    fn empty_geometry_has_null_envelope() {
        let g = MultiPolygon::<f64>::new(Vec::new());
        assert!(OverlayGeometry::is_empty(&g));
        assert!(g.envelope().is_null());
    }

    #[test]
    fn polygon_closes_ring() {
        let g = polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!((area(&g) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn boolean_operations() {
        let a = rectangle(0.0, 0.0, 2.0, 2.0);
        let b = rectangle(1.0, 1.0, 3.0, 3.0);
        assert!(OverlayGeometry::intersects(&a, &b));
        assert!((area(&OverlayGeometry::intersection(&a, &b)) - 1.0).abs() < 1e-9);
        assert!((area(&OverlayGeometry::union(&a, &b)) - 7.0).abs() < 1e-9);
        assert!((area(&OverlayGeometry::difference(&a, &b)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn unary_union_merges_all() {
        let parts = vec![
            rectangle(0.0, 0.0, 1.0, 1.0),
            rectangle(1.0, 0.0, 2.0, 1.0),
            rectangle(5.0, 5.0, 6.0, 6.0),
        ];
        let merged = <MultiPolygon<f64> as OverlayGeometry>::unary_union(parts).unwrap();
        assert!((area(&merged) - 3.0).abs() < 1e-9);
        assert!(<MultiPolygon<f64> as OverlayGeometry>::unary_union(Vec::new()).is_none());
    }

    #[test]
    fn prepared_matches_exact_predicate() {
        let a = rectangle(0.0, 0.0, 2.0, 2.0);
        let prepared = a.prepare();
        let near = rectangle(1.0, 1.0, 3.0, 3.0);
        let far = rectangle(10.0, 10.0, 11.0, 11.0);
        let touching = rectangle(2.0, 0.0, 3.0, 1.0);
        assert!(prepared.intersects(&near));
        assert!(!prepared.intersects(&far));
        assert!(prepared.intersects(&touching));
        assert!(!prepared.intersects(&MultiPolygon::new(Vec::new())));
    }
}
