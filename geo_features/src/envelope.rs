//! Axis-aligned bounding boxes.

use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle bounding a geometry, a feature or a collection.
///
/// A box can be *null*: it bounds nothing and expanding it by another box
/// yields that box. Null boxes compare equal to each other, and decoding a
/// box with an inverted axis yields the null box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "BoxBounds")]
pub struct BoundingBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Creates a box from two x and two y bounds given in any order.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    /// Creates the degenerate box covering a single coordinate.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, x, y, y)
    }

    /// Creates a null box.
    pub fn null() -> Self {
        Self {
            min_x: 0.0,
            max_x: -1.0,
            min_y: 0.0,
            max_y: -1.0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Width of the box, zero when null.
    pub fn width(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Height of the box, zero when null.
    pub fn height(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Enlarges this box so that it also covers `other`.
    pub fn expand_to_include(&mut self, other: &BoundingBox) {
        if other.is_null() {
            return;
        }
        if self.is_null() {
            *self = *other;
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Enlarges this box so that it also covers the coordinate.
    pub fn expand_to_include_point(&mut self, x: f64, y: f64) {
        self.expand_to_include(&BoundingBox::from_point(x, y));
    }

    /// Returns true when the two boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        other.min_x <= self.max_x
            && other.max_x >= self.min_x
            && other.min_y <= self.max_y
            && other.max_y >= self.min_y
    }
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (false, false) => {
                self.min_x == other.min_x
                    && self.max_x == other.max_x
                    && self.min_y == other.min_y
                    && self.max_y == other.max_y
            }
            _ => false,
        }
    }
}

#[derive(Deserialize)]
struct BoxBounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl From<BoxBounds> for BoundingBox {
    fn from(b: BoxBounds) -> Self {
        let bbox = Self {
            min_x: b.min_x,
            max_x: b.max_x,
            min_y: b.min_y,
            max_y: b.max_y,
        };
        if bbox.is_null() {
            Self::null()
        } else {
            bbox
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::null()
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        let Coord { x: x1, y: y1 } = rect.min();
        let Coord { x: x2, y: y2 } = rect.max();
        Self::new(x1, x2, y1, y2)
    }
}

/// Encoded form of an optional bounding box: a presence flag plus the four
/// bounds, so that absence never relies on a nullable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxRecord {
    pub has_bbox: bool,
    #[serde(default)]
    pub bbox_x1: f64,
    #[serde(default)]
    pub bbox_x2: f64,
    #[serde(default)]
    pub bbox_y1: f64,
    #[serde(default)]
    pub bbox_y2: f64,
}

impl From<Option<BoundingBox>> for BoundingBoxRecord {
    fn from(bbox: Option<BoundingBox>) -> Self {
        match bbox {
            Some(b) => Self {
                has_bbox: true,
                bbox_x1: b.min_x,
                bbox_x2: b.max_x,
                bbox_y1: b.min_y,
                bbox_y2: b.max_y,
            },
            None => Self {
                has_bbox: false,
                bbox_x1: 0.0,
                bbox_x2: 0.0,
                bbox_y1: 0.0,
                bbox_y2: 0.0,
            },
        }
    }
}

impl From<BoundingBoxRecord> for Option<BoundingBox> {
    fn from(record: BoundingBoxRecord) -> Self {
        if record.has_bbox {
            Some(BoundingBox::new(
                record.bbox_x1,
                record.bbox_x2,
                record.bbox_y1,
                record.bbox_y2,
            ))
        } else {
            None
        }
    }
}

/// serde adapter storing an optional box as a [`BoundingBoxRecord`].
pub(crate) mod optional {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{BoundingBox, BoundingBoxRecord};

    pub fn serialize<S: Serializer>(
        bbox: &Option<BoundingBox>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        BoundingBoxRecord::from(*bbox).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BoundingBox>, D::Error> {
        BoundingBoxRecord::deserialize(deserializer).map(Option::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_bounds() {
        let b = BoundingBox::new(3.0, 1.0, 8.0, -2.0);
        assert_eq!(b.min_x(), 1.0);
        assert_eq!(b.max_x(), 3.0);
        assert_eq!(b.min_y(), -2.0);
        assert_eq!(b.max_y(), 8.0);
    }

    #[test]
    fn expanding_null_box_adopts_other() {
        let mut b = BoundingBox::null();
        assert!(b.is_null());
        b.expand_to_include(&BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(b, BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        b.expand_to_include(&BoundingBox::null());
        assert_eq!(b, BoundingBox::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn expand_covers_points() {
        let mut b = BoundingBox::from_point(1.0, 1.0);
        b.expand_to_include_point(-1.0, 4.0);
        assert_eq!(b, BoundingBox::new(-1.0, 1.0, 1.0, 4.0));
        assert!((b.width() - 2.0).abs() < 1e-12);
        assert!((b.height() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn null_boxes_never_intersect() {
        let b = BoundingBox::new(0.0, 1.0, 0.0, 1.0);
        assert!(!b.intersects(&BoundingBox::null()));
        assert!(b.intersects(&BoundingBox::from_point(1.0, 1.0)));
        assert!(!b.intersects(&BoundingBox::from_point(1.5, 1.0)));
    }

    #[test]
    fn null_boxes_compare_equal() {
        let decoded: BoundingBox = serde_json::from_str(
            r#"{ "min_x": 5.0, "max_x": 1.0, "min_y": 0.0, "max_y": 2.0 }"#,
        )
        .unwrap();
        assert!(decoded.is_null());
        assert_eq!(decoded, BoundingBox::null());
        assert_eq!(BoundingBox::null(), decoded);
        assert_eq!(decoded.width(), 0.0);

        let inverted_y: BoundingBox = serde_json::from_str(
            r#"{ "min_x": 0.0, "max_x": 1.0, "min_y": 3.0, "max_y": 2.0 }"#,
        )
        .unwrap();
        assert_eq!(inverted_y, BoundingBox::null());
        assert_ne!(BoundingBox::new(0.0, 1.0, 0.0, 1.0), BoundingBox::null());

        let json = serde_json::to_string(&BoundingBox::new(0.0, 1.0, 2.0, 3.0)).unwrap();
        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BoundingBox::new(0.0, 1.0, 2.0, 3.0));
    }

    #[test]
    fn record_uses_presence_flag() {
        let record = BoundingBoxRecord::from(None);
        assert!(!record.has_bbox);
        assert_eq!(Option::<BoundingBox>::from(record), None);

        let b = BoundingBox::new(2.0, 4.0, 8.0, 16.0);
        let json = serde_json::to_value(BoundingBoxRecord::from(Some(b))).unwrap();
        assert_eq!(json["has_bbox"], true);
        assert_eq!(json["bbox_x2"], 4.0);
        let back: BoundingBoxRecord = serde_json::from_value(json).unwrap();
        assert_eq!(Option::<BoundingBox>::from(back), Some(b));
    }
}
