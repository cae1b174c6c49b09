//! Set operations over two feature sequences.
//!
//! Every operation pairs the features of its inputs through the geometry
//! kernel and yields newly built features lazily. Results with an empty
//! geometry are dropped; nothing is sorted or deduplicated.
//!
//! Inputs are anything iterable whose items borrow as a [`Feature`], so
//! slices, vectors, `FeatureSet::features()` and owned iterators all work.
//! Operations that walk an input more than once require it to be `Clone`.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::feature::Feature;
use crate::geometry::{OverlayGeometry, PreparedGeometry};

/// Overlay operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialFunction {
    Intersection = 1,
    Union = 2,
    Difference = 3,
    SymDifference = 4,
}

impl SpatialFunction {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SpatialFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpatialFunction::Intersection => "intersection",
            SpatialFunction::Union => "union",
            SpatialFunction::Difference => "difference",
            SpatialFunction::SymDifference => "sym_difference",
        };
        f.write_str(name)
    }
}

impl FromStr for SpatialFunction {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "intersection" => Ok(SpatialFunction::Intersection),
            "union" => Ok(SpatialFunction::Union),
            "difference" => Ok(SpatialFunction::Difference),
            "symdifference" => Ok(SpatialFunction::SymDifference),
            _ => Err(FeatureError::UnknownSpatialFunction(s.to_string())),
        }
    }
}

impl TryFrom<i32> for SpatialFunction {
    type Error = FeatureError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(SpatialFunction::Intersection),
            2 => Ok(SpatialFunction::Union),
            3 => Ok(SpatialFunction::Difference),
            4 => Ok(SpatialFunction::SymDifference),
            other => Err(FeatureError::UnknownSpatialFunction(other.to_string())),
        }
    }
}

fn as_feature<G, T: Borrow<Feature<G>>>(item: &T) -> &Feature<G> {
    Borrow::<Feature<G>>::borrow(item)
}

/// Pairwise intersection of `a` and `b`.
///
/// The geometry of each feature of `a` is prepared once and tested against
/// every feature of `b`. An intersecting pair yields the intersection of the
/// two geometries, carrying a copy of `a`'s attributes plus the attributes of
/// `b` whose names `a` lacks.
pub fn intersection<G, A, B>(a: A, b: B) -> impl Iterator<Item = Feature<G>>
where
    G: OverlayGeometry,
    A: IntoIterator,
    A::Item: Borrow<Feature<G>>,
    B: IntoIterator + Clone,
    B::Item: Borrow<Feature<G>>,
{
    a.into_iter()
        .flat_map(move |item| intersect_row(as_feature::<G, _>(&item), b.clone()))
}

fn intersect_row<G, B>(feature: &Feature<G>, others: B) -> Vec<Feature<G>>
where
    G: OverlayGeometry,
    B: IntoIterator,
    B::Item: Borrow<Feature<G>>,
{
    let Some(geometry) = feature.geometry() else {
        return Vec::new();
    };
    let prepared = geometry.prepare();
    others
        .into_iter()
        .filter_map(|item| {
            let other = as_feature::<G, _>(&item);
            let other_geometry = other.geometry()?;
            if !prepared.intersects(other_geometry) {
                return None;
            }
            let result = geometry.intersection(other_geometry);
            if result.is_empty() {
                log::trace!("dropping empty intersection");
                return None;
            }
            match feature.attributes().merged(other.attributes()) {
                Ok(attributes) => Some(Feature::new(result, attributes)),
                Err(err) => {
                    log::warn!("skipping intersecting pair: {err}");
                    None
                }
            }
        })
        .collect()
}

/// Parts of the features of `a` not covered by any feature of `b`.
///
/// The geometries of `b` are unioned once, when this function is called. A
/// feature of `a` that does not intersect the union is yielded unchanged, as
/// is a feature without geometry.
pub fn difference<G, A, B>(a: A, b: B) -> impl Iterator<Item = Feature<G>>
where
    G: OverlayGeometry,
    A: IntoIterator,
    A::Item: Borrow<Feature<G>>,
    B: IntoIterator,
    B::Item: Borrow<Feature<G>>,
{
    let cover = G::unary_union(
        b.into_iter()
            .filter_map(|item| as_feature::<G, _>(&item).geometry().cloned()),
    );
    log::debug!(
        "difference against {} cover",
        if cover.is_some() { "a" } else { "an empty" }
    );
    a.into_iter()
        .filter_map(move |item| subtract(as_feature::<G, _>(&item), cover.as_ref()))
}

fn subtract<G: OverlayGeometry>(feature: &Feature<G>, cover: Option<&G>) -> Option<Feature<G>> {
    let Some(geometry) = feature.geometry() else {
        return Some(feature.clone());
    };
    match cover {
        Some(cover) if geometry.prepare().intersects(cover) => {
            let result = geometry.difference(cover);
            if result.is_empty() {
                log::trace!("feature fully covered");
                None
            } else {
                Some(Feature::new(result, feature.attributes().clone()))
            }
        }
        _ if geometry.is_empty() => None,
        _ => Some(feature.clone()),
    }
}

/// Difference of `a` by `b` followed by the difference of `b` by `a`.
///
/// Both halves are computed eagerly when this function is called.
pub fn sym_difference<G, A, B>(a: A, b: B) -> impl Iterator<Item = Feature<G>>
where
    G: OverlayGeometry,
    A: IntoIterator + Clone,
    A::Item: Borrow<Feature<G>>,
    B: IntoIterator + Clone,
    B::Item: Borrow<Feature<G>>,
{
    let forward: Vec<Feature<G>> = difference(a.clone(), b.clone()).collect();
    let backward: Vec<Feature<G>> = difference(b, a).collect();
    log::debug!(
        "sym_difference kept {} + {} features",
        forward.len(),
        backward.len()
    );
    forward.into_iter().chain(backward)
}

/// Intersection of `a` and `b` followed by their symmetric difference.
pub fn union<G, A, B>(a: A, b: B) -> impl Iterator<Item = Feature<G>>
where
    G: OverlayGeometry,
    A: IntoIterator + Clone,
    A::Item: Borrow<Feature<G>>,
    B: IntoIterator + Clone,
    B::Item: Borrow<Feature<G>>,
{
    let rest = sym_difference(a.clone(), b.clone());
    intersection(a, b).chain(rest)
}

/// Runs the operation selected by `function`.
pub fn overlay<'a, G, A, B>(
    a: A,
    b: B,
    function: SpatialFunction,
) -> Box<dyn Iterator<Item = Feature<G>> + 'a>
where
    G: OverlayGeometry + 'a,
    A: IntoIterator + Clone + 'a,
    A::Item: Borrow<Feature<G>>,
    B: IntoIterator + Clone + 'a,
    B::Item: Borrow<Feature<G>>,
{
    log::debug!("overlay: {function}");
    match function {
        SpatialFunction::Intersection => Box::new(intersection(a, b)),
        SpatialFunction::Difference => Box::new(difference(a, b)),
        SpatialFunction::Union => Box::new(union(a, b)),
        SpatialFunction::SymDifference => Box::new(sym_difference(a, b)),
    }
}

/// Wraps each geometry in a feature with an empty attribute bag.
pub fn lift_geometries<G, I>(geometries: I) -> Vec<Feature<G>>
where
    I: IntoIterator<Item = G>,
{
    geometries.into_iter().map(Feature::from_geometry).collect()
}

/// [`overlay`] with bare geometries on the right-hand side.
pub fn overlay_geometries<'a, G, A, I>(
    features: A,
    geometries: I,
    function: SpatialFunction,
) -> Box<dyn Iterator<Item = Feature<G>> + 'a>
where
    G: OverlayGeometry + 'a,
    A: IntoIterator + Clone + 'a,
    A::Item: Borrow<Feature<G>>,
    I: IntoIterator<Item = G>,
{
    overlay(features, lift_geometries(geometries), function)
}

/// [`overlay`] with bare geometries on the left-hand side.
pub fn geometries_overlay<'a, G, I, B>(
    geometries: I,
    features: B,
    function: SpatialFunction,
) -> Box<dyn Iterator<Item = Feature<G>> + 'a>
where
    G: OverlayGeometry + 'a,
    I: IntoIterator<Item = G>,
    B: IntoIterator + Clone + 'a,
    B::Item: Borrow<Feature<G>>,
{
    overlay(lift_geometries(geometries), features, function)
}
