//! Geometry clipper: intersect feature geometries with the AOI.
//!
//! Areal geometries are genuinely clipped (replaced by their intersection);
//! point and line geometries are kept whole if they intersect the AOI at all,
//! never trimmed to the boundary. That asymmetry is deliberate and matches
//! the behavior downstream viewers were built against.

mod engine;

use geo::{Geometry, GeometryCollection, Intersects, MultiPolygon};
use tracing::{debug, warn};

use crate::model::{Aoi, Feature, geometry_type_name};

pub use engine::{ClipEngine, GeoClipEngine};

/// Clip a feature list against the AOI, returning a new collection of the
/// survivors. Inputs are never mutated. Features with no geometry, and every
/// feature when the AOI has zero area, are dropped.
pub fn clip_features(engine: &dyn ClipEngine, aoi: &Aoi, features: &[Feature]) -> Vec<Feature> {
    if aoi.is_degenerate() {
        debug!("AOI has zero area; dropping all {} features", features.len());
        return Vec::new();
    }

    let kept: Vec<Feature> = features
        .iter()
        .filter_map(|feature| {
            let geometry = feature.geometry.as_ref()?;
            clip_geometry(engine, aoi.shape(), geometry).map(|clipped| Feature {
                geometry: Some(clipped),
                properties: feature.properties.clone(),
            })
        })
        .collect();

    debug!(kept = kept.len(), total = features.len(), "clipped layer against AOI");
    kept
}

/// Clip one geometry. `None` means no intersection (the feature is dropped).
fn clip_geometry(
    engine: &dyn ClipEngine,
    aoi: &MultiPolygon<f64>,
    geometry: &Geometry<f64>,
) -> Option<Geometry<f64>> {
    match geometry {
        Geometry::Polygon(poly) => {
            clip_areal(engine, aoi, &MultiPolygon(vec![poly.clone()]), geometry)
        }
        Geometry::MultiPolygon(mp) => clip_areal(engine, aoi, mp, geometry),
        Geometry::Rect(rect) => {
            clip_areal(engine, aoi, &MultiPolygon(vec![rect.to_polygon()]), geometry)
        }
        Geometry::Triangle(tri) => {
            clip_areal(engine, aoi, &MultiPolygon(vec![tri.to_polygon()]), geometry)
        }
        Geometry::GeometryCollection(gc) => {
            let survivors: Vec<Geometry<f64>> = gc
                .0
                .iter()
                .filter_map(|member| clip_geometry(engine, aoi, member))
                .collect();
            if survivors.is_empty() {
                None
            } else {
                Some(Geometry::GeometryCollection(GeometryCollection(survivors)))
            }
        }
        // Boolean pass-through for point and line types: kept verbatim if
        // they touch the AOI, no sub-segment trimming.
        other => other.intersects(aoi).then(|| other.clone()),
    }
}

/// True geometric intersection for areal geometries. An empty overlay result
/// drops the feature. If the overlay fails, degrade to a boolean intersects
/// test and keep the original geometry: a malformed feature must never crash
/// the export or silently take the rest of the layer with it.
fn clip_areal(
    engine: &dyn ClipEngine,
    aoi: &MultiPolygon<f64>,
    subject: &MultiPolygon<f64>,
    original: &Geometry<f64>,
) -> Option<Geometry<f64>> {
    match engine.intersection(subject, aoi) {
        Ok(mut clipped) => match clipped.0.len() {
            0 => None,
            1 => clipped.0.pop().map(Geometry::Polygon),
            _ => Some(Geometry::MultiPolygon(clipped)),
        },
        Err(err) => {
            warn!(
                geometry = geometry_type_name(original),
                %err,
                "intersection failed; keeping original geometry if it touches the AOI"
            );
            subject.intersects(aoi).then(|| original.clone())
        }
    }
}
