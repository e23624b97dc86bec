use std::panic::{AssertUnwindSafe, catch_unwind};

use geo::{BooleanOps, MultiPolygon};

use crate::error::ClipError;

/// Polygon intersection as an injected capability, so the clipper's
/// degrade-and-continue policy can be exercised independent of which
/// underlying algorithm computes the overlay.
pub trait ClipEngine {
    fn intersection(
        &self,
        subject: &MultiPolygon<f64>,
        aoi: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, ClipError>;
}

/// Default engine backed by geo's boolean overlay.
///
/// Boolean ops can panic on degenerate input (self-touching rings, collapsed
/// segments); the panic is contained here and reported as a [`ClipError`] so
/// the clipper can fall back per-feature instead of aborting the export.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoClipEngine;

impl ClipEngine for GeoClipEngine {
    fn intersection(
        &self,
        subject: &MultiPolygon<f64>,
        aoi: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, ClipError> {
        catch_unwind(AssertUnwindSafe(|| subject.intersection(aoi)))
            .map_err(|_| ClipError::new("boolean intersection panicked on malformed input"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn intersection_of_overlapping_squares() {
        let a = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0), (x: 0.0, y: 0.0),
        ]]);
        let b = MultiPolygon(vec![polygon![
            (x: 2.0, y: 2.0), (x: 6.0, y: 2.0), (x: 6.0, y: 6.0), (x: 2.0, y: 6.0), (x: 2.0, y: 2.0),
        ]]);
        let out = GeoClipEngine.intersection(&a, &b).unwrap();
        assert_eq!(out.0.len(), 1);

        use geo::Area;
        assert!((out.unsigned_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn intersection_of_disjoint_squares_is_empty() {
        let a = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0),
        ]]);
        let b = MultiPolygon(vec![polygon![
            (x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0), (x: 5.0, y: 5.0),
        ]]);
        let out = GeoClipEngine.intersection(&a, &b).unwrap();
        assert!(out.0.is_empty());
    }
}
