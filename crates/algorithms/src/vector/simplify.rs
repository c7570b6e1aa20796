//! Geometry simplification algorithms
//!
//! - Douglas-Peucker: preserves shape character, fast
//! - Visvalingam-Whyatt: area-based, better for cartographic display
//!
//! The vertex reduction itself is `geo`'s. This module applies it ring by
//! ring, drops rings that collapse, and never loses a feature: a polygon
//! whose every ring collapses keeps its original geometry.

use geo::{Geometry, LineString, MultiLineString, MultiPolygon, Polygon};
use geo::{Simplify, SimplifyVw};
use geoslim_core::{Algorithm, BoundaryLayer, Error, Result};
use serde::Serialize;
use tracing::debug;

use super::measurements::vertex_count;

/// Smallest closed ring: three distinct vertices plus the closing one
const MIN_RING_POINTS: usize = 4;

/// Vertex reduction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SimplifyMethod {
    /// Tolerance is the maximum perpendicular deviation
    #[default]
    DouglasPeucker,
    /// Tolerance is the minimum effective triangle area
    VisvalingamWhyatt,
}

/// Parameters for simplification
#[derive(Debug, Clone)]
pub struct SimplifyParams {
    /// Tolerance (epsilon for DP, area threshold for VW), in layer units
    pub tolerance: f64,
    pub method: SimplifyMethod,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            tolerance: 1000.0,
            method: SimplifyMethod::DouglasPeucker,
        }
    }
}

impl SimplifyParams {
    pub fn douglas_peucker(tolerance: f64) -> Self {
        Self {
            tolerance,
            method: SimplifyMethod::DouglasPeucker,
        }
    }

    /// Tolerance must be a finite, strictly positive number.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                value: self.tolerance.to_string(),
                reason: "must be a positive number in the layer's linear unit".to_string(),
            });
        }
        Ok(())
    }
}

/// What a layer simplification did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimplifyReport {
    pub records: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
    /// Rings removed because they collapsed below a valid ring
    pub dropped_rings: usize,
    /// Features left unsimplified because every ring collapsed
    pub kept_original: usize,
    /// Records removed by a region filter before simplification
    pub filtered: usize,
}

impl SimplifyReport {
    /// Fraction of vertices removed, 0.0 to 1.0
    pub fn reduction(&self) -> f64 {
        if self.vertices_before == 0 {
            return 0.0;
        }
        1.0 - self.vertices_after as f64 / self.vertices_before as f64
    }
}

/// Simplify a geometry using Douglas-Peucker algorithm.
///
/// Removes vertices that deviate less than `tolerance` from the
/// simplified line.
///
/// # Arguments
/// * `geom` - Input geometry
/// * `tolerance` - Maximum allowed deviation
pub fn simplify_dp(geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    simplify_geometry(geom, tolerance, SimplifyMethod::DouglasPeucker).0
}

/// Simplify a geometry using Visvalingam-Whyatt algorithm.
///
/// Removes vertices based on the effective area they contribute.
/// Better results for cartographic generalization.
///
/// # Arguments
/// * `geom` - Input geometry
/// * `tolerance` - Minimum effective area to retain a vertex
pub fn simplify_vw(geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    simplify_geometry(geom, tolerance, SimplifyMethod::VisvalingamWhyatt).0
}

fn simplify_line(line: &LineString<f64>, tolerance: f64, method: SimplifyMethod) -> LineString<f64> {
    match method {
        SimplifyMethod::DouglasPeucker => line.simplify(&tolerance),
        SimplifyMethod::VisvalingamWhyatt => line.simplify_vw(&tolerance),
    }
}

/// Returns `None` when the exterior collapses; interiors that collapse are
/// dropped and counted.
fn simplify_polygon(
    polygon: &Polygon<f64>,
    tolerance: f64,
    method: SimplifyMethod,
    dropped: &mut usize,
) -> Option<Polygon<f64>> {
    let exterior = simplify_line(polygon.exterior(), tolerance, method);
    if exterior.0.len() < MIN_RING_POINTS {
        *dropped += 1 + polygon.interiors().len();
        return None;
    }
    let interiors: Vec<LineString<f64>> = polygon
        .interiors()
        .iter()
        .map(|ring| simplify_line(ring, tolerance, method))
        .filter(|ring| {
            let keep = ring.0.len() >= MIN_RING_POINTS;
            if !keep {
                *dropped += 1;
            }
            keep
        })
        .collect();
    Some(Polygon::new(exterior, interiors))
}

/// Simplify one geometry. Returns the result, the number of rings dropped
/// and whether the original had to be kept.
fn simplify_geometry(
    geom: &Geometry<f64>,
    tolerance: f64,
    method: SimplifyMethod,
) -> (Geometry<f64>, usize, bool) {
    let mut dropped = 0;
    let simplified = match geom {
        Geometry::LineString(ls) => Geometry::LineString(simplify_line(ls, tolerance, method)),
        Geometry::MultiLineString(mls) => {
            let simplified: Vec<LineString<f64>> = mls
                .0
                .iter()
                .map(|ls| simplify_line(ls, tolerance, method))
                .collect();
            Geometry::MultiLineString(MultiLineString::new(simplified))
        }
        Geometry::Polygon(p) => match simplify_polygon(p, tolerance, method, &mut dropped) {
            Some(p) => Geometry::Polygon(p),
            None => return (geom.clone(), 0, true),
        },
        Geometry::MultiPolygon(mp) => {
            let simplified: Vec<Polygon<f64>> = mp
                .0
                .iter()
                .filter_map(|p| simplify_polygon(p, tolerance, method, &mut dropped))
                .collect();
            if simplified.is_empty() && !mp.0.is_empty() {
                return (geom.clone(), 0, true);
            }
            Geometry::MultiPolygon(MultiPolygon::new(simplified))
        }
        other => other.clone(),
    };
    (simplified, dropped, false)
}

/// Simplify every geometry of a layer.
///
/// Records, attribute schema, shape type and CRS are carried over as they
/// are; only geometries change. The result is not idempotent in general:
/// simplifying an already simplified layer may remove further vertices.
pub fn simplify_layer(
    mut layer: BoundaryLayer,
    params: &SimplifyParams,
) -> Result<(BoundaryLayer, SimplifyReport)> {
    params.validate()?;

    let mut report = SimplifyReport {
        records: layer.features.len(),
        ..Default::default()
    };

    for (index, feature) in layer.features.iter_mut().enumerate() {
        let Some(geometry) = feature.geometry.take() else {
            continue;
        };
        let before = vertex_count(&geometry);
        let (simplified, dropped, kept) = simplify_geometry(&geometry, params.tolerance, params.method);
        let after = vertex_count(&simplified);
        if after > before {
            return Err(Error::Algorithm(format!(
                "record {}: simplification grew the geometry from {} to {} vertices",
                index, before, after
            )));
        }
        report.vertices_before += before;
        report.vertices_after += after;
        report.dropped_rings += dropped;
        if kept {
            report.kept_original += 1;
            debug!("record {}: every ring collapsed, keeping original", index);
        }
        feature.geometry = Some(simplified);
    }

    Ok((layer, report))
}

/// Layer simplification as an [`Algorithm`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerSimplify;

impl Algorithm for LayerSimplify {
    type Input = BoundaryLayer;
    type Output = (BoundaryLayer, SimplifyReport);
    type Params = SimplifyParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "simplify"
    }

    fn description(&self) -> &'static str {
        "Reduce the vertex density of every geometry in a boundary layer"
    }

    fn execute(&self, input: BoundaryLayer, params: SimplifyParams) -> Result<Self::Output> {
        simplify_layer(input, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag_line() -> LineString<f64> {
        // A zigzag line with small deviations
        LineString::from(vec![
            (0.0, 0.0),
            (1.0, 0.1),  // small deviation
            (2.0, 0.0),
            (3.0, -0.05), // tiny deviation
            (4.0, 0.0),
            (5.0, 0.2),  // larger deviation
            (6.0, 0.0),
            (7.0, 0.0),
            (8.0, 0.0),
            (9.0, 0.0),
            (10.0, 0.0),
        ])
    }

    fn complex_polygon() -> Polygon<f64> {
        let exterior = LineString::from(vec![
            (0.0, 0.0),
            (1.0, 0.1),
            (2.0, 0.0),
            (3.0, 0.05),
            (4.0, 0.0),
            (5.0, 0.0),
            (5.0, 5.0),
            (4.0, 4.9),
            (3.0, 5.0),
            (2.0, 5.1),
            (1.0, 5.0),
            (0.0, 5.0),
            (0.0, 0.0),
        ]);
        Polygon::new(exterior, vec![])
    }

    fn tiny_square(x: f64, y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, y), (x + 0.1, y), (x + 0.1, y + 0.1), (x, y + 0.1), (x, y)]),
            vec![],
        )
    }

    #[test]
    fn test_simplify_dp_reduces_vertices() {
        let line = zigzag_line();
        let original_count = line.0.len();

        let simplified = simplify_dp(&Geometry::LineString(line), 0.15);

        if let Geometry::LineString(ls) = simplified {
            assert!(
                ls.0.len() < original_count,
                "Should reduce vertices: {} -> {}",
                original_count,
                ls.0.len()
            );
            // Start and end should be preserved
            assert_eq!(ls.0.first().unwrap().x, 0.0);
            assert_eq!(ls.0.last().unwrap().x, 10.0);
        } else {
            panic!("Expected LineString");
        }
    }

    #[test]
    fn test_simplify_dp_high_tolerance() {
        let line = zigzag_line();
        let simplified = simplify_dp(&Geometry::LineString(line), 10.0);

        if let Geometry::LineString(ls) = simplified {
            // With very high tolerance, should reduce to just 2 points
            assert_eq!(ls.0.len(), 2, "High tolerance should leave only endpoints");
        }
    }

    #[test]
    fn test_simplify_polygon() {
        let poly = complex_polygon();
        let original_count = poly.exterior().0.len();

        let simplified = simplify_dp(&Geometry::Polygon(poly), 0.15);

        if let Geometry::Polygon(p) = simplified {
            assert!(
                p.exterior().0.len() < original_count,
                "Polygon should be simplified: {} -> {}",
                original_count,
                p.exterior().0.len()
            );
            // Should still be a closed ring
            assert_eq!(p.exterior().0.first(), p.exterior().0.last());
        } else {
            panic!("Expected Polygon");
        }
    }

    #[test]
    fn test_simplify_vw() {
        let line = zigzag_line();
        let original_count = line.0.len();

        let simplified = simplify_vw(&Geometry::LineString(line), 0.5);

        if let Geometry::LineString(ls) = simplified {
            assert!(
                ls.0.len() < original_count,
                "VW should reduce vertices: {} -> {}",
                original_count,
                ls.0.len()
            );
        }
    }

    #[test]
    fn test_simplify_preserves_non_simplifiable() {
        // A Point cannot be simplified
        let point = Geometry::Point(geo::Point::new(1.0, 2.0));
        let result = simplify_dp(&point, 1.0);

        if let Geometry::Point(p) = result {
            assert_eq!(p.x(), 1.0);
            assert_eq!(p.y(), 2.0);
        } else {
            panic!("Expected Point");
        }
    }

    #[test]
    fn test_collapsed_islands_are_dropped() {
        let mp = MultiPolygon::new(vec![complex_polygon(), tiny_square(20.0, 20.0)]);
        let (result, dropped, kept) =
            simplify_geometry(&Geometry::MultiPolygon(mp), 1.0, SimplifyMethod::DouglasPeucker);

        assert!(!kept);
        assert_eq!(dropped, 1);
        match result {
            Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 1),
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_fully_collapsed_feature_keeps_original() {
        let mp = Geometry::MultiPolygon(MultiPolygon::new(vec![tiny_square(0.0, 0.0)]));
        let (result, dropped, kept) = simplify_geometry(&mp, 5.0, SimplifyMethod::DouglasPeucker);

        assert!(kept);
        assert_eq!(dropped, 0);
        assert_eq!(result, mp);
    }

    #[test]
    fn test_tolerance_validation() {
        for bad in [0.0, -1000.0, f64::NAN, f64::INFINITY] {
            let err = SimplifyParams::douglas_peucker(bad).validate().unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { name: "tolerance", .. }));
        }
        assert!(SimplifyParams::douglas_peucker(1000.0).validate().is_ok());
    }

    #[test]
    fn test_report_reduction() {
        let report = SimplifyReport {
            records: 1,
            vertices_before: 200,
            vertices_after: 50,
            ..Default::default()
        };
        assert!((report.reduction() - 0.75).abs() < 1e-12);
        assert_eq!(SimplifyReport::default().reduction(), 0.0);
    }
}
