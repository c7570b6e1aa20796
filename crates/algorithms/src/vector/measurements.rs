//! Geometric measurements: vertex count, area, length, perimeter, extent

use geo::{Area as GeoArea, BoundingRect, CoordsIter, Euclidean, Geometry, Length, Rect};

/// Number of vertices in a geometry, closing vertices of rings included.
pub fn vertex_count(geom: &Geometry<f64>) -> usize {
    geom.coords_count()
}

/// Calculate the area of a geometry.
///
/// Returns unsigned area. For geographic CRS, results are in CRS units squared
/// (e.g., square degrees — project to a metric CRS for square meters).
pub fn area(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        Geometry::Rect(r) => r.unsigned_area(),
        _ => 0.0,
    }
}

/// Calculate the length of a linear geometry.
///
/// Returns Euclidean length in CRS units.
pub fn length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::LineString(ls) => ls.length::<Euclidean>(),
        Geometry::MultiLineString(mls) => {
            mls.0.iter().map(|ls| ls.length::<Euclidean>()).sum()
        }
        _ => 0.0,
    }
}

/// Calculate the perimeter of a polygon geometry.
///
/// Returns the total length of exterior and interior rings.
pub fn perimeter(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => {
            let ext = p.exterior().length::<Euclidean>();
            let int: f64 = p.interiors().iter().map(|r| r.length::<Euclidean>()).sum();
            ext + int
        }
        Geometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .map(|p| perimeter(&Geometry::Polygon(p.clone())))
            .sum(),
        _ => 0.0,
    }
}

/// Axis-aligned envelope of several geometries, `None` if all are empty.
pub fn extent<'a>(geoms: impl IntoIterator<Item = &'a Geometry<f64>>) -> Option<Rect<f64>> {
    geoms
        .into_iter()
        .filter_map(|g| g.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{LineString, MultiLineString, MultiPolygon, Polygon};

    fn square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0),
            ]),
            vec![],
        )
    }

    fn square_with_hole() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0),
            ]),
            vec![LineString::from(vec![
                (2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0), (2.0, 2.0),
            ])],
        )
    }

    #[test]
    fn test_vertex_count_includes_holes() {
        assert_eq!(vertex_count(&Geometry::Polygon(square())), 5);
        assert_eq!(vertex_count(&Geometry::Polygon(square_with_hole())), 10);
        let mp = MultiPolygon::new(vec![square(), square_with_hole()]);
        assert_eq!(vertex_count(&Geometry::MultiPolygon(mp)), 15);
    }

    #[test]
    fn test_area_square() {
        let a = area(&Geometry::Polygon(square()));
        assert_relative_eq!(a, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_area_excludes_hole() {
        let a = area(&Geometry::Polygon(square_with_hole()));
        assert_relative_eq!(a, 96.0, epsilon = 1e-10);
    }

    #[test]
    fn test_perimeter_multipolygon() {
        let mp = MultiPolygon::new(vec![square(), square_with_hole()]);
        assert_relative_eq!(perimeter(&Geometry::MultiPolygon(mp)), 88.0, epsilon = 1e-10);
    }

    #[test]
    fn test_length_multilinestring() {
        let mls = MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0), (3.0, 4.0)]),
            LineString::from(vec![(0.0, 0.0), (0.0, 2.0)]),
        ]);
        assert_relative_eq!(length(&Geometry::MultiLineString(mls)), 7.0, epsilon = 1e-10);
        assert_eq!(length(&Geometry::Polygon(square())), 0.0);
    }

    #[test]
    fn test_extent_merges_envelopes() {
        let a = Geometry::Polygon(square());
        let b = Geometry::Point(geo::Point::new(-5.0, 20.0));
        let rect = extent([&a, &b]).unwrap();
        assert_eq!(rect.min().x, -5.0);
        assert_eq!(rect.min().y, 0.0);
        assert_eq!(rect.max().x, 10.0);
        assert_eq!(rect.max().y, 20.0);
        assert!(extent(std::iter::empty()).is_none());
    }
}
