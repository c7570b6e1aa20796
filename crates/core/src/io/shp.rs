//! Shapefile reading and writing
//!
//! Geometry comes from the `.shp` through `shapefile`, attributes from the
//! `.dbf` through `dbase`. The two are read separately so a count mismatch
//! between them is caught instead of silently truncated.

use geo_types::{
    Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use shapefile::dbase::{self, Record, TableWriterBuilder};
use shapefile::{PolygonRing, Shape, ShapeReader, ShapeType};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::staging::Staging;
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{BoundaryLayer, Feature, FieldSpec};

/// Extensions of the files that make up one layer, `.shp` first
pub const SIBLING_EXTENSIONS: [&str; 5] = ["shp", "shx", "dbf", "prj", "cpg"];

/// Options for writing a layer
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Replace an existing layer at the destination
    pub overwrite: bool,
}

/// Paths of the sibling files of a `.shp`
pub fn sibling_paths(shp: &Path) -> Vec<PathBuf> {
    SIBLING_EXTENSIONS
        .iter()
        .map(|ext| shp.with_extension(ext))
        .collect()
}

/// Read a shapefile layer into memory.
pub fn read_layer<P: AsRef<Path>>(path: P) -> Result<BoundaryLayer> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::MissingLayer {
            path: path.to_path_buf(),
        });
    }
    let dbf_path = path.with_extension("dbf");
    if !dbf_path.is_file() {
        return Err(Error::MissingSibling {
            layer: path.to_path_buf(),
            sibling: dbf_path,
        });
    }

    let shape_reader = ShapeReader::from_path(path)?;
    let shape_type = shape_reader.header().shape_type;
    let shapes = shape_reader.read()?;

    let mut dbf = dbase::Reader::from_path(&dbf_path)?;
    let fields = dbf
        .fields()
        .iter()
        .map(|f| FieldSpec {
            name: f.name().to_string(),
            kind: format!("{:?}", f.field_type()),
            length: f.length(),
        })
        .collect::<Vec<_>>();
    let records = dbf.read()?;
    let table = dbf.into_table_info();

    if shapes.len() != records.len() {
        return Err(Error::RecordCountMismatch {
            path: path.to_path_buf(),
            shapes: shapes.len(),
            records: records.len(),
        });
    }

    let features = shapes
        .into_iter()
        .zip(records)
        .enumerate()
        .map(|(index, (shape, record))| {
            Ok(Feature::new(
                shape_to_geometry(shape, index, shape_type)?,
                record,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let crs = CRS::from_prj_file(path.with_extension("prj"))?;
    let code_page = match fs::read_to_string(path.with_extension("cpg")) {
        Ok(text) => Some(text.trim().to_string()),
        Err(_) => None,
    };

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!(
        "read {} ({:?}): {} features, {} fields",
        name,
        shape_type,
        features.len(),
        fields.len()
    );

    Ok(BoundaryLayer {
        name,
        shape_type,
        crs,
        code_page,
        fields,
        table,
        features,
    })
}

/// Write a layer as a shapefile at `path`.
///
/// All sibling files are produced in a staging directory next to `path` and
/// only renamed into place once every one of them was written, so a failed
/// write leaves the destination untouched.
pub fn write_layer<P: AsRef<Path>>(
    layer: BoundaryLayer,
    path: P,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    check_destination(path, options)?;

    let dir = output_dir(path);
    let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
    let staging = Staging::new_in(&dir)?;
    let staged_shp = staging.path().join(&file_name);

    let record_count = layer.features.len();
    let BoundaryLayer {
        shape_type,
        crs,
        code_page,
        table,
        features,
        ..
    } = layer;

    if features.iter().all(|f| f.geometry.is_some()) {
        let items = features
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.geometry.as_ref().map(|g| (i, g, &f.record)));
        write_shapes(
            &staged_shp,
            TableWriterBuilder::from_table_info(table),
            shape_type,
            items,
        )?;
    } else {
        // The typed writer only takes shapes of the layer's type: write the
        // present geometries aside, then splice null records in between.
        let scratch = tempfile::Builder::new()
            .prefix(".geometry-")
            .tempdir_in(staging.path())?;
        let scratch_shp = scratch.path().join(&file_name);
        let blank = Record::default();
        let items = features
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.geometry.as_ref().map(|g| (i, g, &blank)));
        write_shapes(&scratch_shp, TableWriterBuilder::new(), shape_type, items)?;

        let present: Vec<bool> = features.iter().map(|f| f.geometry.is_some()).collect();
        splice_null_records(&scratch_shp, &staged_shp, &present, shape_type)?;
        drop(scratch);

        let mut dbf = TableWriterBuilder::from_table_info(table)
            .build_with_file_dest(staged_shp.with_extension("dbf"))?;
        for feature in &features {
            dbf.write_record(&feature.record)?;
        }
    }

    if let Some(wkt) = crs.as_ref().and_then(|c| c.wkt()) {
        fs::write(staged_shp.with_extension("prj"), wkt)?;
    }
    if let Some(cpg) = &code_page {
        fs::write(staged_shp.with_extension("cpg"), cpg)?;
    }

    // Siblings the new layer does not produce would otherwise be paired with
    // the new geometry; they go away only if the commit succeeds.
    let stale: Vec<PathBuf> = if options.overwrite {
        sibling_paths(path)
            .into_iter()
            .filter(|sibling| {
                let produced = sibling
                    .extension()
                    .map(|ext| staged_shp.with_extension(ext).exists())
                    .unwrap_or(false);
                !produced && sibling.exists()
            })
            .collect()
    } else {
        Vec::new()
    };

    staging.commit_replacing(&dir, &stale)?;
    info!("wrote {} features to {}", record_count, path.display());
    Ok(())
}

/// Validate an output path before any work is done.
pub fn check_destination(path: &Path, options: &WriteOptions) -> Result<()> {
    let is_shp = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);
    if !is_shp {
        return Err(Error::NotAShapefile {
            path: path.to_path_buf(),
        });
    }
    let dir = output_dir(path);
    if !dir.is_dir() {
        return Err(Error::MissingDirectory { path: dir });
    }
    if !options.overwrite {
        if let Some(existing) = sibling_paths(path).into_iter().find(|p| p.exists()) {
            return Err(Error::OutputExists { path: existing });
        }
    }
    Ok(())
}

fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write `items` with the typed writer matching `shape_type`.
fn write_shapes<'a>(
    path: &Path,
    table: TableWriterBuilder,
    shape_type: ShapeType,
    items: impl Iterator<Item = (usize, &'a Geometry<f64>, &'a Record)>,
) -> Result<()> {
    let kind = format!("{:?}", shape_type);
    let mut writer = shapefile::Writer::from_path(path, table)?;
    match shape_type {
        ShapeType::Polygon => {
            for (index, geom, record) in items {
                writer.write_shape_and_record(&to_shp_polygon(geom, index, &kind)?, record)?;
            }
        }
        ShapeType::Polyline => {
            for (index, geom, record) in items {
                writer.write_shape_and_record(&to_shp_polyline(geom, index, &kind)?, record)?;
            }
        }
        ShapeType::Point => {
            for (index, geom, record) in items {
                writer.write_shape_and_record(&to_shp_point(geom, index, &kind)?, record)?;
            }
        }
        ShapeType::Multipoint => {
            for (index, geom, record) in items {
                writer.write_shape_and_record(&to_shp_multipoint(geom, index, &kind)?, record)?;
            }
        }
        _ => {
            return Err(Error::UnsupportedShape {
                record: 0,
                shape_type: kind,
            })
        }
    }
    Ok(())
}

// ─── null records ───────────────────────────────────────────────────────

const SHP_HEADER_LEN: usize = 100;

fn shape_type_code(shape_type: ShapeType) -> i32 {
    match shape_type {
        ShapeType::Point => 1,
        ShapeType::Polyline => 3,
        ShapeType::Polygon => 5,
        ShapeType::Multipoint => 8,
        _ => 0,
    }
}

/// Rebuild `.shp`/`.shx` at `dest` from the records of `source`, inserting
/// a null record wherever `present` is false.
///
/// Records are `(number, content length)` big-endian headers followed by
/// the content; lengths and offsets count 16-bit words. A null record's
/// content is its shape type, 0.
fn splice_null_records(
    source: &Path,
    dest: &Path,
    present: &[bool],
    shape_type: ShapeType,
) -> Result<()> {
    let shp = fs::read(source)?;
    let truncated = || Error::Shapefile(format!("truncated shapefile {}", source.display()));
    let expected = present.iter().filter(|p| **p).count();
    let mut header = match shp.get(..SHP_HEADER_LEN) {
        Some(header) => header.to_vec(),
        // Nothing was written when every record is null
        None if expected == 0 => empty_header(),
        None => return Err(truncated()),
    };

    let mut contents = Vec::new();
    let mut pos = SHP_HEADER_LEN;
    while pos + 8 <= shp.len() {
        let words = BigEndian::read_i32(&shp[pos + 4..pos + 8]).max(0) as usize;
        let end = pos + 8 + 2 * words;
        contents.push(shp.get(pos + 8..end).ok_or_else(truncated)?);
        pos = end;
    }
    if contents.len() != expected {
        return Err(Error::Shapefile(format!(
            "expected {} shapes in {}, found {}",
            expected,
            source.display(),
            contents.len()
        )));
    }

    if LittleEndian::read_i32(&header[32..36]) == 0 {
        LittleEndian::write_i32(&mut header[32..36], shape_type_code(shape_type));
    }
    let mut out = header.clone();
    let mut index = header;
    let null_content = [0u8; 4];
    let mut shapes = contents.into_iter();

    for (i, has_geometry) in present.iter().enumerate() {
        let content: &[u8] = if *has_geometry {
            shapes.next().ok_or_else(truncated)?
        } else {
            &null_content
        };
        let words = (content.len() / 2) as i32;
        index.write_i32::<BigEndian>((out.len() / 2) as i32)?;
        index.write_i32::<BigEndian>(words)?;
        out.write_i32::<BigEndian>(i as i32 + 1)?;
        out.write_i32::<BigEndian>(words)?;
        out.extend_from_slice(content);
    }

    let out_words = (out.len() / 2) as i32;
    let index_words = (index.len() / 2) as i32;
    BigEndian::write_i32(&mut out[24..28], out_words);
    BigEndian::write_i32(&mut index[24..28], index_words);
    fs::write(dest, out)?;
    fs::write(dest.with_extension("shx"), index)?;
    Ok(())
}

/// Main file header with no records: file code 9994, version 1000, a null
/// shape type and an empty bounding box.
fn empty_header() -> Vec<u8> {
    let mut header = vec![0u8; SHP_HEADER_LEN];
    BigEndian::write_i32(&mut header[0..4], 9994);
    LittleEndian::write_i32(&mut header[28..32], 1000);
    header
}

// ─── shapefile -> geo-types ─────────────────────────────────────────────

fn shape_to_geometry(
    shape: Shape,
    index: usize,
    layer_type: ShapeType,
) -> Result<Option<Geometry<f64>>> {
    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Multipoint(mp) => Geometry::MultiPoint(MultiPoint::new(
            mp.points().iter().map(|p| Point::new(p.x, p.y)).collect(),
        )),
        Shape::Polyline(line) => Geometry::MultiLineString(MultiLineString::new(
            line.parts().iter().map(|part| to_line_string(part)).collect(),
        )),
        Shape::Polygon(polygon) => Geometry::MultiPolygon(rings_to_multipolygon(polygon.rings())),
        _ => {
            return Err(Error::UnsupportedShape {
                record: index,
                shape_type: format!("{:?}", layer_type),
            })
        }
    };
    Ok(Some(geometry))
}

fn to_line_string(points: &[shapefile::Point]) -> LineString<f64> {
    LineString::new(points.iter().map(|p| Coord { x: p.x, y: p.y }).collect())
}

/// Group rings into polygons: each outer ring starts a polygon and inner
/// rings attach to the outer ring that precedes them.
fn rings_to_multipolygon(rings: &[PolygonRing<shapefile::Point>]) -> MultiPolygon<f64> {
    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    for ring in rings {
        let line = to_line_string(ring.points());
        match (ring, polygons.last_mut()) {
            (PolygonRing::Inner(_), Some(last)) => last.interiors_push(line),
            _ => polygons.push(Polygon::new(line, vec![])),
        }
    }
    MultiPolygon::new(polygons)
}

// ─── geo-types -> shapefile ─────────────────────────────────────────────

fn mismatch(index: usize, kind: &str) -> Error {
    Error::GeometryMismatch {
        record: index,
        shape_type: kind.to_string(),
    }
}

fn to_shp_points(line: &LineString<f64>) -> Vec<shapefile::Point> {
    line.coords()
        .map(|c| shapefile::Point::new(c.x, c.y))
        .collect()
}

fn to_shp_polygon(geom: &Geometry<f64>, index: usize, kind: &str) -> Result<shapefile::Polygon> {
    let polygons: Vec<&Polygon<f64>> = match geom {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0.iter().collect(),
        _ => return Err(mismatch(index, kind)),
    };
    let mut rings = Vec::new();
    for polygon in polygons {
        rings.push(PolygonRing::Outer(to_shp_points(polygon.exterior())));
        for interior in polygon.interiors() {
            rings.push(PolygonRing::Inner(to_shp_points(interior)));
        }
    }
    if rings.is_empty() {
        return Err(mismatch(index, kind));
    }
    Ok(shapefile::Polygon::with_rings(rings))
}

fn to_shp_polyline(geom: &Geometry<f64>, index: usize, kind: &str) -> Result<shapefile::Polyline> {
    let parts: Vec<Vec<shapefile::Point>> = match geom {
        Geometry::LineString(ls) => vec![to_shp_points(ls)],
        Geometry::MultiLineString(mls) => mls.0.iter().map(to_shp_points).collect(),
        _ => return Err(mismatch(index, kind)),
    };
    if parts.is_empty() || parts.iter().any(|p| p.len() < 2) {
        return Err(mismatch(index, kind));
    }
    Ok(shapefile::Polyline::with_parts(parts))
}

fn to_shp_point(geom: &Geometry<f64>, index: usize, kind: &str) -> Result<shapefile::Point> {
    match geom {
        Geometry::Point(p) => Ok(shapefile::Point::new(p.x(), p.y())),
        _ => Err(mismatch(index, kind)),
    }
}

fn to_shp_multipoint(geom: &Geometry<f64>, index: usize, kind: &str) -> Result<shapefile::Multipoint> {
    match geom {
        Geometry::MultiPoint(mp) => Ok(shapefile::Multipoint::new(
            mp.0.iter().map(|p| shapefile::Point::new(p.x(), p.y())).collect(),
        )),
        _ => Err(mismatch(index, kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::dbase::{FieldName, FieldValue, Record};

    fn square(x0: f64, y0: f64, size: f64) -> Vec<shapefile::Point> {
        vec![
            shapefile::Point::new(x0, y0),
            shapefile::Point::new(x0, y0 + size),
            shapefile::Point::new(x0 + size, y0 + size),
            shapefile::Point::new(x0 + size, y0),
            shapefile::Point::new(x0, y0),
        ]
    }

    fn record(name: &str, code: &str) -> Record {
        let mut record = Record::default();
        record.insert("NAME".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("CODE".to_string(), FieldValue::Character(Some(code.to_string())));
        record
    }

    fn table() -> TableWriterBuilder {
        TableWriterBuilder::new()
            .add_character_field(FieldName::try_from("NAME").unwrap(), 40)
            .add_character_field(FieldName::try_from("CODE").unwrap(), 4)
    }

    /// Two-region polygon layer; the second region has a hole.
    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("regions.shp");
        let mut writer = shapefile::Writer::from_path(&path, table()).unwrap();
        let first = shapefile::Polygon::new(PolygonRing::Outer(square(0.0, 0.0, 10.0)));
        let mut hole = square(22.0, 2.0, 4.0);
        hole.reverse();
        let second = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(square(20.0, 0.0, 10.0)),
            PolygonRing::Inner(hole),
        ]);
        writer.write_shape_and_record(&first, &record("West", "10")).unwrap();
        writer.write_shape_and_record(&second, &record("East", "24")).unwrap();
        drop(writer);
        fs::write(path.with_extension("prj"), r#"PROJCS["Test",UNIT["Meter",1.0]]"#).unwrap();
        path
    }

    #[test]
    fn test_read_layer_groups_holes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let layer = read_layer(&path).unwrap();
        assert_eq!(layer.name, "regions");
        assert_eq!(layer.shape_type, ShapeType::Polygon);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.field_names(), vec!["NAME", "CODE"]);
        assert!(layer.crs.as_ref().unwrap().is_projected());

        match layer.features[1].geometry.as_ref().unwrap() {
            Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 1);
                assert_eq!(mp.0[0].interiors().len(), 1);
            }
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
        assert_eq!(
            layer.features[1].get_property("NAME"),
            Some(&FieldValue::Character(Some("East".to_string())))
        );
    }

    #[test]
    fn test_write_layer_keeps_records_and_prj() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path());
        let dst = dir.path().join("copy.shp");

        write_layer(read_layer(&src).unwrap(), &dst, &WriteOptions::default()).unwrap();

        let copy = read_layer(&dst).unwrap();
        let original = read_layer(&src).unwrap();
        assert_eq!(copy.len(), original.len());
        assert_eq!(copy.fields, original.fields);
        for (a, b) in copy.iter().zip(original.iter()) {
            assert_eq!(a.record, b.record);
        }
        assert!(dst.with_extension("prj").exists());
        // Only the layer files, no leftover staging directory
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".geoslim"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path());
        let before = fs::read(&src).unwrap();

        let err = write_layer(read_layer(&src).unwrap(), &src, &WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::OutputExists { .. }));
        assert_eq!(fs::read(&src).unwrap(), before);
    }

    #[test]
    fn test_overwrite_removes_stale_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path());
        let dst = dir.path().join("out.shp");
        fs::write(dst.with_extension("prj"), "stale").unwrap();
        fs::write(dst.with_extension("cpg"), "stale").unwrap();

        let mut layer = read_layer(&src).unwrap();
        layer.crs = None;
        write_layer(layer, &dst, &WriteOptions { overwrite: true }).unwrap();

        assert!(dst.exists());
        assert!(!dst.with_extension("prj").exists());
        assert!(!dst.with_extension("cpg").exists());
    }

    #[test]
    fn test_missing_layer_and_dbf() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_layer(dir.path().join("nope.shp")).unwrap_err();
        assert!(matches!(err, Error::MissingLayer { .. }));

        let src = write_fixture(dir.path());
        fs::remove_file(src.with_extension("dbf")).unwrap();
        let err = read_layer(&src).unwrap_err();
        assert!(matches!(err, Error::MissingSibling { .. }));
    }

    #[test]
    fn test_destination_checks() {
        let dir = tempfile::tempdir().unwrap();
        let opts = WriteOptions::default();

        let err = check_destination(&dir.path().join("out.geojson"), &opts).unwrap_err();
        assert!(matches!(err, Error::NotAShapefile { .. }));

        let err = check_destination(&dir.path().join("missing/out.shp"), &opts).unwrap_err();
        assert!(matches!(err, Error::MissingDirectory { .. }));

        assert!(check_destination(&dir.path().join("out.shp"), &opts).is_ok());
    }

    #[test]
    fn test_null_records_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path());
        let dst = dir.path().join("nulls.shp");

        let mut layer = read_layer(&src).unwrap();
        layer.features[0].geometry = None;
        write_layer(layer, &dst, &WriteOptions::default()).unwrap();

        let copy = read_layer(&dst).unwrap();
        let original = read_layer(&src).unwrap();
        assert_eq!(copy.shape_type, ShapeType::Polygon);
        assert_eq!(copy.len(), 2);
        assert!(copy.features[0].geometry.is_none());
        assert_eq!(copy.features[1].geometry, original.features[1].geometry);
        for (a, b) in copy.iter().zip(original.iter()) {
            assert_eq!(a.record, b.record);
        }
    }

    #[test]
    fn test_all_null_layer_keeps_shape_type() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path());
        let dst = dir.path().join("empty.shp");

        let mut layer = read_layer(&src).unwrap();
        for feature in &mut layer.features {
            feature.geometry = None;
        }
        write_layer(layer, &dst, &WriteOptions::default()).unwrap();

        let copy = read_layer(&dst).unwrap();
        assert_eq!(copy.shape_type, ShapeType::Polygon);
        assert_eq!(copy.len(), 2);
        assert!(copy.iter().all(|f| f.geometry.is_none()));
    }

    #[test]
    fn test_record_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_fixture(dir.path());

        let single = dir.path().join("single.shp");
        let mut writer = shapefile::Writer::from_path(&single, table()).unwrap();
        writer
            .write_shape_and_record(
                &shapefile::Polygon::new(PolygonRing::Outer(square(0.0, 0.0, 1.0))),
                &record("Only", "1"),
            )
            .unwrap();
        drop(writer);
        fs::copy(single.with_extension("dbf"), src.with_extension("dbf")).unwrap();

        let err = read_layer(&src).unwrap_err();
        assert!(matches!(
            err,
            Error::RecordCountMismatch {
                shapes: 2,
                records: 1,
                ..
            }
        ));
        assert_eq!(err.stage(), crate::Stage::Input);
    }

    #[test]
    fn test_polygon_z_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relief.shp");
        let ring: Vec<shapefile::PointZ> = square(0.0, 0.0, 10.0)
            .into_iter()
            .map(|p| shapefile::PointZ::new(p.x, p.y, 100.0, 0.0))
            .collect();
        let mut writer = shapefile::Writer::from_path(&path, table()).unwrap();
        writer
            .write_shape_and_record(
                &shapefile::PolygonZ::new(PolygonRing::Outer(ring)),
                &record("Hill", "1"),
            )
            .unwrap();
        drop(writer);

        let err = read_layer(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape { record: 0, .. }));
        assert_eq!(err.stage(), crate::Stage::Simplification);
    }
}
