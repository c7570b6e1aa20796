//! Boundary layer data structures
//!
//! A [`BoundaryLayer`] is the in-memory form of one shapefile: a shape type,
//! an attribute schema, an optional CRS and one [`Feature`] per record.
//! Geometries are held as `geo-types` so the geometry library can work on
//! them directly; attribute records are kept exactly as read so the schema
//! and values survive a rewrite untouched.

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use shapefile::dbase::{Record, TableInfo};
use shapefile::ShapeType;
use std::fmt;

use crate::crs::CRS;

/// Description of one attribute column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// dBase field type, e.g. "Character" or "Numeric"
    pub kind: String,
    /// Declared width in bytes
    pub length: u8,
}

/// A geographic feature: one geometry and its attribute record
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry, `None` for null shapes
    pub geometry: Option<Geometry<f64>>,
    /// Attribute values, as stored in the `.dbf`
    pub record: Record,
}

impl Feature {
    pub fn new(geometry: Option<Geometry<f64>>, record: Record) -> Self {
        Self { geometry, record }
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&shapefile::dbase::FieldValue> {
        self.record.get(key)
    }
}

/// A named collection of region geometries with their attributes
pub struct BoundaryLayer {
    /// Layer name, the file stem of the `.shp`
    pub name: String,
    pub shape_type: ShapeType,
    pub crs: Option<CRS>,
    /// Contents of the `.cpg` sibling, if any
    pub code_page: Option<String>,
    pub fields: Vec<FieldSpec>,
    /// dBase table layout, reused verbatim on write
    pub table: TableInfo,
    pub features: Vec<Feature>,
}

impl BoundaryLayer {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Debug for BoundaryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryLayer")
            .field("name", &self.name)
            .field("shape_type", &self.shape_type)
            .field("crs", &self.crs)
            .field("fields", &self.fields)
            .field("features", &self.features.len())
            .finish()
    }
}
