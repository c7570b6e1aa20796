//! Layer summary: record count, schema, CRS, extent and vertex totals

use geoslim_core::{BoundaryLayer, CrsKind, FieldSpec};
use serde::Serialize;
use std::fmt;

use super::measurements::{area, extent, length, perimeter, vertex_count};

/// Envelope as (min_x, min_y, max_x, max_y)
pub type Bounds = (f64, f64, f64, f64);

/// Everything `geoslim info` reports about a layer
#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub name: String,
    pub shape_type: String,
    pub records: usize,
    pub null_geometries: usize,
    pub fields: Vec<FieldSpec>,
    pub crs: Option<String>,
    /// Linear unit when the CRS is projected, "degree" when geographic
    pub unit: Option<String>,
    pub bounds: Option<Bounds>,
    pub vertices: usize,
    pub area: f64,
    pub perimeter: f64,
    pub length: f64,
}

/// Summarize a layer.
pub fn summarize(layer: &BoundaryLayer) -> LayerSummary {
    let geometries: Vec<_> = layer.iter().filter_map(|f| f.geometry.as_ref()).collect();

    let unit = layer.crs.as_ref().and_then(|crs| match crs.kind() {
        CrsKind::Projected(unit) => Some(unit.name),
        CrsKind::Geographic => Some("degree".to_string()),
        CrsKind::Unknown => None,
    });

    LayerSummary {
        name: layer.name.clone(),
        shape_type: format!("{:?}", layer.shape_type),
        records: layer.len(),
        null_geometries: layer.len() - geometries.len(),
        fields: layer.fields.clone(),
        crs: layer.crs.as_ref().map(|c| c.identifier()),
        unit,
        bounds: extent(geometries.iter().copied())
            .map(|r| (r.min().x, r.min().y, r.max().x, r.max().y)),
        vertices: geometries.iter().map(|g| vertex_count(g)).sum(),
        area: geometries.iter().map(|g| area(g)).sum(),
        perimeter: geometries.iter().map(|g| perimeter(g)).sum(),
        length: geometries.iter().map(|g| length(g)).sum(),
    }
}

impl fmt::Display for LayerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Layer: {}", self.name)?;
        writeln!(f, "Shape type: {}", self.shape_type)?;
        writeln!(f, "Records: {}", self.records)?;
        if self.null_geometries > 0 {
            writeln!(f, "Null geometries: {}", self.null_geometries)?;
        }
        match (&self.crs, &self.unit) {
            (Some(crs), Some(unit)) => writeln!(f, "CRS: {} ({})", crs, unit)?,
            (Some(crs), None) => writeln!(f, "CRS: {}", crs)?,
            _ => writeln!(f, "CRS: none (.prj missing)")?,
        }
        if let Some((min_x, min_y, max_x, max_y)) = self.bounds {
            writeln!(
                f,
                "Bounds: ({:.3}, {:.3}) - ({:.3}, {:.3})",
                min_x, min_y, max_x, max_y
            )?;
        }
        writeln!(f, "Vertices: {}", self.vertices)?;
        if self.area > 0.0 {
            writeln!(f, "Area: {:.3}", self.area)?;
            writeln!(f, "Perimeter: {:.3}", self.perimeter)?;
        }
        if self.length > 0.0 {
            writeln!(f, "Length: {:.3}", self.length)?;
        }
        writeln!(f, "Fields:")?;
        for field in &self.fields {
            writeln!(f, "  {} ({}, {})", field.name, field.kind, field.length)?;
        }
        Ok(())
    }
}
