//! Coordinate Reference System handling
//!
//! Shapefiles carry their CRS as ESRI WKT in a sibling `.prj` file. We only
//! need enough of it to tell projected layers (linear units, usually meters)
//! from geographic ones (degrees), since the simplification tolerance is
//! expressed in the layer's native unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// Broad family of a CRS, as far as tolerance units are concerned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrsKind {
    /// Projected CRS with a linear unit
    Projected(LinearUnit),
    /// Geographic CRS, coordinates in angular units
    Geographic,
    /// WKT we could not classify
    Unknown,
}

/// Linear unit of a projected CRS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearUnit {
    /// Unit name as written in the WKT (e.g. "Meter")
    pub name: String,
    /// Conversion factor to meters
    pub to_meters: f64,
}

impl LinearUnit {
    pub fn meter() -> Self {
        Self {
            name: "Meter".to_string(),
            to_meters: 1.0,
        }
    }
}

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation (primary)
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
        }
    }

    /// Read the `.prj` sibling of a layer, if present.
    pub fn from_prj_file(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let wkt = std::fs::read_to_string(path)?;
        let wkt = wkt.trim();
        if wkt.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::from_wkt(wkt)))
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Name of the CRS: the first quoted string of the WKT root node.
    pub fn name(&self) -> Option<&str> {
        let wkt = self.wkt.as_deref()?;
        let start = wkt.find('"')? + 1;
        let len = wkt[start..].find('"')?;
        Some(&wkt[start..start + len])
    }

    /// Classify the CRS from its WKT root keyword or well-known EPSG codes.
    pub fn kind(&self) -> CrsKind {
        if let Some(wkt) = &self.wkt {
            let root = wkt.trim_start().to_ascii_uppercase();
            if root.starts_with("PROJCS[") || root.starts_with("PROJCRS[") {
                return CrsKind::Projected(linear_unit(wkt).unwrap_or_else(LinearUnit::meter));
            }
            if root.starts_with("GEOGCS[")
                || root.starts_with("GEOGCRS[")
                || root.starts_with("GEODCRS[")
            {
                return CrsKind::Geographic;
            }
            return CrsKind::Unknown;
        }
        match self.epsg {
            Some(4326) | Some(4269) | Some(4617) => CrsKind::Geographic,
            Some(3347) | Some(3857) => CrsKind::Projected(LinearUnit::meter()),
            _ => CrsKind::Unknown,
        }
    }

    /// Whether coordinates are in a linear unit
    pub fn is_projected(&self) -> bool {
        matches!(self.kind(), CrsKind::Projected(_))
    }

    /// Whether coordinates are in degrees
    pub fn is_geographic(&self) -> bool {
        self.kind() == CrsKind::Geographic
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(name) = self.name() {
            return name.to_string();
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt.char_indices().nth(50).map_or(wkt.len(), |(i, _)| i);
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

/// The projected unit is the last top-level `UNIT[...]` of a PROJCS, which
/// in practice is the last `UNIT[` in the string.
fn linear_unit(wkt: &str) -> Option<LinearUnit> {
    let upper = wkt.to_ascii_uppercase();
    let at = upper.rfind("UNIT[")? + "UNIT[".len();
    let body = &wkt[at..];
    let body = &body[..body.find(']')?];
    let mut parts = body.splitn(3, ',');
    let name = parts.next()?.trim().trim_matches('"').to_string();
    let to_meters = parts.next()?.trim().parse::<f64>().ok()?;
    Some(LinearUnit { name, to_meters })
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
