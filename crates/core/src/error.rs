//! Error types for geoslim

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an error belongs to.
///
/// Used by the CLI to name the failing stage and pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Download or archive extraction
    Fetch,
    /// Missing or invalid input layer, bad parameters, refused output path
    Input,
    /// Geometry engine failure while reducing or writing geometries
    Simplification,
}

impl Stage {
    /// Process exit code reported for a failure in this stage
    pub fn exit_code(self) -> u8 {
        match self {
            Stage::Fetch => 2,
            Stage::Input => 3,
            Stage::Simplification => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Input => write!(f, "input"),
            Stage::Simplification => write!(f, "simplification"),
        }
    }
}

/// Main error type for geoslim layer operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("layer not found: {}", path.display())]
    MissingLayer { path: PathBuf },

    #[error("missing sibling file {} for layer {}", sibling.display(), layer.display())]
    MissingSibling { layer: PathBuf, sibling: PathBuf },

    #[error("output directory does not exist: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("output already exists: {} (pass overwrite to replace it)", path.display())]
    OutputExists { path: PathBuf },

    #[error("shapefile path must end in .shp: {}", path.display())]
    NotAShapefile { path: PathBuf },

    #[error("no layer named '{name}' among: {}", available.join(", "))]
    UnknownLayer { name: String, available: Vec<String> },

    #[error("several layers found, pick one of: {}", candidates.join(", "))]
    AmbiguousLayer { candidates: Vec<String> },

    #[error("{shapes} shapes but {records} attribute records in {}", path.display())]
    RecordCountMismatch {
        path: PathBuf,
        shapes: usize,
        records: usize,
    },

    #[error("layer is in a geographic CRS ({crs}); a tolerance of {tolerance} would be read as degrees")]
    GeographicCrs { crs: String, tolerance: f64 },

    #[error("shapefile error: {0}")]
    Shapefile(String),

    #[error("unsupported shape type {shape_type} in record {record}")]
    UnsupportedShape { record: usize, shape_type: String },

    #[error("record {record}: geometry does not fit a {shape_type} layer")]
    GeometryMismatch { record: usize, shape_type: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl Error {
    /// Stage this error is reported under.
    pub fn stage(&self) -> Stage {
        match self {
            Error::UnsupportedShape { .. }
            | Error::GeometryMismatch { .. }
            | Error::Algorithm(_) => Stage::Simplification,
            _ => Stage::Input,
        }
    }
}

impl From<shapefile::Error> for Error {
    fn from(e: shapefile::Error) -> Self {
        Error::Shapefile(e.to_string())
    }
}

impl From<shapefile::dbase::Error> for Error {
    fn from(e: shapefile::dbase::Error) -> Self {
        Error::Shapefile(format!("dBase: {}", e))
    }
}

/// Result type alias for geoslim operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        let bad_tolerance = Error::InvalidParameter {
            name: "tolerance",
            value: "0".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(bad_tolerance.stage(), Stage::Input);

        let unsupported = Error::UnsupportedShape {
            record: 3,
            shape_type: "PolygonZ".into(),
        };
        assert_eq!(unsupported.stage(), Stage::Simplification);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            Stage::Fetch.exit_code(),
            Stage::Input.exit_code(),
            Stage::Simplification.exit_code(),
        ];
        assert!(codes.iter().all(|&c| c != 0));
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
    }
}
