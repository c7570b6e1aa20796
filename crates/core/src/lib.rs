//! # geoslim Core
//!
//! Core types, traits and I/O for geoslim.
//!
//! This crate provides:
//! - `BoundaryLayer`: a shapefile layer held in memory
//! - `CRS`: coordinate reference system read from `.prj` files
//! - Shapefile reading and all-or-nothing writing
//! - The `Algorithm` trait shared by layer transformations

pub mod crs;
pub mod error;
pub mod io;
pub mod vector;

pub use crs::{CrsKind, LinearUnit, CRS};
pub use error::{Error, Result, Stage};
pub use vector::{BoundaryLayer, Feature, FieldSpec};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result, Stage};
    pub use crate::vector::{BoundaryLayer, Feature};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in geoslim.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;
}
