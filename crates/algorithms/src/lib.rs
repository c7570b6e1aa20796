//! # geoslim Algorithms
//!
//! Vector algorithms for geoslim.
//!
//! ## Available Algorithm Categories
//!
//! - **vector**: simplification, measurements, layer summaries

pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::vector::{
        simplify_file, simplify_layer, summarize, LayerSimplify, LayerSummary, SimplifyMethod,
        SimplifyOptions, SimplifyParams, SimplifyReport,
    };
    pub use geoslim_core::prelude::*;
}
