//! Vector analysis algorithms
//!
//! Geometric operations on boundary layers:
//! - Simplify: reduce vertex count (Douglas-Peucker, Visvalingam)
//! - Filter: drop or keep regions by attribute value
//! - Invocation: file-to-file simplification with input and CRS checks
//! - Measurements: vertex count, area, length, perimeter, extent
//! - Summary: what a layer holds, for inspection

mod filter;
mod invocation;
mod measurements;
mod simplify;
mod summary;

pub use filter::{AttributeMatch, RegionFilter};
pub use invocation::{simplify_file, SimplifyOptions};
pub use measurements::{area, extent, length, perimeter, vertex_count};
pub use simplify::{
    simplify_dp, simplify_layer, simplify_vw, LayerSimplify, SimplifyMethod, SimplifyParams,
    SimplifyReport,
};
pub use summary::{summarize, Bounds, LayerSummary};
