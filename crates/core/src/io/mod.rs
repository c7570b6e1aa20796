//! I/O operations for reading and writing boundary layers

mod shp;
mod staging;

pub use shp::{check_destination, read_layer, sibling_paths, write_layer, WriteOptions};
pub use staging::Staging;
