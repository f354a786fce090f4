//! ESRI Shapefile reader for `geoupload`.
//!
//! Reads the `.shp` geometry file together with its `.shx` index and `.dbf`
//! attribute table, and resolves the optional `.prj` to the dataset CRS.

pub mod prj;
mod reader;

pub use prj::crs_from_prj;
pub use reader::{ShapefileDataset, ShapefileReader};
