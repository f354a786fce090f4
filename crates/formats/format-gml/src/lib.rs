//! GML feature collection reader for `geoupload`.
//!
//! Handles GML 2 and GML 3 simple features: one geometry property per feature plus
//! flat scalar properties. XML parsing is done by `roxmltree`; the document is read
//! whole, so this reader suits upload-sized files rather than bulk exports.

mod geometry;
mod reader;

pub use geometry::{GeometryParser, is_geometry_element};
pub use reader::{GmlDataset, GmlFeatureReader};
