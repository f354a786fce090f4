//! KML and KMZ reader for `geoupload`.
//!
//! Parsing is delegated to the `kml` crate. This crate walks the parsed document for
//! placemarks and turns each one into a [`FeatureRecord`](geoupload_core_common::FeatureRecord),
//! keeping `ExtendedData` fields as properties.

mod extended_data;
mod reader;

pub use extended_data::extended_data_properties;
pub use reader::{KmlDataset, KmlFeatureReader};
