//! `GeoJSON` output for `geoupload`.
//!
//! Features are written one at a time into a single `FeatureCollection`, so a
//! conversion never holds the whole collection in memory.

mod writer;

pub use writer::{
    FeatureCollectionWriter, GeoJsonWriteError, GeoJsonWriterOptions, to_geojson_feature,
    write_feature_collection,
};
