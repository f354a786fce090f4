//! `geoupload-core` is the core library for `geoupload`, turning uploaded vector datasets
//! into `GeoJSON`.
//!
//! This crate includes:
//! - **Driver Registry**: A static registry of known formats and their capabilities.
//! - **Format Selection**: Dispatch from a primary file extension to the matching reader.
//! - **Reprojection**: Coordinate transformation between EPSG systems with an explicit
//!   axis-order policy.
//! - **Conversion**: The read, reproject and write pipeline producing one
//!   `FeatureCollection`.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use geoupload_core::{Crs, ConvertOptions, operations};
//!
//! # fn main() -> geoupload_core::Result<()> {
//! let (work_dir, descriptor) = operations::discover(Path::new("uploads/accidents.shp"))?;
//! let options = ConvertOptions::new().with_target_crs(Crs::WEB_MERCATOR);
//! let geojson = operations::convert_to_string(&descriptor, &work_dir, &options)?;
//! # Ok(())
//! # }
//! ```

pub mod drivers;
pub mod error;
pub mod operations;
pub mod reproject;
pub mod selector;
pub mod types;

pub use error::{
    ConfigError, GeoUploadError, ReadError, ReprojectionError, Result, UnsupportedFormatError,
    WriteError,
};
pub use geoupload_core_common::{Crs, CrsError, FeatureRecord, FieldInfo, FileDescriptor};
pub use reproject::{AxisOrder, Reprojector};
pub use selector::FormatReader;
pub use types::{ConversionOutcome, ConvertOptions, DatasetInfo};
