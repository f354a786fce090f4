//! Common types and traits shared across `geoupload` crates.
//!
//! This crate provides the core abstractions that are shared between
//! `geoupload-core` and the format reader crates, preventing circular dependencies.

pub mod crs;
pub mod descriptor;
pub mod drivers;
pub mod feature;
pub mod io;

// Re-export commonly used types
pub use crs::{Crs, CrsError};
pub use descriptor::FileDescriptor;
pub use drivers::{Driver, DriverCapabilities, SupportStatus};
pub use feature::{FeatureRecord, FieldInfo, Properties};
pub use format_shared::{AttributeValue, FormatReadError, FormatResult, SourcePosition};
pub use io::{Dataset, FeatureReader, FeatureStream};
