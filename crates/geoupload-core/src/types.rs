//! Data types for conversion operations.
//!
//! This module defines the options and results of [`convert`](crate::operations::convert)
//! and the dataset summary returned by [`inspect`](crate::operations::inspect).

use geo_types::Rect;
use geoupload_core_common::{Crs, FieldInfo};

use crate::reproject::AxisOrder;

/// Options of a conversion.
///
/// Passed explicitly to every call; nothing here is read from process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// CRS of the output. `None` keeps the source CRS and skips reprojection.
    pub target_crs: Option<Crs>,
    /// Axis order of written coordinates when a target CRS is given
    pub axis_order: AxisOrder,
    /// CRS assumed for datasets that declare none
    pub default_crs: Crs,
    /// Pretty-print the `GeoJSON` output
    pub pretty: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            target_crs: None,
            axis_order: AxisOrder::ForceXy,
            default_crs: Crs::WGS84,
            pretty: false,
        }
    }
}

impl ConvertOptions {
    /// Create new options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output CRS
    #[must_use]
    pub fn with_target_crs(mut self, crs: Crs) -> Self {
        self.target_crs = Some(crs);
        self
    }

    /// Set the output axis order
    #[must_use]
    pub fn with_axis_order(mut self, axis_order: AxisOrder) -> Self {
        self.axis_order = axis_order;
        self
    }

    /// Set the CRS assumed when the dataset declares none
    #[must_use]
    pub fn with_default_crs(mut self, crs: Crs) -> Self {
        self.default_crs = crs;
        self
    }

    /// Set whether the output is pretty-printed
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Result of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The dataset holds no features; nothing was written to the sink.
    Empty,
    /// A `FeatureCollection` was written.
    Written {
        /// Number of features written
        features: usize,
        /// CRS the features were read in
        source_crs: Crs,
        /// CRS of the written coordinates
        target_crs: Crs,
    },
}

impl ConversionOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ConversionOutcome::Empty)
    }

    /// Number of features written, zero when empty.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        match self {
            ConversionOutcome::Empty => 0,
            ConversionOutcome::Written { features, .. } => *features,
        }
    }
}

/// Information about a dataset.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Name of the dataset
    pub dataset: String,
    /// Driver name
    pub driver: String,
    /// Driver long name
    pub driver_long_name: String,
    /// Feature type (layer) name
    pub type_name: String,
    /// Files making up the dataset
    pub files: Vec<String>,
    /// CRS declared by the dataset
    pub crs: Option<Crs>,
    /// Number of features
    pub feature_count: usize,
    /// Distinct geometry types, sorted
    pub geometry_types: Vec<String>,
    /// Bounding box of all geometries, in the dataset CRS
    pub extent: Option<Rect<f64>>,
    /// Schema fields
    pub fields: Vec<FieldInfo>,
}
