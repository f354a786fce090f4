//! Error types for `geoupload` operations.
//!
//! A conversion fails in one of three ways the caller is expected to tell apart: the
//! upload has no reader ([`UnsupportedFormatError`]), its content cannot be read
//! ([`ReadError`]), or its coordinates cannot be moved to the requested system
//! ([`ReprojectionError`]). Output and option errors complete the taxonomy.

use std::path::PathBuf;

use format_geojson::GeoJsonWriteError;
use geoupload_core_common::{Crs, CrsError, FormatReadError};
use thiserror::Error;

/// Main error type for `geoupload` operations.
///
/// Display formatting is delegated to the underlying variants.
#[derive(Debug, Error)]
pub enum GeoUploadError {
    /// No reader handles the dataset
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    /// The dataset is incomplete or malformed
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The requested CRS is unknown or a coordinate cannot be transformed
    #[error(transparent)]
    Reprojection(#[from] ReprojectionError),

    /// The `GeoJSON` output could not be written
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The dataset's format has no reader.
#[derive(Debug, Error)]
pub enum UnsupportedFormatError {
    /// No driver claims the extension
    #[error("No reader for '.{extension}' files. Readable extensions: {supported}")]
    UnknownExtension {
        /// Extension of the primary file, lower-case
        extension: String,
        /// Comma-separated list of readable extensions
        supported: String,
    },

    /// The primary file has no extension to dispatch on
    #[error("Cannot tell the format of '{file}': it has no extension. Readable extensions: {supported}")]
    MissingExtension {
        /// Name of the primary file
        file: String,
        /// Comma-separated list of readable extensions
        supported: String,
    },

    /// A driver exists but cannot read
    #[error("Driver '{driver}' does not support reading")]
    NotReadable {
        /// The driver name
        driver: String,
    },
}

/// The dataset could not be read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A companion file required by the format is absent
    #[error("{driver} dataset '{dataset}' is missing required file(s): {missing}")]
    MissingCompanion {
        /// The dataset name
        dataset: String,
        /// The driver name
        driver: String,
        /// Comma-separated list of missing extensions
        missing: String,
    },

    /// The format reader rejected the content
    #[error("Failed to read {driver} dataset '{dataset}': {source}")]
    Format {
        /// The dataset name
        dataset: String,
        /// The driver name
        driver: String,
        /// The underlying reader error
        #[source]
        source: FormatReadError,
    },

    /// The files of an upload could not be listed
    #[error("Cannot list dataset files in '{path}': {source}")]
    Discover {
        /// The working directory
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Coordinates could not be reprojected.
#[derive(Debug, Error)]
pub enum ReprojectionError {
    /// The CRS has no known definition
    #[error("Unknown CRS: {0}")]
    UnknownCrs(#[from] CrsError),

    /// A coordinate failed to transform
    #[error("Cannot reproject feature '{feature}' from {from} to {to}: {message}")]
    Transform {
        /// Id of the feature being transformed
        feature: String,
        /// Source CRS
        from: Crs,
        /// Target CRS
        to: Crs,
        /// Message from the transformation library
        message: String,
    },
}

/// Output errors.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Serializing or writing `GeoJSON` failed
    #[error(transparent)]
    GeoJson(#[from] GeoJsonWriteError),

    /// The output file could not be created
    #[error("Failed to create output file '{path}': {source}")]
    Create {
        /// The output path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors.
///
/// These errors occur when options or configuration are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },
}

/// Type alias for Results using `GeoUploadError`.
pub type Result<T> = std::result::Result<T, GeoUploadError>;

impl GeoUploadError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedFormat(e) => format!("Unsupported format: {e}"),
            Self::Read(e) => e.user_message(),
            Self::Reprojection(e) => format!("Reprojection failed: {e}"),
            Self::Write(e) => format!("Output error: {e}"),
            Self::Config(e) => format!("Configuration error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedFormat(UnsupportedFormatError::NotReadable { .. }) => {
                Some("Run 'geoupload drivers' to see which formats can be read.".to_string())
            },
            Self::UnsupportedFormat(_) => Some(
                "Upload a Shapefile (.shp with .shx and .dbf), a KML/KMZ or a GML file.".to_string(),
            ),
            Self::Read(e) => e.recovery_suggestion(),
            Self::Reprojection(ReprojectionError::UnknownCrs(_)) => {
                Some("Use an EPSG identifier such as 'EPSG:3857'.".to_string())
            },
            Self::Config(_) => Some("Run 'geoupload convert --help' for accepted values.".to_string()),
            Self::Reprojection(_) | Self::Write(_) => None,
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// Recoverable errors can be fixed by retrying with different options.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Reprojection(ReprojectionError::UnknownCrs(_))
        )
    }
}

impl ReadError {
    fn user_message(&self) -> String {
        match self {
            Self::MissingCompanion {
                dataset,
                driver,
                missing,
            } => format!(
                "The {driver} upload '{dataset}' is incomplete.\n\nMissing files:\n{}",
                missing
                    .split(", ")
                    .map(|ext| format!("  - {dataset_stem}.{ext}", dataset_stem = stem(dataset)))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
            Self::Format { .. } | Self::Discover { .. } => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::MissingCompanion { .. } => {
                Some("Upload every file of the dataset together, for example as one zip.".to_string())
            },
            Self::Format { .. } => Some("Check the file format and ensure it's valid.".to_string()),
            Self::Discover { .. } => None,
        }
    }
}

fn stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// Helper to create [`UnsupportedFormatError::UnknownExtension`] listing the readable extensions.
#[must_use]
pub fn unsupported_extension(extension: &str) -> UnsupportedFormatError {
    UnsupportedFormatError::UnknownExtension {
        extension: extension.to_ascii_lowercase(),
        supported: crate::drivers::readable_extensions().join(", "),
    }
}
