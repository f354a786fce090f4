//! Feature Reader Selector: maps a primary file extension to the reader for its format.

use std::path::Path;

use format_gml::GmlFeatureReader;
use format_kml::KmlFeatureReader;
use format_shapefile::ShapefileReader;
use geoupload_core_common::{Dataset, FeatureReader, FileDescriptor, FormatResult};
use log::debug;

use crate::drivers::{self, Driver, find_driver_by_extension};
use crate::error::{UnsupportedFormatError, unsupported_extension};

/// One variant per readable format.
#[derive(Debug, Clone, Copy)]
pub enum FormatReader {
    Shapefile(ShapefileReader),
    Kml(KmlFeatureReader),
    Gml(GmlFeatureReader),
}

impl FormatReader {
    /// Selects the reader for `extension` (any case, without the dot).
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormatError`] when no driver claims the extension or the
    /// driver cannot read, as for `GeoJSON`.
    pub fn for_extension(extension: &str) -> Result<Self, UnsupportedFormatError> {
        let driver = find_driver_by_extension(extension).ok_or_else(|| unsupported_extension(extension))?;
        let reader = match driver.short_name {
            "ESRI Shapefile" => Self::Shapefile(ShapefileReader),
            "KML" => Self::Kml(KmlFeatureReader),
            "GML" => Self::Gml(GmlFeatureReader),
            _ => {
                return Err(UnsupportedFormatError::NotReadable {
                    driver: driver.short_name.to_string(),
                });
            },
        };
        debug!("Selected the {} reader for '.{extension}'", driver.short_name);
        Ok(reader)
    }

    /// Selects the reader for the descriptor's primary file.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormatError`] when the primary file has no extension or no
    /// reader handles it.
    pub fn for_descriptor(descriptor: &FileDescriptor) -> Result<Self, UnsupportedFormatError> {
        let extension = descriptor.primary_extension().ok_or_else(|| {
            UnsupportedFormatError::MissingExtension {
                file: descriptor.original_name().to_string(),
                supported: drivers::readable_extensions().join(", "),
            }
        })?;
        Self::for_extension(&extension)
    }

    /// Registry entry of the format.
    #[must_use]
    pub fn driver(&self) -> &'static Driver {
        match self {
            Self::Shapefile(_) => &drivers::SHAPEFILE,
            Self::Kml(_) => &drivers::KML,
            Self::Gml(_) => &drivers::GML,
        }
    }
}

impl FeatureReader for FormatReader {
    fn open(&self, work_dir: &Path, descriptor: &FileDescriptor) -> FormatResult<Box<dyn Dataset>> {
        match self {
            Self::Shapefile(reader) => reader.open(work_dir, descriptor),
            Self::Kml(reader) => reader.open(work_dir, descriptor),
            Self::Gml(reader) => reader.open(work_dir, descriptor),
        }
    }
}
