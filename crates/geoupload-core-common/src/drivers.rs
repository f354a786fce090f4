//! Driver definitions for geospatial data format support and capabilities.
//!
//! A driver describes one format: the file extensions that identify it, the sibling
//! files that must travel with it, and the support status of its operations (info,
//! read, write). The registry itself lives in `geoupload-core`.

/// Support status for a specific driver operation.
///
/// Indicates whether a driver operation (info, read, or write) is currently supported,
/// planned for future implementation, or not supported at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The feature is fully supported and implemented.
    Supported,
    /// The feature is not supported by the driver.
    NotSupported,
    /// The feature is planned for future implementation.
    Planned,
}

impl SupportStatus {
    /// Returns `true` if the operation is fully supported and implemented.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    /// Returns `true` if the operation is supported or planned (i.e., not explicitly unsupported).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, SupportStatus::NotSupported)
    }

    /// Returns the string representation of this support status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
            SupportStatus::Planned => "Planned",
        }
    }
}

/// Capabilities supported by a geospatial data format driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverCapabilities {
    /// Support status for reading dataset metadata and information.
    pub info: SupportStatus,
    /// Support status for reading features from this format.
    pub read: SupportStatus,
    /// Support status for writing features to this format.
    pub write: SupportStatus,
}

impl DriverCapabilities {
    /// Returns `true` if at least one operation is supported or planned.
    #[must_use]
    pub fn has_any_support(&self) -> bool {
        self.info.is_available() || self.read.is_available() || self.write.is_available()
    }

    /// Returns `true` if at least one operation is fully supported and implemented.
    #[must_use]
    pub fn has_supported_operation(&self) -> bool {
        self.info.is_supported() || self.read.is_supported() || self.write.is_supported()
    }
}

/// Geospatial data format driver definition.
///
/// A driver represents support for a specific format (e.g., `KML`, `ESRI Shapefile`).
/// Extensions are lower-case and without the leading dot.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Short name used in the CLI and for driver identification (e.g., `"KML"`).
    pub short_name: &'static str,
    /// Long descriptive name for display purposes.
    pub long_name: &'static str,
    /// Extensions of the primary file that select this driver.
    pub extensions: &'static [&'static str],
    /// Extensions of sibling files that must be uploaded with the primary file.
    pub companions: &'static [&'static str],
    /// Operations supported by this driver (info, read, write).
    pub capabilities: DriverCapabilities,
}

impl Driver {
    /// Creates a new driver definition with specified capabilities.
    #[must_use]
    pub const fn new(
        short_name: &'static str,
        long_name: &'static str,
        extensions: &'static [&'static str],
        info: SupportStatus,
        read: SupportStatus,
        write: SupportStatus,
    ) -> Self {
        Self {
            short_name,
            long_name,
            extensions,
            companions: &[],
            capabilities: DriverCapabilities { info, read, write },
        }
    }

    /// Declares the sibling extensions required next to the primary file.
    #[must_use]
    pub const fn with_companions(mut self, companions: &'static [&'static str]) -> Self {
        self.companions = companions;
        self
    }

    /// Returns `true` if `extension` (any case, without dot) selects this driver.
    #[must_use]
    pub fn handles_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_extension_ignores_case() {
        let driver = Driver::new(
            "KML",
            "Keyhole Markup Language",
            &["kml", "kmz"],
            SupportStatus::Supported,
            SupportStatus::Supported,
            SupportStatus::NotSupported,
        );
        assert!(driver.handles_extension("KMZ"));
        assert!(!driver.handles_extension("gml"));
        assert!(driver.companions.is_empty());
    }

    #[test]
    fn capabilities_summaries() {
        let caps = DriverCapabilities {
            info: SupportStatus::Planned,
            read: SupportStatus::NotSupported,
            write: SupportStatus::NotSupported,
        };
        assert!(caps.has_any_support());
        assert!(!caps.has_supported_operation());
    }
}
