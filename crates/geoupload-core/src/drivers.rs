//! Driver registry for the upload formats and their capabilities.
//!
//! Each driver records the extensions that select it and the companion files a
//! dataset must bring along. The registry backs extension dispatch, companion
//! checks and the `drivers` listing of the CLI.
//!
//! # Examples
//!
//! ```
//! use geoupload_core::drivers::{find_driver, find_driver_by_extension};
//!
//! let kml = find_driver("kml").expect("KML driver should exist");
//! assert!(kml.capabilities.read.is_supported());
//!
//! let shapefile = find_driver_by_extension("SHP").expect("shp is registered");
//! assert_eq!(shapefile.companions, &["shx", "dbf"]);
//! ```

pub use geoupload_core_common::drivers::{Driver, DriverCapabilities, SupportStatus};

use SupportStatus::{NotSupported, Planned, Supported};

/// ESRI Shapefile: `.shp` geometry with `.shx` index and `.dbf` attributes.
pub const SHAPEFILE: Driver = Driver::new(
    "ESRI Shapefile",
    "ESRI Shapefile / DBF",
    &["shp"],
    Supported,
    Supported,
    NotSupported,
)
.with_companions(&["shx", "dbf"]);

/// Keyhole Markup Language, plain or zipped.
pub const KML: Driver = Driver::new(
    "KML",
    "Keyhole Markup Language (.kml .kmz)",
    &["kml", "kmz"],
    Supported,
    Supported,
    NotSupported,
);

/// Geography Markup Language feature collections.
pub const GML: Driver = Driver::new(
    "GML",
    "Geography Markup Language",
    &["gml", "xml"],
    Supported,
    Supported,
    NotSupported,
);

/// `GeoJSON`, the conversion output.
pub const GEOJSON: Driver = Driver::new(
    "GeoJSON",
    "GeoJSON",
    &["geojson", "json"],
    Planned,
    Planned,
    Supported,
);

/// Returns the complete registry of known drivers, regardless of support status.
#[must_use]
pub fn get_drivers() -> Vec<Driver> {
    vec![
        SHAPEFILE,
        KML,
        GML,
        GEOJSON,
        Driver::new("GPX", "GPS Exchange Format", &["gpx"], Planned, Planned, NotSupported),
        Driver::new("GPKG", "GeoPackage vector", &["gpkg"], Planned, Planned, NotSupported),
        Driver::new("FlatGeobuf", "FlatGeobuf", &["fgb"], Planned, Planned, NotSupported),
        Driver::new(
            "CSV",
            "Comma Separated Value (.csv)",
            &["csv"],
            NotSupported,
            NotSupported,
            NotSupported,
        ),
    ]
}

/// Returns all drivers that have at least one fully supported operation.
#[must_use]
pub fn get_available_drivers() -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| d.capabilities.has_supported_operation())
        .collect()
}

/// Finds a driver by its short name (case-insensitive).
#[must_use]
pub fn find_driver(name: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.short_name.eq_ignore_ascii_case(name))
}

/// Finds the driver selected by a primary file extension (case-insensitive, no dot).
#[must_use]
pub fn find_driver_by_extension(extension: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.handles_extension(extension))
}

/// Lists all drivers that support specific capabilities.
///
/// A `true` argument requires full support for that operation; `false` leaves it unconstrained.
///
/// ```
/// use geoupload_core::drivers::list_drivers_with_capability;
///
/// let readers = list_drivers_with_capability(true, false, false);
/// assert_eq!(readers.len(), 3);
/// ```
#[must_use]
pub fn list_drivers_with_capability(read: bool, write: bool, info: bool) -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| {
            let read_ok = !read || d.capabilities.read.is_supported();
            let write_ok = !write || d.capabilities.write.is_supported();
            let info_ok = !info || d.capabilities.info.is_supported();
            read_ok && write_ok && info_ok
        })
        .collect()
}

/// Returns all driver short names in alphabetically sorted order.
#[must_use]
pub fn get_driver_names() -> Vec<&'static str> {
    let mut names: Vec<_> = get_drivers().iter().map(|d| d.short_name).collect();
    names.sort_unstable();
    names
}

/// Extensions of every readable format, in registry order.
#[must_use]
pub fn readable_extensions() -> Vec<&'static str> {
    list_drivers_with_capability(true, false, false)
        .iter()
        .flat_map(|d| d.extensions.iter().copied())
        .collect()
}
