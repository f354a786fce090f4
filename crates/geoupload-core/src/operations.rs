//! Conversion operations.
//!
//! [`convert`] is the Conversion Orchestrator: it selects a reader from the primary file
//! extension, opens the dataset from the working directory, reprojects each feature when
//! a target CRS is requested and streams the result as one `GeoJSON` `FeatureCollection`.
//! [`inspect`] reads a dataset once to summarize it.

use std::collections::BTreeSet;
use std::collections::btree_map::{BTreeMap, Entry};
use std::io::Write;
use std::path::{Path, PathBuf};

use format_geojson::{FeatureCollectionWriter, GeoJsonWriterOptions};
use geo::BoundingRect;
use geo_types::{Geometry, Rect, coord};
use geoupload_core_common::{
    Crs, CrsError, Dataset, FeatureReader, FieldInfo, FileDescriptor, FormatReadError,
};
use log::{debug, info, warn};

use crate::drivers::Driver;
use crate::error::{GeoUploadError, ReadError, ReprojectionError, Result, WriteError};
use crate::reproject::{AxisOrder, Reprojector};
use crate::selector::FormatReader;
use crate::types::{ConversionOutcome, ConvertOptions, DatasetInfo};

/// Builds the descriptor of the dataset whose primary file is `input`.
///
/// The working directory is the parent of `input`; every sibling sharing its stem joins
/// the descriptor, as the files of an unpacked upload would.
///
/// # Errors
///
/// Returns [`ReadError::Discover`] if the directory cannot be listed.
pub fn discover(input: &Path) -> Result<(PathBuf, FileDescriptor)> {
    let work_dir = input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let descriptor = FileDescriptor::discover(&work_dir, input).map_err(|source| ReadError::Discover {
        path: work_dir.clone(),
        source,
    })?;
    Ok((work_dir, descriptor))
}

/// Converts the dataset described by `descriptor` to `GeoJSON`, writing it to `sink`.
///
/// Nothing is written for a dataset without features; the outcome is then
/// [`ConversionOutcome::Empty`].
///
/// # Errors
///
/// - [`GeoUploadError::UnsupportedFormat`](crate::error::GeoUploadError::UnsupportedFormat)
///   when no reader handles the primary file.
/// - [`GeoUploadError::Read`](crate::error::GeoUploadError::Read) when files are missing or
///   malformed.
/// - [`GeoUploadError::Reprojection`](crate::error::GeoUploadError::Reprojection) when the
///   target or a declared source CRS is unknown, or a coordinate fails to transform.
/// - [`GeoUploadError::Write`](crate::error::GeoUploadError::Write) when the sink fails.
pub fn convert<W: Write>(
    descriptor: &FileDescriptor,
    work_dir: &Path,
    options: &ConvertOptions,
    sink: W,
) -> Result<ConversionOutcome> {
    let reader = FormatReader::for_descriptor(descriptor)?;
    let driver = reader.driver();
    info!("Starting conversion:");
    info!(
        "Input: {} (Driver: {})",
        descriptor.original_name(),
        driver.short_name
    );

    if let Some(target) = options.target_crs {
        target.definition().map_err(ReprojectionError::from)?;
        info!("Target CRS: {target} (axis order: {})", options.axis_order);
    }

    let mut dataset = open_dataset(reader, descriptor, work_dir)?;
    let source_crs = dataset.native_crs().unwrap_or_else(|| {
        warn!(
            "{} declares no CRS, assuming {}",
            descriptor.original_name(),
            options.default_crs
        );
        options.default_crs
    });
    let target_crs = options.target_crs.unwrap_or(source_crs);
    // Without a target, coordinates stay in the source system and keep (x, y) order.
    let axis_order = if options.target_crs.is_some() {
        options.axis_order
    } else {
        AxisOrder::ForceXy
    };
    let mut reprojectors = ReprojectorCache::new(target_crs, axis_order);

    let mut features = dataset.features();
    let Some(first) = features.next() else {
        info!("{} contains no features", descriptor.original_name());
        return Ok(ConversionOutcome::Empty);
    };
    let first = first.map_err(|source| read_error(descriptor, driver, source))?;

    let mut writer = FeatureCollectionWriter::new(
        sink,
        GeoJsonWriterOptions::new().with_pretty(options.pretty),
    )
    .map_err(WriteError::from)?;

    let mut next = Some(first);
    while let Some(feature) = next {
        let feature_crs = feature.crs.unwrap_or(source_crs);
        let feature = reprojectors.get(feature_crs)?.reproject_feature(feature)?;
        writer.write_feature(&feature).map_err(WriteError::from)?;

        next = features
            .next()
            .transpose()
            .map_err(|source| read_error(descriptor, driver, source))?;
    }

    let written = writer.written();
    writer.finish().map_err(WriteError::from)?;
    info!("Conversion completed successfully: {written} feature(s) in {target_crs}");

    Ok(ConversionOutcome::Written {
        features: written,
        source_crs,
        target_crs,
    })
}

/// Converts into memory. Returns `None` when the dataset has no features.
///
/// # Errors
///
/// Same as [`convert`].
pub fn convert_to_string(
    descriptor: &FileDescriptor,
    work_dir: &Path,
    options: &ConvertOptions,
) -> Result<Option<String>> {
    let mut buffer = Vec::new();
    let outcome = convert(descriptor, work_dir, options, &mut buffer)?;
    Ok(match outcome {
        ConversionOutcome::Empty => None,
        ConversionOutcome::Written { .. } => Some(String::from_utf8_lossy(&buffer).into_owned()),
    })
}

/// Reads the whole dataset once and summarizes it.
///
/// Formats without a declared schema report the properties seen on the features, typed
/// by their first non-null value.
///
/// # Errors
///
/// Returns [`GeoUploadError::UnsupportedFormat`](crate::error::GeoUploadError::UnsupportedFormat)
/// or [`GeoUploadError::Read`](crate::error::GeoUploadError::Read) as [`convert`] does.
pub fn inspect(descriptor: &FileDescriptor, work_dir: &Path) -> Result<DatasetInfo> {
    let reader = FormatReader::for_descriptor(descriptor)?;
    let driver = reader.driver();
    let mut dataset = open_dataset(reader, descriptor, work_dir)?;

    let crs = dataset.native_crs();
    let type_name = dataset.type_name().to_string();
    let declared = dataset.fields();
    let mut seen: Vec<FieldInfo> = Vec::new();
    let mut feature_count = 0;
    let mut geometry_types = BTreeSet::new();
    let mut extent: Option<Rect<f64>> = None;

    for item in dataset.features() {
        let feature = item.map_err(|source| read_error(descriptor, driver, source))?;
        feature_count += 1;

        if let Some(geometry) = &feature.geometry {
            geometry_types.insert(geometry_type_name(geometry).to_string());
            if let Some(rect) = geometry.bounding_rect() {
                extent = Some(extent.map_or(rect, |current| merge_rects(current, rect)));
            }
        }

        if declared.is_empty() {
            for (name, value) in &feature.properties {
                match seen.iter_mut().find(|field| field.name == *name) {
                    Some(field) if field.data_type == "Null" => {
                        field.data_type = value.type_name().to_string();
                    },
                    Some(_) => {},
                    None => seen.push(FieldInfo::new(name.clone(), value.type_name())),
                }
            }
        }
    }
    debug!("Inspected {feature_count} feature(s) of {}", descriptor.original_name());

    Ok(DatasetInfo {
        dataset: descriptor.original_name().to_string(),
        driver: driver.short_name.to_string(),
        driver_long_name: driver.long_name.to_string(),
        type_name,
        files: descriptor
            .files()
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        crs,
        feature_count,
        geometry_types: geometry_types.into_iter().collect(),
        extent,
        fields: if declared.is_empty() { seen } else { declared },
    })
}

fn open_dataset(
    reader: FormatReader,
    descriptor: &FileDescriptor,
    work_dir: &Path,
) -> Result<Box<dyn Dataset>> {
    let driver = reader.driver();
    let missing = descriptor.missing_companions(driver.companions);
    if !missing.is_empty() {
        return Err(ReadError::MissingCompanion {
            dataset: descriptor.original_name().to_string(),
            driver: driver.short_name.to_string(),
            missing: missing.join(", "),
        }
        .into());
    }

    debug!(
        "Opening {} from {}",
        descriptor.original_name(),
        work_dir.display()
    );
    reader
        .open(work_dir, descriptor)
        .map_err(|source| read_error(descriptor, driver, source))
}

/// Reader failures are [`ReadError`]s, except an unresolvable declared CRS which is a
/// [`ReprojectionError::UnknownCrs`].
fn read_error(descriptor: &FileDescriptor, driver: &Driver, source: FormatReadError) -> GeoUploadError {
    match source {
        FormatReadError::UnknownCrs { identifier, .. } => {
            ReprojectionError::UnknownCrs(CrsError::Unrecognized { identifier }).into()
        },
        source => ReadError::Format {
            dataset: descriptor.original_name().to_string(),
            driver: driver.short_name.to_string(),
            source,
        }
        .into(),
    }
}

/// One [`Reprojector`] per source CRS met in the stream.
struct ReprojectorCache {
    target: Crs,
    axis_order: AxisOrder,
    by_source: BTreeMap<Crs, Reprojector>,
}

impl ReprojectorCache {
    fn new(target: Crs, axis_order: AxisOrder) -> Self {
        Self {
            target,
            axis_order,
            by_source: BTreeMap::new(),
        }
    }

    fn get(&mut self, source: Crs) -> std::result::Result<&Reprojector, ReprojectionError> {
        let reprojector: &Reprojector = match self.by_source.entry(source) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("Reprojecting from {source} to {}", self.target);
                entry.insert(Reprojector::new(source, self.target, self.axis_order)?)
            },
        };
        Ok(reprojector)
    }
}

fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use geo_types::{LineString, Point};
    use tempfile::TempDir;

    use super::*;
    use crate::error::UnsupportedFormatError;

    const POINT_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
  <Placemark><name>Rennes</name><Point><coordinates>-1.68,48.11</coordinates></Point></Placemark>
</Document></kml>"#;

    fn write(dir: &Path, name: &str, content: &str) -> FileDescriptor {
        fs::write(dir.join(name), content).unwrap();
        FileDescriptor::single(name)
    }

    #[test]
    fn test_convert_kml_to_geojson() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = write(temp_dir.path(), "city.kml", POINT_KML);

        let mut out = Vec::new();
        let outcome = convert(&descriptor, temp_dir.path(), &ConvertOptions::default(), &mut out).unwrap();
        assert_eq!(
            outcome,
            ConversionOutcome::Written {
                features: 1,
                source_crs: Crs::WGS84,
                target_crs: Crs::WGS84,
            }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(r#"{"type":"FeatureCollection","features":["#));
        assert!(text.contains(r#""name":"Rennes""#));
    }

    #[test]
    fn test_empty_dataset_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = write(
            temp_dir.path(),
            "empty.kml",
            r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document></Document></kml>"#,
        );

        let mut out = Vec::new();
        let outcome = convert(&descriptor, temp_dir.path(), &ConvertOptions::default(), &mut out).unwrap();
        assert!(outcome.is_empty());
        assert!(out.is_empty());
        assert_eq!(
            convert_to_string(&descriptor, temp_dir.path(), &ConvertOptions::default()).unwrap(),
            None
        );
    }

    #[test]
    fn test_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = write(temp_dir.path(), "drawing.dxf", "0\nSECTION\n");
        let err = convert(&descriptor, temp_dir.path(), &ConvertOptions::default(), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            GeoUploadError::UnsupportedFormat(UnsupportedFormatError::UnknownExtension { .. })
        ));
    }

    #[test]
    fn test_missing_companions() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = write(temp_dir.path(), "roads.shp", "");
        let err = convert(&descriptor, temp_dir.path(), &ConvertOptions::default(), Vec::new()).unwrap_err();
        match err {
            GeoUploadError::Read(ReadError::MissingCompanion { missing, .. }) => {
                assert_eq!(missing, "shx, dbf");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_target_crs_fails_before_reading() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = write(temp_dir.path(), "city.kml", POINT_KML);
        let options = ConvertOptions::new().with_target_crs(Crs::from_epsg(9));
        let err = convert(&descriptor, temp_dir.path(), &options, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            GeoUploadError::Reprojection(ReprojectionError::UnknownCrs(_))
        ));
    }

    #[test]
    fn test_inspect_kml() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = write(temp_dir.path(), "city.kml", POINT_KML);
        let info = inspect(&descriptor, temp_dir.path()).unwrap();
        assert_eq!(info.driver, "KML");
        assert_eq!(info.type_name, "city");
        assert_eq!(info.feature_count, 1);
        assert_eq!(info.geometry_types, vec!["Point"]);
        assert_eq!(info.crs, Some(Crs::WGS84));
        assert_eq!(info.fields, vec![FieldInfo::new("name", "String")]);
        let extent = info.extent.unwrap();
        assert!((extent.min().x - -1.68).abs() < 1e-12);
    }

    #[test]
    fn test_discover_uses_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("city.kml"), POINT_KML).unwrap();
        let (work_dir, descriptor) = discover(&temp_dir.path().join("city.kml")).unwrap();
        assert_eq!(work_dir, temp_dir.path());
        assert_eq!(descriptor.primary_extension().as_deref(), Some("kml"));
    }

    #[test]
    fn test_geometry_type_names() {
        assert_eq!(geometry_type_name(&Geometry::Point(Point::new(0.0, 0.0))), "Point");
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(geometry_type_name(&Geometry::LineString(line)), "LineString");
    }

    #[test]
    fn test_merge_rects() {
        let a = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let b = Rect::new(coord! { x: -1.0, y: 0.5 }, coord! { x: 0.5, y: 3.0 });
        let merged = merge_rects(a, b);
        assert_eq!(merged.min(), coord! { x: -1.0, y: 0.0 });
        assert_eq!(merged.max(), coord! { x: 1.0, y: 3.0 });
    }
}
