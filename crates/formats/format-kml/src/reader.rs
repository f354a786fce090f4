use std::path::Path;
use std::vec;

use format_shared::{AttributeValue, FormatReadError, FormatResult, SourcePosition};
use geo_types::Geometry;
use geoupload_core_common::io::{resolve_primary, type_name_of};
use geoupload_core_common::{Crs, Dataset, FeatureReader, FeatureRecord, FeatureStream, FileDescriptor};
use kml::types::Placemark;
use kml::{Kml, KmlReader};
use log::debug;

use crate::extended_data::extended_data_properties;

/// Opens KML and KMZ datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlFeatureReader;

impl FeatureReader for KmlFeatureReader {
    fn open(&self, work_dir: &Path, descriptor: &FileDescriptor) -> FormatResult<Box<dyn Dataset>> {
        let path = resolve_primary(work_dir, descriptor)?;
        let context = path.display().to_string();
        let is_kmz = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("kmz"));

        let document = if is_kmz {
            KmlReader::<_, f64>::from_kmz_path(&path)
                .and_then(|mut reader| reader.read())
        } else {
            KmlReader::<_, f64>::from_path(&path).and_then(|mut reader| reader.read())
        }
        .map_err(|err| FormatReadError::from_library(err, context.clone()))?;

        let mut placemarks = Vec::new();
        collect_placemarks(document, &mut placemarks);
        debug!("Found {} placemark(s) in {context}", placemarks.len());

        Ok(Box::new(KmlDataset {
            type_name: type_name_of(&path),
            context,
            placemarks: placemarks.into_iter().enumerate().collect::<Vec<_>>().into_iter(),
        }))
    }
}

/// Placemarks of a parsed KML document, in document order.
pub struct KmlDataset {
    type_name: String,
    context: String,
    placemarks: vec::IntoIter<(usize, Placemark<f64>)>,
}

impl Dataset for KmlDataset {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    /// KML coordinates are always WGS 84 longitude, latitude.
    fn native_crs(&self) -> Option<Crs> {
        Some(Crs::WGS84)
    }

    fn features(&mut self) -> FeatureStream<'_> {
        let type_name = self.type_name.as_str();
        let context = self.context.as_str();
        Box::new(self.placemarks.by_ref().map(move |(index, placemark)| {
            placemark_to_feature(type_name, index + 1, placemark).map_err(|err| {
                err.with_additional_context(context)
                    .at(SourcePosition::record(index as u64 + 1))
            })
        }))
    }
}

/// Placemarks may sit at any depth of documents and folders.
fn collect_placemarks(node: Kml<f64>, out: &mut Vec<Placemark<f64>>) {
    match node {
        Kml::KmlDocument(document) => {
            for element in document.elements {
                collect_placemarks(element, out);
            }
        },
        Kml::Document { elements, .. } | Kml::Folder { elements, .. } => {
            for element in elements {
                collect_placemarks(element, out);
            }
        },
        Kml::Placemark(placemark) => out.push(placemark),
        _ => {},
    }
}

fn placemark_to_feature(type_name: &str, number: usize, placemark: Placemark<f64>) -> FormatResult<FeatureRecord> {
    let id = placemark
        .attrs
        .get("id")
        .filter(|id| !id.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| format!("{type_name}.{number}"));

    let geometry = placemark
        .geometry
        .map(Geometry::<f64>::try_from)
        .transpose()
        .map_err(|err| FormatReadError::parse(format!("Unsupported placemark geometry: {err}")))?;

    let mut feature = FeatureRecord::new(id, geometry);
    if let Some(name) = placemark.name {
        feature.properties.insert("name".to_string(), AttributeValue::String(name));
    }
    if let Some(description) = placemark.description {
        feature
            .properties
            .insert("description".to_string(), AttributeValue::String(description));
    }
    feature
        .properties
        .extend(extended_data_properties(&placemark.children));
    Ok(feature)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use kml::types::{Element, Point};

    use super::*;

    #[test]
    fn placemark_id_attribute_wins() {
        let placemark = Placemark {
            geometry: Some(kml::types::Geometry::Point(Point::new(1.0, 2.0, None))),
            attrs: HashMap::from([("id".to_string(), "acc-17".to_string())]),
            ..Default::default()
        };
        let feature = placemark_to_feature("accidents", 1, placemark).unwrap();
        assert_eq!(feature.id, "acc-17");
        assert_eq!(
            feature.geometry,
            Some(Geometry::Point(geo_types::Point::new(1.0, 2.0)))
        );
    }

    #[test]
    fn unnamed_placemark_gets_positional_id() {
        let placemark = Placemark {
            name: Some("Bretagne".to_string()),
            children: vec![Element {
                name: "ExtendedData".to_string(),
                attrs: HashMap::new(),
                content: None,
                children: Vec::new(),
            }],
            ..Default::default()
        };
        let feature = placemark_to_feature("regions", 3, placemark).unwrap();
        assert_eq!(feature.id, "regions.3");
        assert!(feature.geometry.is_none());
        assert_eq!(
            feature.property("name"),
            Some(&AttributeValue::String("Bretagne".to_string()))
        );
    }

    #[test]
    fn placemarks_are_found_inside_folders() {
        let tree = Kml::Document {
            attrs: HashMap::new(),
            elements: vec![
                Kml::Folder {
                    attrs: HashMap::new(),
                    elements: vec![Kml::Placemark(Placemark::default())],
                },
                Kml::Placemark(Placemark::default()),
            ],
        };
        let mut out = Vec::new();
        collect_placemarks(tree, &mut out);
        assert_eq!(out.len(), 2);
    }
}
