use std::fs;
use std::path::Path;
use std::vec;

use format_shared::{AttributeValue, FormatReadError, FormatResult, infer_scalar};
use geoupload_core_common::crs::ParsedCrs;
use geoupload_core_common::io::{resolve_primary, type_name_of};
use geoupload_core_common::{Crs, Dataset, FeatureReader, FeatureRecord, FeatureStream, FileDescriptor};
use log::{debug, warn};
use roxmltree::{Document, Node};

use crate::geometry::{GeometryParser, is_geometry_element};

/// Opens GML feature collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmlFeatureReader;

impl FeatureReader for GmlFeatureReader {
    fn open(&self, work_dir: &Path, descriptor: &FileDescriptor) -> FormatResult<Box<dyn Dataset>> {
        let path = resolve_primary(work_dir, descriptor)?;
        let context = path.display().to_string();
        let text = fs::read_to_string(&path).map_err(|source| FormatReadError::Io {
            source,
            context: Some(context.clone()),
        })?;
        let document =
            Document::parse(&text).map_err(|err| FormatReadError::from_library(err, context.clone()))?;

        let collection = FeatureCollection::read(&document, &type_name_of(&path))
            .map_err(|err| err.with_additional_context(context.clone()))?;
        debug!(
            "Read {} GML feature(s) of type '{}' from {context}",
            collection.features.len(),
            collection.type_name
        );

        Ok(Box::new(GmlDataset {
            type_name: collection.type_name,
            native_crs: collection.native_crs.map(|parsed| parsed.crs),
            features: collection
                .features
                .into_iter()
                .map(|feature| feature.map_err(|err| err.with_additional_context(context.clone())))
                .collect::<Vec<_>>()
                .into_iter(),
        }))
    }
}

/// A decoded GML feature collection.
///
/// Geometry errors are kept per feature and surface when the stream reaches them.
pub struct GmlDataset {
    type_name: String,
    native_crs: Option<Crs>,
    features: vec::IntoIter<FormatResult<FeatureRecord>>,
}

impl Dataset for GmlDataset {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn native_crs(&self) -> Option<Crs> {
        self.native_crs
    }

    fn features(&mut self) -> FeatureStream<'_> {
        Box::new(self.features.by_ref())
    }
}

struct FeatureCollection {
    type_name: String,
    native_crs: Option<ParsedCrs>,
    features: Vec<FormatResult<FeatureRecord>>,
}

impl FeatureCollection {
    fn read(document: &Document<'_>, fallback_type_name: &str) -> FormatResult<Self> {
        let root = document.root_element();
        let native_crs = match root.descendants().find(|n| n.attribute("srsName").is_some()) {
            Some(node) => srs_of(node)?,
            None => None,
        };

        let members: Vec<Node<'_, '_>> = root
            .children()
            .filter(Node::is_element)
            .flat_map(|member| {
                let features = member.children().filter(Node::is_element);
                let selected: Vec<Node<'_, '_>> = match member.tag_name().name() {
                    "featureMember" | "member" => features.take(1).collect(),
                    "featureMembers" => features.collect(),
                    _ => Vec::new(),
                };
                selected
            })
            .collect();

        let type_name = members
            .first()
            .map_or_else(|| fallback_type_name.to_string(), |n| n.tag_name().name().to_string());
        let features = members
            .into_iter()
            .enumerate()
            .map(|(index, node)| read_feature(node, index + 1, native_crs))
            .collect();

        Ok(Self {
            type_name,
            native_crs,
            features,
        })
    }
}

fn read_feature(node: Node<'_, '_>, number: usize, native_crs: Option<ParsedCrs>) -> FormatResult<FeatureRecord> {
    let id = node
        .attributes()
        .find(|attr| matches!(attr.name(), "id" | "fid"))
        .map_or_else(
            || format!("{}.{number}", node.tag_name().name()),
            |attr| attr.value().to_string(),
        );
    let mut feature = FeatureRecord::new(id, None);

    for property in node.children().filter(Node::is_element) {
        let name = property.tag_name().name();
        if name == "boundedBy" {
            continue;
        }

        if let Some(geometry_node) = property.children().find(|n| is_geometry_element(*n)) {
            if feature.geometry.is_some() {
                debug!("Ignoring extra geometry property '{name}' on feature {}", feature.id);
                continue;
            }
            let own_srs = match geometry_node
                .ancestors()
                .find(|n| n.attribute("srsName").is_some())
            {
                Some(node) => srs_of(node)?,
                None => None,
            };
            let srs = own_srs.or(native_crs);
            let swap_axes = srs.is_some_and(|parsed| {
                parsed.authority_axis_order && parsed.crs.is_geographic().unwrap_or(false)
            });
            feature.geometry = Some(GeometryParser::new(swap_axes).parse(geometry_node)?);
            if let Some(parsed) = srs
                && Some(parsed.crs) != native_crs.map(|n| n.crs)
            {
                feature.crs = Some(parsed.crs);
            }
        } else if property.children().any(|n| n.is_element()) {
            debug!("Skipping complex property '{name}' on feature {}", feature.id);
        } else {
            let value = property
                .text()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map_or(AttributeValue::Null, infer_scalar);
            feature.properties.insert(name.to_string(), value);
        }
    }
    Ok(feature)
}

/// CRS declared by `srsName`. A name that resolves to no EPSG system is an error.
fn srs_of(node: Node<'_, '_>) -> FormatResult<Option<ParsedCrs>> {
    let Some(srs_name) = node.attribute("srsName") else {
        return Ok(None);
    };
    match Crs::parse_with_axis_hint(srs_name) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn!("{err}");
            Err(FormatReadError::UnknownCrs {
                identifier: srs_name.to_string(),
                context: None,
            })
        },
    }
}
