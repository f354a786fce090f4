//! Feature records produced by the format readers.

use format_shared::AttributeValue;
use geo_types::Geometry;
use indexmap::IndexMap;

use crate::crs::Crs;

/// Feature properties in source order (dBase columns, KML data fields, GML child elements).
pub type Properties = IndexMap<String, AttributeValue>;

/// One feature read from a dataset: identifier, optional geometry and scalar properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub id: String,
    pub geometry: Option<Geometry<f64>>,
    pub properties: Properties,
    /// CRS of `geometry` when it differs from the dataset's native CRS.
    pub crs: Option<Crs>,
}

impl FeatureRecord {
    pub fn new(id: impl Into<String>, geometry: Option<Geometry<f64>>) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Properties::new(),
            crs: None,
        }
    }

    /// Builder-style property setter.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&AttributeValue> {
        self.properties.get(name)
    }
}

/// Name and type of an attribute column, as declared by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub data_type: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}
