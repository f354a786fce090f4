use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use format_shared::{AttributeValue, FormatReadError, FormatResult, SourcePosition};
use geo_types::Geometry;
use geoupload_core_common::io::{resolve_companion, resolve_primary, type_name_of};
use geoupload_core_common::{
    Crs, Dataset, FeatureReader, FeatureRecord, FeatureStream, FieldInfo, FileDescriptor,
    Properties,
};
use log::{debug, warn};
use shapefile::dbase::{self, FieldValue, Record};
use shapefile::{Reader, Shape, ShapeReader};

use crate::prj::crs_from_prj;

/// Opens Shapefile datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileReader;

impl FeatureReader for ShapefileReader {
    fn open(&self, work_dir: &Path, descriptor: &FileDescriptor) -> FormatResult<Box<dyn Dataset>> {
        let shp_path = resolve_primary(work_dir, descriptor)?;
        let context = shp_path.display().to_string();
        debug!("Opening Shapefile {context}");

        // Companions come from the descriptor: their extensions may differ in case from the .shp.
        let shx_path = resolve_companion(work_dir, descriptor, "shx");
        let dbf_path = resolve_companion(work_dir, descriptor, "dbf")
            .unwrap_or_else(|| shp_path.with_extension("dbf"));

        let shp_source = open_buffered(&shp_path)?;
        let shape_reader = match &shx_path {
            Some(shx_path) => ShapeReader::with_shx(shp_source, open_buffered(shx_path)?),
            None => ShapeReader::new(shp_source),
        }
        .map_err(|err| FormatReadError::from_library(err, context.clone()))?;

        let table = dbase::Reader::from_path(&dbf_path)
            .map_err(|err| FormatReadError::from_library(err, dbf_path.display().to_string()))?;
        let fields = table
            .fields()
            .iter()
            .map(|field| FieldInfo::new(field.name(), format!("{:?}", field.field_type())))
            .collect();
        let reader = Reader::new(shape_reader, table);

        let prj_path = resolve_companion(work_dir, descriptor, "prj")
            .or_else(|| Some(shp_path.with_extension("prj")).filter(|p| p.is_file()));
        let native_crs = match prj_path {
            Some(path) => {
                let wkt = fs::read_to_string(&path).map_err(|source| FormatReadError::Io {
                    source,
                    context: Some(path.display().to_string()),
                })?;
                let crs = crs_from_prj(&wkt);
                if crs.is_none() {
                    warn!("Could not identify the CRS declared in {}", path.display());
                }
                crs
            },
            None => None,
        };

        Ok(Box::new(ShapefileDataset {
            type_name: type_name_of(&shp_path),
            native_crs,
            fields,
            context,
            reader,
        }))
    }
}

/// An open Shapefile.
pub struct ShapefileDataset {
    type_name: String,
    native_crs: Option<Crs>,
    fields: Vec<FieldInfo>,
    context: String,
    reader: Reader<BufReader<File>, BufReader<File>>,
}

impl Dataset for ShapefileDataset {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn native_crs(&self) -> Option<Crs> {
        self.native_crs
    }

    fn fields(&self) -> Vec<FieldInfo> {
        self.fields.clone()
    }

    fn features(&mut self) -> FeatureStream<'_> {
        let type_name = self.type_name.as_str();
        let context = self.context.as_str();
        let fields = self.fields.as_slice();
        Box::new(
            self.reader
                .iter_shapes_and_records()
                .enumerate()
                .map(move |(index, item)| {
                    let position = SourcePosition::record(index as u64 + 1);
                    let (shape, record) = item.map_err(|err| {
                        FormatReadError::from_library(err, context).at(position.clone())
                    })?;
                    let geometry = shape_to_geometry(shape)
                        .map_err(|err| err.with_additional_context(context).at(position))?;

                    let mut feature = FeatureRecord::new(format!("{type_name}.{}", index + 1), geometry);
                    feature.properties = record_to_properties(record, fields);
                    Ok(feature)
                }),
        )
    }
}

fn open_buffered(path: &Path) -> FormatResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| FormatReadError::Io {
            source,
            context: Some(path.display().to_string()),
        })
}

fn shape_to_geometry(shape: Shape) -> FormatResult<Option<Geometry<f64>>> {
    if matches!(shape, Shape::NullShape) {
        return Ok(None);
    }
    Geometry::<f64>::try_from(shape)
        .map(Some)
        .map_err(|err| FormatReadError::parse(format!("Unsupported shape: {err}")))
}

/// Properties in dBase column order. The record itself does not keep that order.
fn record_to_properties(mut record: Record, fields: &[FieldInfo]) -> Properties {
    let mut properties = Properties::with_capacity(fields.len());
    for field in fields {
        if let Some(value) = record.remove(&field.name) {
            properties.insert(field.name.clone(), field_value_to_attribute(value));
        }
    }
    for (name, value) in record {
        properties.insert(name, field_value_to_attribute(value));
    }
    properties
}

fn field_value_to_attribute(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::String(s.trim_end().to_string()),
        FieldValue::Memo(s) => AttributeValue::String(s),
        FieldValue::Numeric(Some(n)) => AttributeValue::Float(n),
        FieldValue::Float(Some(f)) => AttributeValue::Float(f64::from(f)),
        FieldValue::Double(d) | FieldValue::Currency(d) => AttributeValue::Float(d),
        FieldValue::Integer(i) => AttributeValue::Integer(i64::from(i)),
        FieldValue::Logical(Some(b)) => AttributeValue::Boolean(b),
        FieldValue::Date(Some(d)) => {
            NaiveDate::from_ymd_opt(d.year() as i32, d.month() as u32, d.day() as u32)
                .map_or(AttributeValue::Null, AttributeValue::Date)
        },
        FieldValue::DateTime(dt) => {
            let date = dt.date();
            let time = dt.time();
            NaiveDate::from_ymd_opt(date.year() as i32, date.month() as u32, date.day() as u32)
                .and_then(|d| {
                    d.and_hms_opt(
                        time.hours() as u32,
                        time.minutes() as u32,
                        time.seconds() as u32,
                    )
                })
                .map_or(AttributeValue::Null, AttributeValue::DateTime)
        },
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_values_are_trimmed() {
        assert_eq!(
            field_value_to_attribute(FieldValue::Character(Some("Rennes   ".to_string()))),
            AttributeValue::String("Rennes".to_string())
        );
    }

    #[test]
    fn empty_values_are_null() {
        assert_eq!(
            field_value_to_attribute(FieldValue::Numeric(None)),
            AttributeValue::Null
        );
        assert_eq!(
            field_value_to_attribute(FieldValue::Logical(None)),
            AttributeValue::Null
        );
    }

    #[test]
    fn numbers_keep_their_kind() {
        assert_eq!(
            field_value_to_attribute(FieldValue::Integer(7)),
            AttributeValue::Integer(7)
        );
        assert_eq!(
            field_value_to_attribute(FieldValue::Numeric(Some(2.5))),
            AttributeValue::Float(2.5)
        );
    }

    #[test]
    fn null_shape_has_no_geometry() {
        assert!(shape_to_geometry(Shape::NullShape).unwrap().is_none());
    }
}
