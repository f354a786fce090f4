use std::io::Write;

use geojson::feature::Id;
use geojson::{Feature, JsonObject};
use geoupload_core_common::FeatureRecord;
use thiserror::Error;

/// Options for `GeoJSON` writing
#[derive(Debug, Clone, Default)]
pub struct GeoJsonWriterOptions {
    /// Indent each feature (default: false)
    pub pretty: bool,
}

impl GeoJsonWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether features are pretty-printed
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Errors raised while writing `GeoJSON`.
#[derive(Debug, Error)]
pub enum GeoJsonWriteError {
    #[error("I/O error while writing GeoJSON: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize feature '{id}': {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Streams features into one `FeatureCollection`.
///
/// The collection header is written by [`FeatureCollectionWriter::new`] and the
/// closing brackets by [`FeatureCollectionWriter::finish`]. Dropping the writer
/// without finishing leaves truncated JSON in the sink.
pub struct FeatureCollectionWriter<W: Write> {
    sink: W,
    options: GeoJsonWriterOptions,
    written: usize,
}

impl<W: Write> FeatureCollectionWriter<W> {
    /// Writes the collection header to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoJsonWriteError::Io`] if the sink rejects the header.
    pub fn new(mut sink: W, options: GeoJsonWriterOptions) -> Result<Self, GeoJsonWriteError> {
        if options.pretty {
            sink.write_all(b"{\n\"type\": \"FeatureCollection\",\n\"features\": [\n")?;
        } else {
            sink.write_all(br#"{"type":"FeatureCollection","features":["#)?;
        }
        Ok(Self {
            sink,
            options,
            written: 0,
        })
    }

    /// Appends one feature.
    ///
    /// # Errors
    ///
    /// Returns an error if the feature cannot be serialized or the sink fails.
    pub fn write_feature(&mut self, feature: &FeatureRecord) -> Result<(), GeoJsonWriteError> {
        if self.written > 0 {
            self.sink
                .write_all(if self.options.pretty { b",\n" } else { b"," })?;
        }
        let geojson = to_geojson_feature(feature);
        let serialized = if self.options.pretty {
            serde_json::to_writer_pretty(&mut self.sink, &geojson)
        } else {
            serde_json::to_writer(&mut self.sink, &geojson)
        };
        serialized.map_err(|source| GeoJsonWriteError::Serialize {
            id: feature.id.clone(),
            source,
        })?;
        self.written += 1;
        Ok(())
    }

    /// Number of features written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Closes the collection, flushes and hands the sink back.
    ///
    /// # Errors
    ///
    /// Returns [`GeoJsonWriteError::Io`] if the sink fails.
    pub fn finish(mut self) -> Result<W, GeoJsonWriteError> {
        if self.options.pretty {
            self.sink.write_all(b"\n]\n}\n")?;
        } else {
            self.sink.write_all(b"]}")?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Builds the `GeoJSON` representation of a feature.
#[must_use]
pub fn to_geojson_feature(feature: &FeatureRecord) -> Feature {
    let properties: JsonObject = feature
        .properties
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();

    Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|geometry| geojson::Geometry::new(geojson::Value::from(geometry))),
        id: Some(Id::String(feature.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Writes `features` as a complete `FeatureCollection` and returns how many were written.
///
/// # Errors
///
/// Returns an error if serialization or the sink fails.
pub fn write_feature_collection<'a, W: Write>(
    sink: W,
    features: impl IntoIterator<Item = &'a FeatureRecord>,
    options: &GeoJsonWriterOptions,
) -> Result<usize, GeoJsonWriteError> {
    let mut writer = FeatureCollectionWriter::new(sink, options.clone())?;
    for feature in features {
        writer.write_feature(feature)?;
    }
    let written = writer.written();
    writer.finish()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use format_shared::AttributeValue;
    use geo_types::{Geometry, Point};
    use serde_json::{Value, json};

    use super::*;

    fn accident() -> FeatureRecord {
        FeatureRecord::new(
            "accidents.1",
            Some(Geometry::Point(Point::new(-2.265330624649336, 48.421434814828025))),
        )
        .with_property("commune", "MERDRIGNAC")
        .with_property("tues_nb", 1_i64)
    }

    #[test]
    fn writes_a_feature_collection() {
        let mut buffer = Vec::new();
        let written =
            write_feature_collection(&mut buffer, [&accident()], &GeoJsonWriterOptions::default())
                .unwrap();
        assert_eq!(written, 1);

        let value: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        let feature = &value["features"][0];
        assert_eq!(feature["id"], "accidents.1");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(
            feature["geometry"]["coordinates"],
            json!([-2.265330624649336, 48.421434814828025])
        );
        assert_eq!(feature["properties"]["commune"], "MERDRIGNAC");
        assert_eq!(feature["properties"]["tues_nb"], 1);
    }

    #[test]
    fn pretty_output_is_valid_json() {
        let features = [accident(), FeatureRecord::new("accidents.2", None)];
        let mut buffer = Vec::new();
        write_feature_collection(
            &mut buffer,
            &features,
            &GeoJsonWriterOptions::new().with_pretty(true),
        )
        .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains('\n'));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["features"].as_array().unwrap().len(), 2);
        assert_eq!(value["features"][1]["geometry"], Value::Null);
    }

    #[test]
    fn null_and_date_properties() {
        let mut feature = FeatureRecord::new("f.1", None).with_property("missing", AttributeValue::Null);
        feature.properties.insert(
            "date".to_string(),
            AttributeValue::Date(NaiveDate::from_ymd_opt(2012, 1, 14).unwrap()),
        );
        let geojson = to_geojson_feature(&feature);
        let properties = geojson.properties.unwrap();
        assert_eq!(properties["missing"], Value::Null);
        assert_eq!(properties["date"], "2012-01-14");
    }

    #[test]
    fn properties_keep_insertion_order() {
        let feature = FeatureRecord::new("f.1", None)
            .with_property("zone", "B")
            .with_property("commune", "Loudéac")
            .with_property("annee", 2012_i64);
        let mut buffer = Vec::new();
        write_feature_collection(&mut buffer, [&feature], &GeoJsonWriterOptions::default())
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let zone = text.find("\"zone\"").unwrap();
        let commune = text.find("\"commune\"").unwrap();
        let annee = text.find("\"annee\"").unwrap();
        assert!(zone < commune && commune < annee);
    }
}
