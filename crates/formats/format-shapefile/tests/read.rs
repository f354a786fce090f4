use std::fs;
use std::path::Path;

use format_shapefile::ShapefileReader;
use geo_types::Geometry;
use geoupload_core_common::{AttributeValue, Crs, FeatureReader, FileDescriptor};
use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Writer};
use tempfile::TempDir;

const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

fn write_accidents(dir: &Path, with_prj: bool) {
    let builder = TableWriterBuilder::new()
        .add_character_field("commune".try_into().unwrap(), 32)
        .add_numeric_field("tues_nb".try_into().unwrap(), 10, 0)
        .add_logical_field("consolide".try_into().unwrap());
    let mut writer = Writer::from_path(dir.join("accidents.shp"), builder).unwrap();

    let mut first = Record::default();
    first.insert(
        "commune".to_string(),
        FieldValue::Character(Some("Merdrignac".to_string())),
    );
    first.insert("tues_nb".to_string(), FieldValue::Numeric(Some(1.0)));
    first.insert("consolide".to_string(), FieldValue::Logical(Some(true)));
    writer
        .write_shape_and_record(&Point::new(-2.265330624649336, 48.421434814828025), &first)
        .unwrap();

    let mut second = Record::default();
    second.insert("commune".to_string(), FieldValue::Character(None));
    second.insert("tues_nb".to_string(), FieldValue::Numeric(Some(2.0)));
    second.insert("consolide".to_string(), FieldValue::Logical(None));
    writer
        .write_shape_and_record(&Point::new(-1.68, 48.11), &second)
        .unwrap();
    drop(writer);

    if with_prj {
        fs::write(dir.join("accidents.prj"), WGS84_PRJ).unwrap();
    }
}

#[test]
fn reads_points_and_attributes() {
    let dir = TempDir::new().unwrap();
    write_accidents(dir.path(), true);
    let descriptor = FileDescriptor::discover(dir.path(), "accidents.shp").unwrap();

    let mut dataset = ShapefileReader.open(dir.path(), &descriptor).unwrap();
    assert_eq!(dataset.type_name(), "accidents");
    assert_eq!(dataset.native_crs(), Some(Crs::WGS84));

    let names: Vec<_> = dataset.fields().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["commune", "tues_nb", "consolide"]);

    let features: Vec<_> = dataset.features().collect::<Result<_, _>>().unwrap();
    assert_eq!(features.len(), 2);

    let first = &features[0];
    assert_eq!(first.id, "accidents.1");
    match first.geometry.as_ref().unwrap() {
        Geometry::Point(p) => {
            assert!((p.x() - -2.265330624649336).abs() < 1e-12);
            assert!((p.y() - 48.421434814828025).abs() < 1e-12);
        },
        other => panic!("expected a point, got {other:?}"),
    }
    assert_eq!(
        first.property("commune"),
        Some(&AttributeValue::String("Merdrignac".to_string()))
    );
    assert_eq!(first.property("tues_nb"), Some(&AttributeValue::Float(1.0)));
    assert_eq!(first.property("consolide"), Some(&AttributeValue::Boolean(true)));

    assert_eq!(features[1].id, "accidents.2");
    assert_eq!(features[1].property("commune"), Some(&AttributeValue::Null));
}

#[test]
fn properties_follow_dbase_column_order() {
    let dir = TempDir::new().unwrap();
    write_accidents(dir.path(), true);
    let descriptor = FileDescriptor::discover(dir.path(), "accidents.shp").unwrap();

    let mut dataset = ShapefileReader.open(dir.path(), &descriptor).unwrap();
    let features: Vec<_> = dataset.features().collect::<Result<_, _>>().unwrap();
    for feature in &features {
        let keys: Vec<_> = feature.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["commune", "tues_nb", "consolide"]);
    }
}

#[test]
fn missing_prj_leaves_crs_undeclared() {
    let dir = TempDir::new().unwrap();
    write_accidents(dir.path(), false);
    let descriptor = FileDescriptor::discover(dir.path(), "accidents.shp").unwrap();

    let dataset = ShapefileReader.open(dir.path(), &descriptor).unwrap();
    assert_eq!(dataset.native_crs(), None);
}

#[test]
fn corrupt_shp_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.shp"), b"not a shapefile").unwrap();
    fs::write(dir.path().join("broken.shx"), b"").unwrap();
    fs::write(dir.path().join("broken.dbf"), b"").unwrap();
    let descriptor = FileDescriptor::discover(dir.path(), "broken.shp").unwrap();

    assert!(ShapefileReader.open(dir.path(), &descriptor).is_err());
}

#[test]
fn reads_upper_case_extensions() {
    let dir = TempDir::new().unwrap();
    write_accidents(dir.path(), true);
    for ext in ["shp", "shx", "dbf", "prj"] {
        fs::rename(
            dir.path().join(format!("accidents.{ext}")),
            dir.path().join(format!("ACCIDENTS.{}", ext.to_ascii_uppercase())),
        )
        .unwrap();
    }
    let descriptor = FileDescriptor::discover(dir.path(), "ACCIDENTS.SHP").unwrap();

    let mut dataset = ShapefileReader.open(dir.path(), &descriptor).unwrap();
    assert_eq!(dataset.type_name(), "ACCIDENTS");
    assert_eq!(dataset.native_crs(), Some(Crs::WGS84));
    assert_eq!(dataset.fields().len(), 3);

    let features: Vec<_> = dataset.features().collect::<Result<_, _>>().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0].id, "ACCIDENTS.1");
}
