use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../geoupload-core/tests/data")
        .join(name)
}

fn geoupload() -> Command {
    Command::cargo_bin("geoupload").unwrap()
}

#[test]
fn drivers_lists_readable_formats() {
    geoupload()
        .arg("drivers")
        .assert()
        .success()
        .stdout(predicate::str::contains("ESRI Shapefile"))
        .stdout(predicate::str::contains("KML"))
        .stdout(predicate::str::contains("GML"));
}

#[test]
fn convert_writes_geojson_to_stdout() {
    let output = geoupload()
        .args(["convert", "--input"])
        .arg(fixture("kml_4326_accidents.kml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let collection: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(collection["type"], "FeatureCollection");
    assert_eq!(collection["features"][0]["properties"]["meteo"], "pluie");
}

#[test]
fn convert_reprojects_into_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("accidents.geojson");

    geoupload()
        .args(["convert", "--target-crs", "EPSG:3857", "--pretty", "--input"])
        .arg(fixture("gml_4326_accidents.gml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let collection: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let coordinates = &collection["features"][0]["geometry"]["coordinates"];
    assert!((coordinates[0].as_f64().unwrap() - -252175.451614371791948).abs() < 1e-7);
    assert!((coordinates[1].as_f64().unwrap() - 6177255.152005254290998).abs() < 1e-7);
}

#[test]
fn empty_dataset_leaves_no_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("empty.kml");
    std::fs::write(
        &input,
        r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document></Document></kml>"#,
    )
    .unwrap();
    let output = temp_dir.path().join("empty.geojson");

    geoupload()
        .args(["convert", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("contains no features"));
    assert!(!output.exists());
}

#[test]
fn unsupported_extension_fails_with_hint() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("drawing.dxf");
    std::fs::write(&input, "0\nSECTION\n").unwrap();

    geoupload()
        .args(["convert", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"))
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn invalid_axis_order_is_rejected() {
    geoupload()
        .args(["convert", "--axis-order", "yx", "--input"])
        .arg(fixture("regions.kml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("axis-order"));
}

#[test]
fn info_describes_dataset() {
    geoupload()
        .arg("info")
        .arg(fixture("border.gml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Driver: GML"))
        .stdout(predicate::str::contains("Feature Count: 2"))
        .stdout(predicate::str::contains("length_km"));
}
