use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

fn annotkit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_annotkit"))
        .args(args)
        .output()
        .expect("run annotkit")
}

fn write_doc(dir: &Path, doc: &Value) -> String {
    let path = dir.join("doc.json");
    std::fs::write(&path, doc.to_string()).expect("write document");
    path.to_string_lossy().into_owned()
}

fn sample() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [20, 0], [20, 20], [0, 20], [0, 0]]],
                },
                "properties": {"label": "tissue"},
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [[50, 0], [70, 0], [70, 20], [50, 20]],
                    "properties": {"subtype": "Rectangle", "rotation": 0},
                },
                "properties": {},
            },
        ],
    })
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "annotkit failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn exit_code_usage_is_1_for_missing_args() {
    assert_eq!(annotkit(&["paint"]).status.code(), Some(1));
}

#[test]
fn exit_code_input_is_2_for_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.json");
    let out = annotkit(&["normalize", missing.to_string_lossy().as_ref()]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn exit_code_input_is_2_for_unsupported_geometry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc = json!([{"type": "Feature", "geometry": {"type": "LineString", "coordinates": []}}]);
    let input = write_doc(dir.path(), &doc);
    let out = annotkit(&["normalize", &input]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("LineString"));
}

#[test]
fn exit_code_processing_is_3_when_painting_a_rectangle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(dir.path(), &sample());
    let out = annotkit(&["paint", &input, "--feature", "1", "--point", "55,5", "--radius", "3"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn normalize_writes_canonical_multipolygons() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(dir.path(), &sample());
    let output = dir.path().join("out.json");
    let out = annotkit(&["normalize", &input, "--output", output.to_string_lossy().as_ref()]);
    assert!(out.status.success());

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["geometry"]["type"], "MultiPolygon");
    assert_eq!(features[0]["properties"]["label"], "tissue");
    assert_eq!(features[1]["geometry"]["properties"]["subtype"], "Rectangle");
}

#[test]
fn paint_extends_region() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(dir.path(), &sample());
    let painted = stdout_json(&annotkit(&[
        "paint", &input, "--feature", "0", "--point", "20,10", "--point", "40,10", "--radius", "4",
    ]));
    let ring = &painted["features"][0]["geometry"]["coordinates"][0][0];
    let max_x = ring
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p[0].as_f64().unwrap())
        .fold(f64::MIN, f64::max);
    assert!((max_x - 44.0).abs() < 0.1, "max x was {max_x}");
}

#[test]
fn hit_and_select_report_feature_indices() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_doc(dir.path(), &sample());

    let hit = stdout_json(&annotkit(&["hit", &input, "60,10"]));
    assert_eq!(hit["feature"], 1);
    assert_eq!(hit["kind"], "fill");

    let miss = stdout_json(&annotkit(&["hit", &input, "35,40"]));
    assert!(miss.is_null());

    let selected = stdout_json(&annotkit(&["select", &input, "--from", "-5,-5", "--to", "55,10"]));
    assert_eq!(selected["selected"], json!([0, 1]));

    let contained = stdout_json(&annotkit(&[
        "select",
        &input,
        "--from",
        "-5,-5",
        "--to",
        "55,25",
        "--fully-contained",
    ]));
    assert_eq!(contained["selected"], json!([0]));
}
