//! End-to-end runs of the `platter` binary.

use std::path::Path;
use std::process::{Command, Output};

const HEADER: &str = "Brand Name,Annualized Trips,Active Locations,Total Locations,% Franchised,\
Avg. Basket Size,Marketplace Fee,%Orders from First Time Eaters,Order Defect Rate,\
Avg. Courier Wait Time (min)";

fn write_workbook(dir: &Path) -> std::path::PathBuf {
    let mut lines = vec![HEADER.to_string()];
    for i in 0..12 {
        lines.push(format!(
            "Brand {i},\"{}\",{},40,50%,${:.2},{}%,{}%,{}%,{}",
            100_000 + 25_000 * i,
            5 + 2 * i,
            18.0 + f64::from(i),
            14 + i % 8,
            5 + i % 4,
            1.0 + 0.25 * f64::from(i % 5),
            3 + i % 6
        ));
    }
    let path = dir.join("brands.csv");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn platter(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_platter"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

#[test]
fn test_methodology_needs_no_workbook() {
    let out = platter(&["methodology"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("# Methodology"));
}

#[test]
fn test_missing_workbook_exits_with_error() {
    let out = platter(&["score"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("Error: "));
}

#[test]
fn test_score_exports_every_brand() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = write_workbook(dir.path());
    let export = dir.path().join("scores.csv");

    let out = platter(&[
        "--workbook",
        workbook.to_str().unwrap(),
        "score",
        "--top",
        "3",
        "--export",
        export.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let csv = std::fs::read_to_string(&export).unwrap();
    assert_eq!(csv.lines().count(), 13);
    assert!(csv.lines().next().unwrap().starts_with("rank,brand,segment,tier,score"));
    assert!(String::from_utf8_lossy(&out.stdout).contains("MERCHANT SCORING"));
}

#[test]
fn test_simulate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = write_workbook(dir.path());

    let out = platter(&[
        "--workbook",
        workbook.to_str().unwrap(),
        "--format",
        "json",
        "simulate",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["simulation"]["rows"].as_array().unwrap().len(), 12);
}

#[test]
fn test_inspect_join_key_needs_a_demographic_column() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = write_workbook(dir.path());
    let workbook = workbook.to_str().unwrap();

    let out = platter(&["--workbook", workbook, "--format", "json", "inspect"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(json.get("join").is_none());

    // A CSV export has no demographic sheet, so no column can match.
    let out = platter(&["--workbook", workbook, "inspect", "--join-key", "Brand"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Missing column: Brand"));
}
