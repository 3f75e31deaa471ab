//! Tests for the report formats and the command-line entry point.

use std::path::PathBuf;
use std::process::Command;

use pycefrl::report::{self, Format, JsonReport, SummaryReport, CSV_HEADER};
use pycefrl::{AnalysisRun, DirectorySource, RunReport};
use tempfile::TempDir;

fn sample_repo() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("sample_repo")
}

fn run_sample() -> RunReport {
    let source = DirectorySource::new(sample_repo()).repository("sample");
    AnalysisRun::new()
        .jobs(1)
        .run_source(&source)
        .expect("sources should be listed")
}

fn render(format: Format, report: &RunReport) -> String {
    let mut buf = Vec::new();
    report::write_report(&mut buf, format, "sample_repo", report).expect("should render");
    String::from_utf8(buf).expect("reports are UTF-8")
}

fn pycefrl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pycefrl"))
}

#[test]
fn test_json_report_round_trips() {
    let report = run_sample();
    let json: JsonReport = serde_json::from_str(&render(Format::Json, &report)).unwrap();

    let files = &json["sample"];
    assert_eq!(files.len(), 5);
    assert!(!files.contains_key("broken.py"));

    let loops = &files["loops.py"];
    assert_eq!(loops.len(), 4);
    assert_eq!(loops[1].class, "Nested For Loop");
    assert_eq!(loops[1].start_line, "3");
    assert_eq!(loops[1].end_line, "5");
    assert_eq!(loops[1].displacement, "4");
    assert_eq!(loops[1].level, "A2");
}

#[test]
fn test_csv_report() {
    let report = run_sample();
    let text = render(Format::Csv, &report);
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();

    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines.len(), 1 + report.result.len());
    assert!(lines.contains(&"sample,classes.py,Exception --> try/except,7,10,8,B1"));
    assert!(lines.contains(&"sample,pkg/gen.py,Generator Expression,1,1,10,C1"));
}

#[test]
fn test_summary_report() {
    let report = run_sample();
    let summary: SummaryReport =
        serde_json::from_str(&render(Format::Summary, &report)).unwrap();

    assert_eq!(summary.levels.len(), 6);
    assert_eq!(summary.levels.values().sum::<usize>(), 20);
    assert_eq!(summary.files["sample"]["pkg/gen.py"].observations, 4);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].file, "broken.py");
    assert_eq!(summary.coverage.unmatched, report.coverage.unmatched_total());
    assert_eq!(summary.coverage.unruled, report.coverage.unruled_total());
}

#[test]
fn test_cli_json_output() {
    let output = pycefrl()
        .args(["analyze", "--format", "json", "--repo", "demo"])
        .arg(sample_repo())
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["demo"]["basics.py"][0]["Class"], "Import");
}

#[test]
fn test_cli_strict_fails_on_broken_file() {
    let status = pycefrl()
        .args(["analyze", "--format", "summary", "--strict"])
        .arg(sample_repo())
        .output()
        .expect("binary should run")
        .status;
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_cli_rejects_unknown_format() {
    let status = pycefrl()
        .args(["analyze", "--format", "xml"])
        .arg(sample_repo())
        .output()
        .expect("binary should run")
        .status;
    assert_eq!(status.code(), Some(2));
}

#[test]
fn test_cli_writes_csv_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("data.csv");

    let status = pycefrl()
        .args(["analyze", "--format", "csv", "--output"])
        .arg(&out)
        .arg(sample_repo())
        .status()
        .expect("binary should run");

    assert_eq!(status.code(), Some(0));
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Repository,File Name,Class"));
}

#[test]
fn test_cli_init_refuses_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pycefrl.yaml");

    let first = pycefrl()
        .args(["init", "--output"])
        .arg(&path)
        .status()
        .expect("binary should run");
    assert_eq!(first.code(), Some(0));
    assert!(pycefrl::Config::parse_file(&path).is_ok());

    let second = pycefrl()
        .args(["init", "--output"])
        .arg(&path)
        .output()
        .expect("binary should run");
    assert_eq!(second.status.code(), Some(2));
}

#[test]
fn test_cli_config_excludes_paths() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("cfg.yaml");
    std::fs::write(&config, "excluded_paths:\n  - \"pkg/**\"\n").unwrap();

    let output = pycefrl()
        .args(["analyze", "--format", "json", "--config"])
        .arg(&config)
        .arg(sample_repo())
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["sample_repo"].get("pkg/gen.py").is_none());
    assert!(value["sample_repo"].get("loops.py").is_some());
}
