//! Output formatting for analysis results.
//!
//! Supports four output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: observations per repository and file, every value a string
//! - CSV: one row per observation
//! - Summary: level histograms as JSON

use std::collections::BTreeMap;
use std::io::Write;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::collector::{AnalysisResult, CoverageAudit};
use crate::error::FileFailure;
use crate::level::Level;
use crate::observation::Observation;
use crate::run::RunReport;
use crate::summary::{FileSummary, Histogram, LevelSummary};

/// Report formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
    Csv,
    Summary,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pretty => "pretty",
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Summary => "summary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pretty" => Some(Format::Pretty),
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            "summary" => Some(Format::Summary),
            _ => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Write `report` in `format`.
pub fn write_report<W: Write>(
    out: &mut W,
    format: Format,
    path: &str,
    report: &RunReport,
) -> anyhow::Result<()> {
    match format {
        Format::Pretty => write_pretty(out, path, report),
        Format::Json => write_json(out, &report.result),
        Format::Csv => write_csv(out, &report.result),
        Format::Summary => write_summary(out, &report.result, &report.failures, &report.coverage),
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// One observation as it appears in the JSON report.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonObservation {
    #[serde(rename = "Class")]
    pub class: String,
    #[serde(rename = "Start Line")]
    pub start_line: String,
    #[serde(rename = "End Line")]
    pub end_line: String,
    #[serde(rename = "Displacement")]
    pub displacement: String,
    #[serde(rename = "Level")]
    pub level: String,
}

impl From<&Observation> for JsonObservation {
    fn from(o: &Observation) -> Self {
        Self {
            class: o.label.clone(),
            start_line: o.start_line.to_string(),
            end_line: o.end_line.to_string(),
            displacement: o.col_offset.to_string(),
            level: o.level.to_string(),
        }
    }
}

/// Repository, then file, then observations in traversal order.
pub type JsonReport = BTreeMap<String, BTreeMap<String, Vec<JsonObservation>>>;

pub fn to_json_report(result: &AnalysisResult) -> JsonReport {
    let mut report = JsonReport::new();
    for (repo, file, observations) in result.files() {
        report
            .entry(repo.to_string())
            .or_default()
            .insert(file.to_string(), observations.iter().map(Into::into).collect());
    }
    report
}

pub fn write_json<W: Write>(out: &mut W, result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&to_json_report(result))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

// =============================================================================
// CSV Format
// =============================================================================

pub const CSV_HEADER: [&str; 7] = [
    "Repository",
    "File Name",
    "Class",
    "Start Line",
    "End Line",
    "Displacement",
    "Level",
];

/// Quote a field when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_csv_row<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    write!(out, "{}\r\n", row.join(","))
}

pub fn write_csv<W: Write>(out: &mut W, result: &AnalysisResult) -> anyhow::Result<()> {
    write_csv_row(out, &CSV_HEADER)?;
    for o in result.observations() {
        write_csv_row(
            out,
            &[
                o.repository.as_str(),
                o.file.as_str(),
                o.label.as_str(),
                o.start_line.to_string().as_str(),
                o.end_line.to_string().as_str(),
                o.col_offset.to_string().as_str(),
                o.level.as_str(),
            ],
        )?;
    }
    Ok(())
}

// =============================================================================
// Summary Format
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    #[serde(rename = "Levels")]
    pub levels: Histogram,
    #[serde(rename = "Files")]
    pub files: BTreeMap<String, BTreeMap<String, FileSummary>>,
    #[serde(rename = "Failures")]
    pub failures: Vec<FileFailure>,
    #[serde(rename = "Coverage")]
    pub coverage: CoverageTotals,
}

/// Monitored nodes that yielded no observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageTotals {
    /// A rule exists but no branch matched.
    #[serde(rename = "Unmatched")]
    pub unmatched: usize,
    /// No rule exists for the kind.
    #[serde(rename = "Unruled")]
    pub unruled: usize,
}

impl From<&CoverageAudit> for CoverageTotals {
    fn from(audit: &CoverageAudit) -> Self {
        Self {
            unmatched: audit.unmatched_total(),
            unruled: audit.unruled_total(),
        }
    }
}

pub fn write_summary<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    failures: &[FileFailure],
    coverage: &CoverageAudit,
) -> anyhow::Result<()> {
    let summary = LevelSummary::from_result(result);
    let report = SummaryReport {
        levels: summary.levels,
        files: summary.files,
        failures: failures.to_vec(),
        coverage: coverage.into(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty<W: Write>(out: &mut W, path: &str, report: &RunReport) -> anyhow::Result<()> {
    let summary = LevelSummary::from_result(&report.result);

    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "pycefrl".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Analyzing: ".dimmed(), path)?;
    writeln!(
        out,
        "  {}{} files, {} observations",
        "Scanned:   ".dimmed(),
        report.files_analyzed,
        summary.total
    )?;
    if report.cancelled {
        writeln!(out, "  {}", "(cancelled, results are partial)".yellow())?;
    }
    writeln!(out)?;

    write_histogram(out, &summary)?;
    writeln!(out)?;

    if !summary.files.is_empty() {
        write_files(out, &summary)?;
        writeln!(out)?;
    }

    if !report.failures.is_empty() {
        write_failures(out, &report.failures)?;
        writeln!(out)?;
    }

    write_range(out, &summary)?;
    write_coverage(out, &report.coverage)?;
    writeln!(out)?;
    Ok(())
}

fn colored_level(level: Level) -> ColoredString {
    match level {
        Level::A1 | Level::A2 => level.as_str().green(),
        Level::B1 | Level::B2 => level.as_str().yellow(),
        Level::C1 | Level::C2 => level.as_str().red(),
    }
}

fn write_histogram<W: Write>(out: &mut W, summary: &LevelSummary) -> anyhow::Result<()> {
    writeln!(out, "  {}", "Levels:".bold())?;
    for level in Level::ALL {
        let count = summary.count(level);
        let bar = "#".repeat((summary.share(level) * 40.0).round() as usize);
        writeln!(
            out,
            "    {}  {:>6}  {:>5.1}%  {}",
            colored_level(level),
            count,
            summary.share(level) * 100.0,
            bar.dimmed()
        )?;
    }
    Ok(())
}

fn write_files<W: Write>(out: &mut W, summary: &LevelSummary) -> anyhow::Result<()> {
    writeln!(out, "  {}", "Files:".bold())?;
    for (repo, files) in &summary.files {
        for (file, file_summary) in files {
            write!(
                out,
                "    {}{:<40} {:>5}",
                format!("{}/", repo).dimmed(),
                file.blue(),
                file_summary.observations
            )?;
            for (level, count) in &file_summary.levels {
                if *count > 0 {
                    write!(out, "  {}:{}", colored_level(*level), count)?;
                }
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_failures<W: Write>(out: &mut W, failures: &[FileFailure]) -> anyhow::Result<()> {
    writeln!(out, "  {} ({}):", "Failures".red().bold(), failures.len())?;
    writeln!(out)?;
    for f in failures {
        writeln!(
            out,
            "    {:<20}{}",
            f.kind.as_str().dimmed(),
            format!("{}/{}", f.repository, f.file).blue()
        )?;
        writeln!(out, "            {}", f.message)?;
    }
    Ok(())
}

fn write_range<W: Write>(out: &mut W, summary: &LevelSummary) -> anyhow::Result<()> {
    match (summary.min_level, summary.max_level) {
        (Some(min), Some(max)) => writeln!(
            out,
            "  Range: {} .. {}",
            colored_level(min),
            colored_level(max)
        )?,
        _ => writeln!(out, "  {}", "No leveled constructs found".dimmed())?,
    }
    Ok(())
}

fn write_coverage<W: Write>(out: &mut W, coverage: &CoverageAudit) -> anyhow::Result<()> {
    let totals = CoverageTotals::from(coverage);
    writeln!(
        out,
        "  {}{} unmatched, {} unruled",
        "Not leveled: ".dimmed(),
        totals.unmatched,
        totals.unruled
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::run::AnalysisRun;
    use crate::source::SourceEntry;

    fn sample() -> RunReport {
        AnalysisRun::new().jobs(1).run(&[
            SourceEntry::from_text("repo", "a.py", "import os\nx = [1, [2]]\n"),
            SourceEntry::from_text("repo", "bad.py", "def (:\n"),
        ])
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> anyhow::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_parse() {
        for format in [Format::Pretty, Format::Json, Format::Csv, Format::Summary] {
            assert_eq!(Format::parse(format.as_str()), Some(format));
        }
        assert_eq!(Format::parse("sarif"), None);
    }

    #[test]
    fn test_json_shape() {
        let report = sample();
        let text = render(|out| write_json(out, &report.result));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let first = &value["repo"]["a.py"][0];
        assert_eq!(first["Class"], "Import");
        assert_eq!(first["Start Line"], "1");
        assert_eq!(first["End Line"], "1");
        assert_eq!(first["Displacement"], "0");
        assert_eq!(first["Level"], "A2");
        assert_eq!(value["repo"]["a.py"][1]["Class"], "Nested List");
        assert!(value["repo"].get("bad.py").is_none());
    }

    #[test]
    fn test_csv_rows() {
        let report = sample();
        let text = render(|out| write_csv(out, &report.result));
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(
            lines[0],
            "Repository,File Name,Class,Start Line,End Line,Displacement,Level"
        );
        assert_eq!(lines[1], "repo,a.py,Import,1,1,0,A2");
        assert_eq!(lines[2], "repo,a.py,Nested List,2,2,4,A2");
        assert_eq!(lines[3], "repo,a.py,Simple List,2,2,8,A1");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_summary_shape() {
        let report = sample();
        let text = render(|out| {
            write_summary(out, &report.result, &report.failures, &report.coverage)
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["Levels"]["A1"], 1);
        assert_eq!(value["Levels"]["A2"], 2);
        assert_eq!(value["Levels"]["C2"], 0);
        assert_eq!(value["Files"]["repo"]["a.py"]["Observations"], 3);
        assert_eq!(value["Failures"][0]["file"], "bad.py");
        assert_eq!(
            value["Failures"][0]["kind"],
            FailureKind::SourceUnparseable.as_str()
        );
    }

    #[test]
    fn test_summary_reports_coverage_totals() {
        let report = AnalysisRun::new().jobs(1).run(&[SourceEntry::from_text(
            "repo",
            "kw.py",
            "def f(**kw):\n    pass\n",
        )]);
        let text = render(|out| {
            write_summary(out, &report.result, &report.failures, &report.coverage)
        });
        let summary: SummaryReport = serde_json::from_str(&text).unwrap();

        assert_eq!(summary.coverage.unmatched, 1);
        assert_eq!(summary.coverage.unruled, report.coverage.unruled_total());
        assert!(summary.coverage.unruled > 0);
    }

    #[test]
    fn test_pretty_reports_coverage_totals() {
        let report = AnalysisRun::new().jobs(1).run(&[SourceEntry::from_text(
            "repo",
            "kw.py",
            "def f(**kw):\n    pass\n",
        )]);
        let text = render(|out| write_pretty(out, "repo", &report));
        let expected = format!("1 unmatched, {} unruled", report.coverage.unruled_total());
        assert!(text.contains("Not leveled"));
        assert!(text.contains(&expected), "{}", text);
    }

    #[test]
    fn test_pretty_mentions_files_and_failures() {
        let report = sample();
        let text = render(|out| write_pretty(out, "repo", &report));
        assert!(text.contains("pycefrl"));
        assert!(text.contains("a.py"));
        assert!(text.contains("bad.py"));
        assert!(text.contains("source_unparseable"));
    }

    #[test]
    fn test_pretty_empty_result() {
        let report = AnalysisRun::new().run(&[]);
        let text = render(|out| write_pretty(out, ".", &report));
        assert!(text.contains("No leveled constructs found"));
    }
}
