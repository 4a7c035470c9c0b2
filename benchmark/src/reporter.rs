// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON report output.
//!
//! Reports are written to timestamped files so successive runs can be diffed.

use crate::metrics::{BenchmarkCategory, BenchmarkReport};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes benchmark reports as pretty-printed JSON.
pub struct JsonReporter {
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a reporter, creating `output_dir` if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Reporter writing into `<crate>/data`.
    pub fn default_location() -> Result<Self, ReporterError> {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");
        Self::new(Path::new(manifest_dir).join("data"))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save the whole report as `<suite>_<timestamp>.json`.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let filename = format!(
            "{}_{}.json",
            report.benchmark_suite,
            report.timestamp.format(FILE_TIMESTAMP_FORMAT)
        );
        self.write(report, &filename)
    }

    /// Save one file per category, named `<category>_<timestamp>.json`.
    pub fn save_by_category(
        &self,
        report: &BenchmarkReport,
    ) -> Result<Vec<PathBuf>, ReporterError> {
        let mut by_category: HashMap<BenchmarkCategory, Vec<_>> = HashMap::new();
        for result in &report.results {
            by_category
                .entry(result.category)
                .or_default()
                .push(result.clone());
        }

        let mut paths = Vec::new();
        for category in BenchmarkCategory::ALL {
            let Some(results) = by_category.remove(&category) else {
                continue;
            };
            let category_report = BenchmarkReport {
                results,
                ..report.clone()
            };
            let filename = format!(
                "{}_{}.json",
                category,
                report.timestamp.format(FILE_TIMESTAMP_FORMAT)
            );
            paths.push(self.write(&category_report, &filename)?);
        }

        Ok(paths)
    }

    fn write(&self, report: &BenchmarkReport, filename: &str) -> Result<PathBuf, ReporterError> {
        let filepath = self.output_dir.join(filename);
        let writer = BufWriter::new(File::create(&filepath)?);
        serde_json::to_writer_pretty(writer, report)?;
        Ok(filepath)
    }

    /// List JSON files in the output directory, sorted by name.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load a previously saved report.
    pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport, ReporterError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BenchmarkResult;
    use tempfile::TempDir;

    fn sample_report() -> BenchmarkReport {
        let mut report = BenchmarkReport::new();
        report.add_result(BenchmarkResult::latency(
            BenchmarkCategory::Encode,
            "json",
            "small",
            vec![100, 200, 300],
            120,
            false,
        ));
        report.add_result(BenchmarkResult::encoded_size("json", "small", 120));
        report
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let path = reporter.save(&sample_report()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("mqttbench-codec_"));

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.results.len(), 2);
        assert_eq!(loaded.results[0].name, "encode_json_small");
        assert_eq!(loaded.results[1].encoded_bytes, Some(120));
    }

    #[test]
    fn test_save_by_category() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let paths = reporter.save_by_category(&sample_report()).unwrap();
        assert_eq!(paths.len(), 2);

        let reports = reporter.list_reports().unwrap();
        assert_eq!(reports.len(), 2);
        for path in &reports {
            let loaded = JsonReporter::load(path).unwrap();
            assert_eq!(loaded.results.len(), 1);
        }
    }

    #[test]
    fn test_nested_output_dir_created() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("runs").join("today");
        let reporter = JsonReporter::new(&nested).unwrap();
        assert!(reporter.output_dir().is_dir());
        assert!(reporter.list_reports().unwrap().is_empty());
    }
}
