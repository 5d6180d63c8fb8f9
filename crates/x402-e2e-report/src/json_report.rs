//! Structured JSON report, matching the schema of spec.md §6:
//! `{summary, results, breakdowns}`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use x402_e2e_scenario::DetailedTestResult;

use crate::summary::{build_breakdowns, Breakdowns};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    Testnet,
    Mainnet,
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    #[serde(rename = "networkMode")]
    pub network_mode: String,
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub summary: RunSummary,
    pub results: &'a [DetailedTestResult],
    pub breakdowns: Breakdowns,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create report file {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Builds the report payload without writing it anywhere — useful for tests
/// and for embedding the summary in non-JSON output paths.
pub fn build_report(results: &[DetailedTestResult], network_mode: NetworkMode) -> JsonReport<'_> {
    let passed = results.iter().filter(|r| r.passed).count();
    JsonReport {
        summary: RunSummary {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            network_mode: network_mode.to_string(),
        },
        results,
        breakdowns: build_breakdowns(results),
    }
}

/// Writes the pretty-printed JSON report to `path` (spec.md §6).
pub fn write_json_report(
    path: &Path,
    results: &[DetailedTestResult],
    network_mode: NetworkMode,
) -> Result<(), ReportError> {
    let report = build_report(results, network_mode);
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
    tracing::info!(path = %path.display(), "wrote JSON report");
    Ok(())
}
