//! Human-readable summary printed to stdout (spec.md §4.13 step 14).

use std::fmt::Write as _;

use x402_e2e_scenario::DetailedTestResult;

use crate::summary::{build_breakdowns, PassFail};

/// Renders the totals, the failed-scenario table, and per-dimension
/// breakdowns as a single string ready to print.
pub fn render_text_summary(results: &[DetailedTestResult]) -> String {
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    let breakdowns = build_breakdowns(results);

    let mut out = String::new();
    let _ = writeln!(out, "=== x402 e2e results ===");
    let _ = writeln!(out, "total: {}  passed: {}  failed: {}", results.len(), passed, failed);

    if failed > 0 {
        let _ = writeln!(out, "\nfailed scenarios:");
        for result in results.iter().filter(|r| !r.passed) {
            let _ = writeln!(
                out,
                "  #{} {} -> {} {} [{}]: {}",
                result.test_number,
                result.client,
                result.server,
                result.endpoint,
                result.facilitator.as_deref().unwrap_or("-"),
                result.error.as_deref().unwrap_or("unknown error"),
            );
        }
    }

    render_dimension(&mut out, "by facilitator", &breakdowns.by_facilitator);
    render_dimension(&mut out, "by server", &breakdowns.by_server);
    render_dimension(&mut out, "by client", &breakdowns.by_client);
    render_dimension(&mut out, "by protocol family", &breakdowns.by_protocol_family);

    out
}

fn render_dimension(out: &mut String, label: &str, map: &std::collections::BTreeMap<String, PassFail>) {
    if map.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{label}:");
    for (key, tally) in map {
        let _ = writeln!(out, "  {key}: {} passed, {} failed", tally.passed, tally.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x402_e2e_config::ProtocolFamily;

    fn result(passed: bool, error: Option<&str>) -> DetailedTestResult {
        DetailedTestResult {
            test_number: 7,
            client: "ts".to_string(),
            server: "go".to_string(),
            endpoint: "/paid".to_string(),
            facilitator: Some("rust-fac".to_string()),
            protocol_family: ProtocolFamily::Evm,
            passed,
            error: error.map(ToString::to_string),
            transaction: None,
            network: None,
        }
    }

    #[test]
    fn all_passing_summary_has_no_failed_section() {
        let summary = render_text_summary(&[result(true, None)]);
        assert!(summary.contains("total: 1  passed: 1  failed: 0"));
        assert!(!summary.contains("failed scenarios"));
    }

    #[test]
    fn failures_are_listed_with_their_error() {
        let summary = render_text_summary(&[result(false, Some("boom"))]);
        assert!(summary.contains("failed scenarios"));
        assert!(summary.contains("boom"));
        assert!(summary.contains("#7"));
    }

    #[test]
    fn breakdown_sections_appear_per_dimension() {
        let summary = render_text_summary(&[result(true, None)]);
        assert!(summary.contains("by facilitator"));
        assert!(summary.contains("by server"));
        assert!(summary.contains("by client"));
        assert!(summary.contains("by protocol family"));
    }
}
