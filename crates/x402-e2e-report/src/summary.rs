//! Per-dimension pass/fail breakdowns (spec.md §4.13 step 14, §6's JSON
//! report schema).

use std::collections::BTreeMap;

use serde::Serialize;
use x402_e2e_scenario::DetailedTestResult;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PassFail {
    pub passed: u32,
    pub failed: u32,
}

impl PassFail {
    fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Breakdowns {
    #[serde(rename = "byFacilitator")]
    pub by_facilitator: BTreeMap<String, PassFail>,
    #[serde(rename = "byServer")]
    pub by_server: BTreeMap<String, PassFail>,
    #[serde(rename = "byClient")]
    pub by_client: BTreeMap<String, PassFail>,
    #[serde(rename = "byProtocolFamily")]
    pub by_protocol_family: BTreeMap<String, PassFail>,
}

/// Tallies every result into its four dimension-keyed breakdowns. Results
/// with no facilitator are omitted from `by_facilitator` entirely rather
/// than tallied under an empty-string key.
pub fn build_breakdowns(results: &[DetailedTestResult]) -> Breakdowns {
    let mut breakdowns = Breakdowns::default();
    for result in results {
        if let Some(facilitator) = &result.facilitator {
            breakdowns
                .by_facilitator
                .entry(facilitator.clone())
                .or_default()
                .record(result.passed);
        }
        breakdowns
            .by_server
            .entry(result.server.clone())
            .or_default()
            .record(result.passed);
        breakdowns
            .by_client
            .entry(result.client.clone())
            .or_default()
            .record(result.passed);
        breakdowns
            .by_protocol_family
            .entry(result.protocol_family.to_string())
            .or_default()
            .record(result.passed);
    }
    breakdowns
}
