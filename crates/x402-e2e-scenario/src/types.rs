use x402_e2e_config::{Endpoint, ProtocolFamily};
use x402_e2e_discovery::{DiscoveredClient, DiscoveredFacilitator, DiscoveredServer, PaymentResponse};

/// One fully-materialized (client × server × facilitator? × endpoint ×
/// protocolFamily) configuration to test (spec.md §3).
///
/// Invariant enforced by construction (the generator never produces a
/// `Scenario` that violates this): `protocol_family` is in both
/// `client.config.protocol_families()` and equals `endpoint.protocol_family()`,
/// and `server_version` is in `client.config.x402_versions`.
#[derive(Clone)]
pub struct Scenario {
    pub client: DiscoveredClient,
    pub server: DiscoveredServer,
    pub facilitator: Option<DiscoveredFacilitator>,
    pub endpoint: Endpoint,
    pub protocol_family: ProtocolFamily,
    pub server_version: u32,
}

impl Scenario {
    pub fn facilitator_name(&self) -> Option<&str> {
        self.facilitator.as_ref().map(|f| f.name.as_str())
    }
}

/// Outcome of running one scenario's client call, before orchestrator-level
/// enrichment into a `DetailedTestResult` (spec.md §3, §4.12).
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<serde_json::Value>,
    pub status_code: Option<u16>,
    pub payment_response: Option<PaymentResponse>,
}

/// The orchestrator's enriched, report-ready result for one scenario.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DetailedTestResult {
    pub test_number: u64,
    pub client: String,
    pub server: String,
    pub endpoint: String,
    pub facilitator: Option<String>,
    pub protocol_family: ProtocolFamily,
    pub passed: bool,
    pub error: Option<String>,
    pub transaction: Option<String>,
    pub network: Option<String>,
}

/// A group of scenarios that share one server subprocess lifetime
/// (spec.md §3). Built by grouping filtered scenarios on
/// `(server_name, facilitator_name)`.
#[derive(Clone)]
pub struct Combo {
    pub server_name: String,
    pub facilitator_name: Option<String>,
    pub scenarios: Vec<Scenario>,
    pub combo_index: usize,
    pub port: u16,
}
