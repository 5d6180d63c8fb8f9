use std::collections::HashSet;

use crate::types::Scenario;

/// The four stable string identifiers a scenario contributes to coverage
/// (spec.md §3's `CoverageKey` definitions).
#[derive(Debug, Clone)]
pub struct CoverageKeys {
    pub client: String,
    pub server: String,
    pub facilitator: Option<String>,
    pub endpoint: String,
}

/// Builds the coverage keys for one scenario.
///
/// `"{name}-{protocolFamily}-v{version}"` for component keys;
/// `"{serverName}-{endpointPath}-{protocolFamily}[-{transferMethod}]-v{version}"`
/// for the endpoint key, with the transfer-method suffix present only for
/// `evm` endpoints.
pub fn coverage_keys(scenario: &Scenario) -> CoverageKeys {
    let version = scenario.server_version;
    let family = scenario.protocol_family;

    let client = format!("{}-{}-v{}", scenario.client.name, family, version);
    let server = format!("{}-{}-v{}", scenario.server.name, family, version);
    let facilitator = scenario
        .facilitator_name()
        .map(|name| format!("{}-{}-v{}", name, family, version));

    let endpoint = {
        use x402_e2e_config::ProtocolFamily;
        let base = format!(
            "{}-{}-{}",
            scenario.server.name, scenario.endpoint.path, family
        );
        if family == ProtocolFamily::Evm {
            format!("{}-{}-v{}", base, scenario.endpoint.transfer_method(), version)
        } else {
            format!("{}-v{}", base, version)
        }
    };

    CoverageKeys {
        client,
        server,
        facilitator,
        endpoint,
    }
}

/// Tracks which component/endpoint coverage keys have been exercised so
/// far. Monotonic: once a key is marked, it is never removed (spec.md §4.4,
/// §8 invariant 1).
#[derive(Debug, Default)]
pub struct CoverageTracker {
    clients: HashSet<String>,
    servers: HashSet<String>,
    facilitators: HashSet<String>,
    endpoints: HashSet<String>,
}

impl CoverageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff *any* of the scenario's four keys is not yet covered.
    pub fn is_new_coverage(&self, scenario: &Scenario) -> bool {
        let keys = coverage_keys(scenario);
        !self.clients.contains(&keys.client)
            || !self.servers.contains(&keys.server)
            || keys
                .facilitator
                .as_ref()
                .is_some_and(|f| !self.facilitators.contains(f))
            || !self.endpoints.contains(&keys.endpoint)
    }

    /// Marks all four of the scenario's keys covered, atomically with
    /// respect to observers of `is_new_coverage` (single-threaded use during
    /// minimization — spec.md §5's "not touched during execution").
    /// Idempotent.
    pub fn mark_covered(&mut self, scenario: &Scenario) {
        let keys = coverage_keys(scenario);
        self.clients.insert(keys.client);
        self.servers.insert(keys.server);
        if let Some(f) = keys.facilitator {
            self.facilitators.insert(f);
        }
        self.endpoints.insert(keys.endpoint);
    }
}
