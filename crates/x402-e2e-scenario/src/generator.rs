use x402_e2e_discovery::{DiscoveredClient, DiscoveredFacilitator, DiscoveredServer};

use crate::types::Scenario;

/// Cross-products discovered clients, servers, and their payment-required
/// endpoints, applying the compatibility filters of spec.md §4.3. Does not
/// yet associate a facilitator — see [`expand_with_facilitators`].
pub fn generate_scenario_seeds(
    clients: &[DiscoveredClient],
    servers: &[DiscoveredServer],
) -> Vec<Scenario> {
    let mut scenarios = Vec::new();

    for server in servers {
        let Some(server_version) = server.config.x402_version else {
            tracing::debug!(server = %server.name, "server has no x402Version, skipping");
            continue;
        };

        for client in clients {
            if client.config.x402_versions.is_empty() {
                tracing::debug!(client = %client.name, "client has no x402Versions, skipping");
                continue;
            }
            if !client.config.x402_versions.contains(&server_version) {
                continue;
            }

            let client_families = client.config.protocol_families();

            for endpoint in server.config.payment_endpoints() {
                let family = endpoint.protocol_family();
                if !client_families.contains(&family) {
                    continue;
                }

                scenarios.push(Scenario {
                    client: client.clone(),
                    server: server.clone(),
                    facilitator: None,
                    endpoint: endpoint.clone(),
                    protocol_family: family,
                    server_version,
                });
            }
        }
    }

    scenarios
}

/// Materializes one scenario per eligible facilitator (or a single
/// `facilitator = None` scenario when no facilitators were supplied),
/// per spec.md §4.3's "Facilitator association is performed later" note.
pub fn expand_with_facilitators(
    seeds: &[Scenario],
    facilitators: &[DiscoveredFacilitator],
) -> Vec<Scenario> {
    if facilitators.is_empty() {
        return seeds.to_vec();
    }

    let mut expanded = Vec::with_capacity(seeds.len() * facilitators.len());
    for seed in seeds {
        for facilitator in facilitators {
            let mut scenario = seed.clone();
            scenario.facilitator = Some(facilitator.clone());
            expanded.push(scenario);
        }
    }
    expanded
}
