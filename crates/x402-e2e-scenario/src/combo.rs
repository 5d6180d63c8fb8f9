use std::collections::HashMap;

use crate::types::{Combo, Scenario};

/// Groups scenarios on `(server_name, facilitator_name)` into combos. One
/// combo shares exactly one server subprocess lifetime (spec.md §3).
///
/// Ports are left at `0`; the caller (the orchestrator) assigns a unique
/// port per combo after this grouping, once it knows how many combos exist.
pub fn build_combos(scenarios: &[Scenario]) -> Vec<Combo> {
    let mut order: Vec<(String, Option<String>)> = Vec::new();
    let mut groups: HashMap<(String, Option<String>), Vec<Scenario>> = HashMap::new();

    for scenario in scenarios {
        let key = (
            scenario.server.name.clone(),
            scenario.facilitator_name().map(str::to_string),
        );
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(scenario.clone());
    }

    order
        .into_iter()
        .enumerate()
        .map(|(combo_index, key)| {
            let scenarios = groups.remove(&key).unwrap_or_default();
            Combo {
                server_name: key.0,
                facilitator_name: key.1,
                scenarios,
                combo_index,
                port: 0,
            }
        })
        .collect()
}
