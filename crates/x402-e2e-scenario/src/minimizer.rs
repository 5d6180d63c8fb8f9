use std::collections::HashMap;

use crate::coverage::CoverageTracker;
use crate::types::Scenario;

/// Result of minimization: the reduced scenario list plus the stats
/// spec.md §4.4 asks the minimizer to report.
#[derive(Debug, Clone)]
pub struct MinimizationResult {
    pub scenarios: Vec<Scenario>,
    pub total_input: usize,
    pub reduction_percent: f64,
    pub distinct_clients: usize,
    pub distinct_servers: usize,
    pub distinct_facilitators: usize,
    pub distinct_endpoints: usize,
}

/// Groups scenarios by `(server_name, facilitator_name)`, sorts the groups
/// by facilitator name **descending** then server name **ascending**, and
/// round-robin interleaves scenarios across groups.
///
/// A missing facilitator sorts as the empty string, so `facilitator = None`
/// groups land last under descending order — see DESIGN.md's "Open
/// Question Decisions" for why this reading was chosen.
fn balanced_pre_sort(scenarios: &[Scenario]) -> Vec<Scenario> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<Scenario>> = HashMap::new();

    for scenario in scenarios {
        let key = (
            scenario.server.name.clone(),
            scenario.facilitator_name().unwrap_or_default().to_string(),
        );
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(scenario.clone());
    }

    // facilitator name descending, then server name ascending.
    order.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let queues: Vec<Vec<Scenario>> = order
        .iter()
        .map(|key| groups.remove(key).unwrap_or_default())
        .collect();

    let total: usize = queues.iter().map(Vec::len).sum();
    let mut result = Vec::with_capacity(total);
    let mut cursors = vec![0usize; queues.len()];

    loop {
        let mut progressed = false;
        for (queue, cursor) in queues.iter().zip(cursors.iter_mut()) {
            if let Some(scenario) = queue.get(*cursor) {
                result.push(scenario.clone());
                *cursor += 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    result
}

/// Applies the balanced pre-sort followed by greedy set-cover: a scenario
/// is kept iff it provides coverage the tracker hasn't already seen
/// (spec.md §4.4, §8 invariant 2).
pub fn minimize(scenarios: &[Scenario]) -> MinimizationResult {
    let total_input = scenarios.len();
    if total_input == 0 {
        return MinimizationResult {
            scenarios: Vec::new(),
            total_input: 0,
            reduction_percent: 0.0,
            distinct_clients: 0,
            distinct_servers: 0,
            distinct_facilitators: 0,
            distinct_endpoints: 0,
        };
    }

    let pre_sorted = balanced_pre_sort(scenarios);
    let mut tracker = CoverageTracker::new();
    let mut kept = Vec::new();

    for scenario in pre_sorted {
        if tracker.is_new_coverage(&scenario) {
            tracker.mark_covered(&scenario);
            kept.push(scenario);
        }
    }

    let reduction_percent = if total_input == 0 {
        0.0
    } else {
        100.0 * (1.0 - kept.len() as f64 / total_input as f64)
    };

    let distinct_clients = kept
        .iter()
        .map(|s| s.client.name.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    let distinct_servers = kept
        .iter()
        .map(|s| s.server.name.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    let distinct_facilitators = kept
        .iter()
        .filter_map(|s| s.facilitator_name())
        .collect::<std::collections::HashSet<_>>()
        .len();
    let distinct_endpoints = kept
        .iter()
        .map(|s| s.endpoint.path.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    MinimizationResult {
        scenarios: kept,
        total_input,
        reduction_percent,
        distinct_clients,
        distinct_servers,
        distinct_facilitators,
        distinct_endpoints,
    }
}
