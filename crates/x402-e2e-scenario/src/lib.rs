//! Scenario generation, coverage tracking, and minimization
//! (spec.md §4.3, §4.4).

mod combo;
mod coverage;
mod generator;
mod minimizer;
mod types;

#[cfg(test)]
mod tests_support;

pub use combo::build_combos;
pub use coverage::{coverage_keys, CoverageKeys, CoverageTracker};
pub use generator::{expand_with_facilitators, generate_scenario_seeds};
pub use minimizer::{minimize, MinimizationResult};
pub use types::{Combo, DetailedTestResult, Scenario, ScenarioResult};
