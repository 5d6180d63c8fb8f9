//! Environment-variable validation (spec.md §4.13 steps 1 and 5, §6).

use std::collections::HashSet;

use x402_e2e_config::{TestConfig, FRAMEWORK_MANAGED_ENV_VARS};
use x402_e2e_discovery::DiscoveredFacilitator;

/// Global variables every run needs regardless of which facilitators are in
/// play (spec.md §6).
pub const GLOBAL_REQUIRED_ENV_VARS: &[&str] = &[
    "SERVER_EVM_ADDRESS",
    "SERVER_SVM_ADDRESS",
    "CLIENT_EVM_PRIVATE_KEY",
    "CLIENT_SVM_PRIVATE_KEY",
    "FACILITATOR_EVM_PRIVATE_KEY",
    "FACILITATOR_SVM_PRIVATE_KEY",
];

#[derive(Debug, thiserror::Error)]
#[error("missing required environment variable(s): {}", .0.join(", "))]
pub struct MissingEnvVars(pub Vec<String>);

/// Fails with every missing global variable named at once, per spec.md
/// §4.13 step 1's "abort on missing" (itemized, not one-at-a-time).
pub fn validate_global_env<F>(is_set: F) -> Result<(), MissingEnvVars>
where
    F: Fn(&str) -> bool,
{
    let missing: Vec<String> = GLOBAL_REQUIRED_ENV_VARS
        .iter()
        .filter(|name| !is_set(name))
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingEnvVars(missing))
    }
}

/// Fails with an itemized `facilitator: variable` list for every facilitator
/// missing any of its declared `required` env vars, minus the
/// framework-managed keys the orchestrator itself supplies.
pub fn validate_facilitator_env<F>(
    facilitators: &[DiscoveredFacilitator],
    is_set: F,
) -> Result<(), MissingEnvVars>
where
    F: Fn(&str) -> bool,
{
    let managed: HashSet<&str> = FRAMEWORK_MANAGED_ENV_VARS.iter().copied().collect();
    let mut missing = Vec::new();
    for facilitator in facilitators {
        for var in required_vars(&facilitator.config, &managed) {
            if !is_set(var) {
                missing.push(format!("{}: {}", facilitator.name, var));
            }
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingEnvVars(missing))
    }
}

fn required_vars<'a>(config: &'a TestConfig, managed: &HashSet<&str>) -> Vec<&'a str> {
    config
        .required
        .iter()
        .map(String::as_str)
        .filter(|var| !managed.contains(var))
        .collect()
}
