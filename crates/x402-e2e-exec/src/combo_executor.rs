//! Combo execution (spec.md §4.11) and the per-scenario run-single-test
//! subroutine (spec.md §4.12).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use x402_e2e_concurrency::FacilitatorLock;
use x402_e2e_config::ProtocolFamily;
use x402_e2e_discovery::{ClientConfig, ClientProxy, ProxyFactory, ServerConfig};
use x402_e2e_proxy::HealthPollOptions;
use x402_e2e_scenario::{Combo, DetailedTestResult, Scenario};

use crate::test_number::TestNumberGenerator;

/// Settings that are uniform across every combo in a run (spec.md §4.11's
/// inputs, minus the combo-specific bits).
pub struct ComboExecutorContext {
    pub lock: Option<Arc<FacilitatorLock>>,
    pub test_numbers: Arc<TestNumberGenerator>,
    pub evm_settle_delay: Duration,
    pub factory: Arc<dyn ProxyFactory>,
    /// Payee address per protocol family, resolved once from global env vars
    /// during orchestrator setup (spec.md §4.13 step 1) and reused for every
    /// combo's server start.
    pub payee_addresses: HashMap<ProtocolFamily, String>,
    /// Network name per protocol family (e.g. `evm` -> `base-sepolia`),
    /// resolved the same way.
    pub networks: HashMap<ProtocolFamily, String>,
    /// Client private key per protocol family, resolved from
    /// `CLIENT_EVM_PRIVATE_KEY` / `CLIENT_SVM_PRIVATE_KEY` during setup.
    pub client_private_keys: HashMap<ProtocolFamily, String>,
}

/// Append-only `facilitator → serverName` tracking map populated as combos
/// execute, consumed by post-test discovery validation (spec.md §4.11 step
/// 1, §4.13 step 12).
pub type FacilitatorServerMap = Arc<DashMap<String, String>>;

/// Runs every scenario in `combo` against a freshly constructed server
/// proxy, returning one [`DetailedTestResult`] per scenario. Always stops
/// the server proxy before returning, on every exit path.
pub async fn execute_combo(
    combo: &Combo,
    facilitator_url: Option<&str>,
    facilitator_server_map: &FacilitatorServerMap,
    ctx: &ComboExecutorContext,
) -> Vec<DetailedTestResult> {
    if let Some(facilitator_name) = &combo.facilitator_name {
        facilitator_server_map.insert(facilitator_name.clone(), combo.server_name.clone());
    }

    let Some(first) = combo.scenarios.first() else {
        return Vec::new();
    };
    let server_proxy = ctx
        .factory
        .server_proxy(&first.server.directory, &first.server.config);

    let families = first.server.config.protocol_families();
    let payee_addresses: HashMap<ProtocolFamily, String> = families
        .iter()
        .filter_map(|family| {
            ctx.payee_addresses
                .get(family)
                .map(|addr| (*family, addr.clone()))
        })
        .collect();
    let networks: Vec<String> = families
        .iter()
        .filter_map(|family| ctx.networks.get(family).cloned())
        .collect();

    let start_result = server_proxy
        .start(ServerConfig {
            port: combo.port,
            payee_addresses,
            networks,
            facilitator_url: facilitator_url.map(ToString::to_string),
        })
        .await;

    let results = if start_result.is_err() {
        combo
            .scenarios
            .iter()
            .map(|scenario| failed_result(ctx.test_numbers.next(), scenario, "Server failed to start"))
            .collect()
    } else {
        let options = HealthPollOptions::server_default(combo.server_name.clone());
        let healthy =
            x402_e2e_proxy::wait_for_health(&options, || async { server_proxy.health().await.success })
                .await;

        if !healthy {
            combo
                .scenarios
                .iter()
                .map(|scenario| failed_result(ctx.test_numbers.next(), scenario, "Server failed to start"))
                .collect()
        } else {
            let server_url = server_proxy.get_url();
            let mut results = Vec::with_capacity(combo.scenarios.len());
            for scenario in &combo.scenarios {
                let result = run_scenario(scenario, facilitator_url, &server_url, ctx).await;
                results.push(result);
            }
            results
        }
    };

    server_proxy.stop().await;
    results
}

async fn run_scenario(
    scenario: &Scenario,
    facilitator_url: Option<&str>,
    server_url: &str,
    ctx: &ComboExecutorContext,
) -> DetailedTestResult {
    let test_number = ctx.test_numbers.next();

    let use_lock = scenario.protocol_family == ProtocolFamily::Evm
        && scenario.facilitator.is_some()
        && ctx.lock.is_some();

    if use_lock {
        let facilitator_name = scenario.facilitator_name().expect("checked above");
        let key = x402_e2e_concurrency::evm_key(facilitator_name);
        let lock = ctx.lock.as_ref().expect("checked above");
        let guard = lock.acquire(&key).await;
        let result = run_single_test(scenario, test_number, server_url, &ctx.client_private_keys).await;
        tokio::time::sleep(ctx.evm_settle_delay).await;
        guard.release();
        result
    } else {
        run_single_test(scenario, test_number, server_url, &ctx.client_private_keys).await
    }
}

/// The run-single-test subroutine (spec.md §4.12). Guaranteed to call
/// `client.force_stop()` on every exit path. `server_url` is the URL of the
/// server proxy `execute_combo` actually started on `combo.port` — never
/// the discovery-time proxy's own `get_url()`, which has no running
/// subprocess behind it.
pub async fn run_single_test(
    scenario: &Scenario,
    test_number: u64,
    server_url: &str,
    client_private_keys: &HashMap<ProtocolFamily, String>,
) -> DetailedTestResult {
    tracing::info!(
        test_number,
        client = %scenario.client.name,
        server = %scenario.server.name,
        endpoint = %scenario.endpoint.path,
        "running test"
    );

    let mut private_keys = HashMap::new();
    if let Some(key) = client_private_keys.get(&scenario.protocol_family) {
        private_keys.insert(scenario.protocol_family, key.clone());
    }

    let config = ClientConfig {
        private_keys,
        server_url: server_url.to_string(),
        endpoint_path: scenario.endpoint.path.clone(),
    };

    let call_result = scenario.client.proxy.call(config).await;
    scenario.client.proxy.force_stop().await;

    classify(scenario, test_number, call_result)
}

fn classify(
    scenario: &Scenario,
    test_number: u64,
    result: x402_e2e_discovery::ClientResult,
) -> DetailedTestResult {
    let base = |passed: bool, error: Option<String>, transaction: Option<String>, network: Option<String>| {
        DetailedTestResult {
            test_number,
            client: scenario.client.name.clone(),
            server: scenario.server.name.clone(),
            endpoint: scenario.endpoint.path.clone(),
            facilitator: scenario.facilitator_name().map(ToString::to_string),
            protocol_family: scenario.protocol_family,
            passed,
            error,
            transaction,
            network,
        }
    };

    if !result.success {
        if let Some(status) = result.status_code {
            if status == 402 {
                let decoded = result.error.clone().unwrap_or_else(|| "unknown".to_string());
                return base(false, Some(format!("Payment failed (402): {decoded}")), None, None);
            }
        }
        return base(false, result.error, None, None);
    }

    let Some(payment_response) = result.payment_response else {
        return base(
            true,
            None,
            None,
            None,
        );
    };

    if !payment_response.success {
        return base(
            false,
            Some(payment_response.error_reason.unwrap_or_else(|| "payment unsuccessful".to_string())),
            None,
            payment_response.network,
        );
    }

    if payment_response.transaction.is_none() {
        return base(false, Some("no transaction hash".to_string()), None, payment_response.network);
    }

    if let Some(reason) = payment_response.error_reason.filter(|r| !r.is_empty()) {
        return base(false, Some(reason), payment_response.transaction, payment_response.network);
    }

    base(true, None, payment_response.transaction, payment_response.network)
}

fn failed_result(test_number: u64, scenario: &Scenario, message: &str) -> DetailedTestResult {
    DetailedTestResult {
        test_number,
        client: scenario.client.name.clone(),
        server: scenario.server.name.clone(),
        endpoint: scenario.endpoint.path.clone(),
        facilitator: scenario.facilitator_name().map(ToString::to_string),
        protocol_family: scenario.protocol_family,
        passed: false,
        error: Some(message.to_string()),
        transaction: None,
        network: None,
    }
}
