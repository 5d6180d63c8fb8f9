//! Top-level orchestrator (spec.md §4.13): binds every component together
//! in the fixed 15-step sequence, each step gating the next.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use x402_e2e_concurrency::{FacilitatorLock, PortAllocator, Semaphore};
use x402_e2e_config::ProtocolFamily;
use x402_e2e_discovery::{
    discover_clients, discover_facilitators, discover_servers, DiscoveryOptions, ProxyFactory,
};
use x402_e2e_exec::{execute_combo, ComboExecutorContext, FacilitatorManager, TestNumberGenerator};
use x402_e2e_proxy::SubprocessProxyFactory;
use x402_e2e_report::NetworkMode;
use x402_e2e_scenario::{
    build_combos, expand_with_facilitators, generate_scenario_seeds, minimize, DetailedTestResult,
};

use crate::cli::Cli;
use crate::env_check::{validate_facilitator_env, validate_global_env};
use crate::error::OrchestratorError;

/// Reads the orchestrator's required global env vars, building the
/// per-protocol-family address/network/key maps every combo's server start
/// and client call reuses (spec.md §6).
fn resolve_global_env() -> (
    HashMap<ProtocolFamily, String>,
    HashMap<ProtocolFamily, String>,
    HashMap<ProtocolFamily, String>,
) {
    let mut payee_addresses = HashMap::new();
    if let Ok(v) = std::env::var("SERVER_EVM_ADDRESS") {
        payee_addresses.insert(ProtocolFamily::Evm, v);
    }
    if let Ok(v) = std::env::var("SERVER_SVM_ADDRESS") {
        payee_addresses.insert(ProtocolFamily::Svm, v);
    }

    let mut networks = HashMap::new();
    if let Ok(v) = std::env::var("EVM_NETWORK") {
        networks.insert(ProtocolFamily::Evm, v);
    }
    if let Ok(v) = std::env::var("SVM_NETWORK") {
        networks.insert(ProtocolFamily::Svm, v);
    }

    let mut client_private_keys = HashMap::new();
    if let Ok(v) = std::env::var("CLIENT_EVM_PRIVATE_KEY") {
        client_private_keys.insert(ProtocolFamily::Evm, v);
    }
    if let Ok(v) = std::env::var("CLIENT_SVM_PRIVATE_KEY") {
        client_private_keys.insert(ProtocolFamily::Svm, v);
    }

    (payee_addresses, networks, client_private_keys)
}

/// Runs an external permit2 base-approval setup command (spec.md §4.13 step
/// 9). `<base>/permit2-setup.sh`, if present, is invoked with no arguments;
/// its absence is not itself a failure — only a present-but-failing script
/// aborts the run.
fn run_permit2_setup(base_dir: &std::path::Path) -> Result<(), OrchestratorError> {
    let script = base_dir.join("permit2-setup.sh");
    if !script.exists() {
        return Ok(());
    }
    let status = std::process::Command::new(&script)
        .current_dir(base_dir)
        .status()
        .map_err(|err| OrchestratorError::Permit2SetupFailed(err.to_string()))?;
    if !status.success() {
        return Err(OrchestratorError::Permit2SetupFailed(format!(
            "{} exited with {status}",
            script.display()
        )));
    }
    Ok(())
}

/// Runs the full orchestrator sequence against real subprocesses, driven by
/// `SubprocessProxyFactory`. The thin, production entry point; tests drive
/// [`run_with_factory`] directly with an in-memory fake instead.
pub async fn run(cli: &Cli) -> Result<Vec<DetailedTestResult>, OrchestratorError> {
    let factory: Arc<dyn ProxyFactory> =
        Arc::new(SubprocessProxyFactory::new("./run.sh", HashMap::new()));
    run_with_factory(cli, factory).await
}

/// Runs the full orchestrator sequence and returns the final results. The
/// caller decides the process exit code from `results` (spec.md §4.13 step
/// 15: non-zero if any test failed). `factory` builds every proxy discovery
/// and execution construct — real subprocesses in production, in-memory
/// fakes in tests.
pub async fn run_with_factory(
    cli: &Cli,
    factory: Arc<dyn ProxyFactory>,
) -> Result<Vec<DetailedTestResult>, OrchestratorError> {
    // Step 1: validate global env vars.
    validate_global_env(|name| std::env::var(name).is_ok()).map_err(OrchestratorError::GlobalEnv)?;
    let (payee_addresses, networks, client_private_keys) = resolve_global_env();

    // Step 2: discovery.
    let discovery_options = DiscoveryOptions {
        include_legacy: cli.include_legacy,
    };
    let servers = discover_servers(&cli.base_dir, &discovery_options, factory.as_ref());
    let clients = discover_clients(&cli.base_dir, &discovery_options, factory.as_ref());
    let facilitators = discover_facilitators(&cli.base_dir, &discovery_options, factory.as_ref());

    // Step 3: scenario generation.
    let seeds = generate_scenario_seeds(&clients, &servers);
    let scenarios = expand_with_facilitators(&seeds, &facilitators);
    if scenarios.is_empty() {
        tracing::info!("No test scenarios found");
        println!("No test scenarios found");
        return Ok(Vec::new());
    }

    // Step 4: selection / minimization.
    let filtered = if cli.min {
        minimize(&scenarios).scenarios
    } else {
        scenarios
    };

    // Step 5: per-facilitator required env vars.
    validate_facilitator_env(&facilitators, |name| std::env::var(name).is_ok())
        .map_err(OrchestratorError::FacilitatorEnv)?;

    // Step 6: best-effort cleanup of stale ports; brief settle sleep.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Step 7: allocate ports (one per facilitator, one per combo).
    let port_allocator = PortAllocator::new();
    let facilitator_ports: HashMap<String, u16> = facilitators
        .iter()
        .map(|f| (f.name.clone(), port_allocator.next_port()))
        .collect();
    let mut combos = build_combos(&filtered);
    for combo in &mut combos {
        combo.port = port_allocator.next_port();
    }

    // Step 8: eager-start facilitator managers; await all `ready()` in
    // sequence, aborting on the first failure.
    let mut managers = Vec::with_capacity(facilitators.len());
    for facilitator in &facilitators {
        let port = facilitator_ports[&facilitator.name];
        let config = x402_e2e_discovery::FacilitatorConfig {
            port,
            networks: facilitator.config.protocol_families().iter().map(ToString::to_string).collect(),
            extra_env: HashMap::new(),
        };
        managers.push((
            facilitator.name.clone(),
            Arc::new(FacilitatorManager::new(
                facilitator.name.clone(),
                Arc::clone(&facilitator.proxy),
                config,
            )),
        ));
    }
    let mut facilitator_urls: HashMap<String, String> = HashMap::new();
    for (name, manager) in &managers {
        match manager.ready().await {
            Some(url) => {
                facilitator_urls.insert(name.clone(), url);
            }
            None => return Err(OrchestratorError::FacilitatorStartFailed(name.clone())),
        }
    }

    // Step 9: permit2 base approval, only relevant when permit2 scenarios exist.
    let has_permit2 = filtered
        .iter()
        .any(|s| s.endpoint.transfer_method() == x402_e2e_config::TransferMethod::Permit2);
    if has_permit2 {
        run_permit2_setup(&cli.base_dir)?;
    }

    // Step 10-11: execute combos under the semaphore, flatten results.
    let concurrency = if cli.parallel { cli.concurrency.max(1) } else { 1 };
    let semaphore = Semaphore::new(concurrency);
    let lock = if cli.parallel {
        Some(FacilitatorLock::new())
    } else {
        None
    };
    let facilitator_server_map: Arc<DashMap<String, String>> = Arc::new(DashMap::new());
    let exec_ctx = Arc::new(ComboExecutorContext {
        lock,
        test_numbers: Arc::new(TestNumberGenerator::new()),
        evm_settle_delay: Duration::from_millis(cli.evm_settle_ms),
        factory: Arc::clone(&factory),
        payee_addresses,
        networks,
        client_private_keys,
    });

    let mut handles = Vec::with_capacity(combos.len());
    for combo in combos {
        let semaphore = Arc::clone(&semaphore);
        let facilitator_url = combo
            .facilitator_name
            .as_ref()
            .and_then(|name| facilitator_urls.get(name))
            .cloned();
        let map = Arc::clone(&facilitator_server_map);
        let ctx = Arc::clone(&exec_ctx);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await;
            execute_combo(&combo, facilitator_url.as_deref(), &map, &ctx).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.extend(handle.await.unwrap_or_default());
    }

    // Step 12: post-test discovery validation is an external collaborator
    // (out of scope); `facilitator_server_map` is exposed for it.
    let _ = &facilitator_server_map;

    // Step 13: stop all facilitator managers in parallel.
    let stop_handles: Vec<_> = managers
        .into_iter()
        .map(|(_, manager)| tokio::spawn(async move { manager.stop().await }))
        .collect();
    for handle in stop_handles {
        let _ = handle.await;
    }

    // Step 14: emit summary.
    println!("{}", x402_e2e_report::render_text_summary(&results));
    if let Some(path) = &cli.output_json {
        x402_e2e_report::write_json_report(path, &results, NetworkMode::from(cli.network_mode))?;
    }

    Ok(results)
}
