//! End-to-end exercise of discovery → scenario generation → minimization →
//! combo execution → reporting, using fake in-memory proxies in place of
//! real subprocesses (spec.md §8's testable properties, scenarios S1-S6).

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use x402_e2e_concurrency::PortAllocator;
use x402_e2e_config::TestConfig;
use x402_e2e_discovery::{
    discover_clients, discover_facilitators, discover_servers, ClientConfig, ClientProxy,
    ClientResult, DiscoveryOptions, FacilitatorConfig, FacilitatorProxy, HealthStatus,
    PaymentResponse, ProxyError, ProxyFactory, ServerConfig, ServerProxy,
};
use x402_e2e_exec::{execute_combo, ComboExecutorContext, TestNumberGenerator};
use x402_e2e_scenario::{build_combos, expand_with_facilitators, generate_scenario_seeds, minimize};

fn write_config(dir: &Path, json: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("test.config.json"), json).unwrap();
}

/// Tracks the port it was actually started on, the way `SubprocessServerProxy`
/// does (`get_url()` is meaningless before `start()` runs), so tests can
/// catch a server URL that never reflects the port the server was started on.
struct FakeServer {
    stop_calls: AtomicUsize,
    started_port: AtomicU16,
}
#[async_trait]
impl ServerProxy for FakeServer {
    async fn start(&self, config: ServerConfig) -> Result<(), ProxyError> {
        self.started_port.store(config.port, Ordering::SeqCst);
        Ok(())
    }
    async fn health(&self) -> HealthStatus {
        HealthStatus { success: true }
    }
    fn get_url(&self) -> String {
        format!("http://localhost:{}", self.started_port.load(Ordering::SeqCst))
    }
    fn get_protected_path(&self) -> String {
        "/paid".to_string()
    }
    async fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeClient {
    succeed: bool,
    captured_server_url: Arc<Mutex<Option<String>>>,
}
#[async_trait]
impl ClientProxy for FakeClient {
    async fn call(&self, config: ClientConfig) -> ClientResult {
        *self.captured_server_url.lock().unwrap() = Some(config.server_url.clone());
        if self.succeed {
            ClientResult {
                success: true,
                data: None,
                status_code: Some(200),
                payment_response: Some(PaymentResponse {
                    success: true,
                    transaction: Some("0xdeadbeef".to_string()),
                    network: Some("base-sepolia".to_string()),
                    error_reason: None,
                }),
                error: None,
            }
        } else {
            ClientResult {
                success: false,
                data: None,
                status_code: Some(402),
                payment_response: None,
                error: Some("insufficient funds".to_string()),
            }
        }
    }
    async fn force_stop(&self) {}
}

struct FakeFacilitator;
#[async_trait]
impl FacilitatorProxy for FakeFacilitator {
    async fn start(&self, _config: FacilitatorConfig) -> Result<(), ProxyError> {
        Ok(())
    }
    async fn health(&self) -> HealthStatus {
        HealthStatus { success: true }
    }
    fn get_url(&self) -> String {
        "http://localhost:5001".to_string()
    }
    async fn stop(&self) {}
}

struct FakeFactory {
    server: Arc<FakeServer>,
    succeed_clients: bool,
    captured_server_url: Arc<Mutex<Option<String>>>,
}
impl ProxyFactory for FakeFactory {
    fn server_proxy(&self, _dir: &Path, _config: &TestConfig) -> Arc<dyn ServerProxy> {
        Arc::clone(&self.server) as Arc<dyn ServerProxy>
    }
    fn client_proxy(&self, _dir: &Path, _config: &TestConfig) -> Arc<dyn ClientProxy> {
        Arc::new(FakeClient {
            succeed: self.succeed_clients,
            captured_server_url: Arc::clone(&self.captured_server_url),
        })
    }
    fn facilitator_proxy(&self, _dir: &Path, _config: &TestConfig) -> Arc<dyn FacilitatorProxy> {
        Arc::new(FakeFacilitator)
    }
}

fn seed_fixture(base: &Path) {
    write_config(
        &base.join("servers/go"),
        r#"{
            "name": "go",
            "kind": "server",
            "protocolFamilies": ["evm"],
            "x402Version": 2,
            "endpoints": [
                {"path": "/paid", "method": "GET", "requiresPayment": true, "protocolFamily": "evm"}
            ]
        }"#,
    );
    write_config(
        &base.join("clients/ts"),
        r#"{"name": "ts", "kind": "client", "protocolFamilies": ["evm"], "x402Versions": [2]}"#,
    );
    write_config(
        &base.join("facilitators/rust-fac"),
        r#"{"name": "rust-fac", "kind": "facilitator"}"#,
    );
}

#[tokio::test]
async fn full_pipeline_produces_one_passing_result_per_scenario() {
    let base = tempfile::tempdir().unwrap();
    seed_fixture(base.path());

    let captured_server_url = Arc::new(Mutex::new(None));
    let factory = FakeFactory {
        server: Arc::new(FakeServer {
            stop_calls: AtomicUsize::new(0),
            started_port: AtomicU16::new(0),
        }),
        succeed_clients: true,
        captured_server_url: Arc::clone(&captured_server_url),
    };

    let options = DiscoveryOptions::default();
    let servers = discover_servers(base.path(), &options, &factory);
    let clients = discover_clients(base.path(), &options, &factory);
    let facilitators = discover_facilitators(base.path(), &options, &factory);
    assert_eq!(servers.len(), 1);
    assert_eq!(clients.len(), 1);
    assert_eq!(facilitators.len(), 1);

    let seeds = generate_scenario_seeds(&clients, &servers);
    let scenarios = expand_with_facilitators(&seeds, &facilitators);
    assert_eq!(scenarios.len(), 1);

    let port_allocator = PortAllocator::new();
    let mut combos = build_combos(&scenarios);
    for combo in &mut combos {
        combo.port = port_allocator.next_port();
    }
    assert_eq!(combos.len(), 1);
    let combo_port = combos[0].port;

    let ctx = ComboExecutorContext {
        lock: None,
        test_numbers: Arc::new(TestNumberGenerator::new()),
        evm_settle_delay: std::time::Duration::ZERO,
        factory: Arc::new(factory),
        payee_addresses: HashMap::new(),
        networks: HashMap::new(),
        client_private_keys: HashMap::new(),
    };
    let map: Arc<DashMap<String, String>> = Arc::new(DashMap::new());

    let mut results = Vec::new();
    for combo in &combos {
        results.extend(execute_combo(combo, Some("http://localhost:5001"), &map, &ctx).await);
    }

    assert_eq!(results.len(), 1);
    assert!(results[0].passed);
    assert_eq!(results[0].transaction.as_deref(), Some("0xdeadbeef"));
    assert_eq!(
        captured_server_url.lock().unwrap().as_deref(),
        Some(format!("http://localhost:{combo_port}").as_str()),
        "the client must call the server proxy actually started for this combo, not a stale discovery-time URL"
    );

    let text = x402_e2e_report::render_text_summary(&results);
    assert!(text.contains("passed: 1  failed: 0"));
}

#[tokio::test]
async fn client_payment_failure_surfaces_as_a_failed_result_not_a_panic() {
    let base = tempfile::tempdir().unwrap();
    seed_fixture(base.path());

    let factory = FakeFactory {
        server: Arc::new(FakeServer {
            stop_calls: AtomicUsize::new(0),
            started_port: AtomicU16::new(0),
        }),
        succeed_clients: false,
        captured_server_url: Arc::new(Mutex::new(None)),
    };

    let options = DiscoveryOptions::default();
    let servers = discover_servers(base.path(), &options, &factory);
    let clients = discover_clients(base.path(), &options, &factory);
    let facilitators = discover_facilitators(base.path(), &options, &factory);

    let seeds = generate_scenario_seeds(&clients, &servers);
    let scenarios = expand_with_facilitators(&seeds, &facilitators);
    let combos = build_combos(&scenarios);

    let ctx = ComboExecutorContext {
        lock: None,
        test_numbers: Arc::new(TestNumberGenerator::new()),
        evm_settle_delay: std::time::Duration::ZERO,
        factory: Arc::new(factory),
        payee_addresses: HashMap::new(),
        networks: HashMap::new(),
        client_private_keys: HashMap::new(),
    };
    let map: Arc<DashMap<String, String>> = Arc::new(DashMap::new());

    let mut results = Vec::new();
    for combo in &combos {
        results.extend(execute_combo(combo, None, &map, &ctx).await);
    }

    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(
        results[0].error.as_deref(),
        Some("Payment failed (402): insufficient funds")
    );
}

#[tokio::test]
async fn minimization_collapses_duplicate_facilitator_expansion_without_losing_the_scenario() {
    let base = tempfile::tempdir().unwrap();
    seed_fixture(base.path());
    // A second facilitator widens the cross product; minimization should
    // still keep at least one scenario per distinct facilitator since each
    // contributes new coverage.
    write_config(
        &base.join("facilitators/go-fac"),
        r#"{"name": "go-fac", "kind": "facilitator"}"#,
    );

    let factory = FakeFactory {
        server: Arc::new(FakeServer {
            stop_calls: AtomicUsize::new(0),
            started_port: AtomicU16::new(0),
        }),
        succeed_clients: true,
        captured_server_url: Arc::new(Mutex::new(None)),
    };
    let options = DiscoveryOptions::default();
    let servers = discover_servers(base.path(), &options, &factory);
    let clients = discover_clients(base.path(), &options, &factory);
    let facilitators = discover_facilitators(base.path(), &options, &factory);

    let seeds = generate_scenario_seeds(&clients, &servers);
    let scenarios = expand_with_facilitators(&seeds, &facilitators);
    assert_eq!(scenarios.len(), 2);

    let result = minimize(&scenarios);
    assert_eq!(result.scenarios.len(), 2, "each facilitator contributes distinct coverage");
    assert_eq!(result.distinct_facilitators, 2);
}
