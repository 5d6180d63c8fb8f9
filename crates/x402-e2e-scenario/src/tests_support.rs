//! Test-only scenario builders shared across this crate's unit tests.

#![cfg(test)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use x402_e2e_config::{ComponentKind, Endpoint, ProtocolFamily, TestConfig};
use x402_e2e_discovery::{
    ClientConfig, ClientProxy, ClientResult, DiscoveredClient, DiscoveredFacilitator,
    DiscoveredServer, FacilitatorConfig, FacilitatorProxy, HealthStatus, ProxyError,
    ServerConfig, ServerProxy,
};

use crate::types::Scenario;

struct FakeServer;
#[async_trait]
impl ServerProxy for FakeServer {
    async fn start(&self, _config: ServerConfig) -> Result<(), ProxyError> {
        Ok(())
    }
    async fn health(&self) -> HealthStatus {
        HealthStatus { success: true }
    }
    fn get_url(&self) -> String {
        "http://localhost:0".into()
    }
    fn get_protected_path(&self) -> String {
        "/paid".into()
    }
    async fn stop(&self) {}
}

struct FakeClient;
#[async_trait]
impl ClientProxy for FakeClient {
    async fn call(&self, _config: ClientConfig) -> ClientResult {
        ClientResult {
            success: true,
            data: None,
            status_code: Some(200),
            payment_response: None,
            error: None,
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
        "http://localhost:0".into()
    }
    async fn stop(&self) {}
}

pub(crate) fn make_client(name: &str, versions: &[u32], families: &[ProtocolFamily]) -> DiscoveredClient {
    DiscoveredClient {
        name: name.to_string(),
        directory: PathBuf::from(format!("clients/{name}")),
        config: TestConfig {
            name: name.to_string(),
            kind: ComponentKind::Client,
            language: "rust".into(),
            protocol_families: families.to_vec(),
            x402_version: None,
            x402_versions: versions.to_vec(),
            endpoints: Vec::new(),
            required: Vec::new(),
            optional: Vec::new(),
        },
        proxy: Arc::new(FakeClient),
    }
}

pub(crate) fn make_server(name: &str, version: u32, endpoint: Endpoint) -> DiscoveredServer {
    DiscoveredServer {
        name: name.to_string(),
        directory: PathBuf::from(format!("servers/{name}")),
        config: TestConfig {
            name: name.to_string(),
            kind: ComponentKind::Server,
            language: "rust".into(),
            protocol_families: Vec::new(),
            x402_version: Some(version),
            x402_versions: Vec::new(),
            endpoints: vec![endpoint],
            required: Vec::new(),
            optional: Vec::new(),
        },
        proxy: Arc::new(FakeServer),
    }
}

pub(crate) fn make_facilitator(name: &str) -> DiscoveredFacilitator {
    DiscoveredFacilitator {
        name: name.to_string(),
        directory: PathBuf::from(format!("facilitators/{name}")),
        config: TestConfig {
            name: name.to_string(),
            kind: ComponentKind::Facilitator,
            language: "rust".into(),
            protocol_families: Vec::new(),
            x402_version: None,
            x402_versions: Vec::new(),
            endpoints: Vec::new(),
            required: Vec::new(),
            optional: Vec::new(),
        },
        proxy: Arc::new(FakeFacilitator),
    }
}

fn paid_endpoint(path: &str) -> Endpoint {
    Endpoint {
        path: path.to_string(),
        method: "GET".to_string(),
        description: String::new(),
        requires_payment: true,
        protocol_family: None,
        transfer_method: None,
    }
}

/// Builds a ready-to-use EVM scenario for unit tests: client supports
/// version 2 and `evm`, server is version 2 with one payment endpoint.
pub(crate) fn make_scenario(
    server_name: &str,
    client_name: &str,
    facilitator_name: Option<&str>,
    path: &str,
) -> Scenario {
    let endpoint = paid_endpoint(path);
    Scenario {
        client: make_client(client_name, &[2], &[ProtocolFamily::Evm]),
        server: make_server(server_name, 2, endpoint.clone()),
        facilitator: facilitator_name.map(make_facilitator),
        endpoint,
        protocol_family: ProtocolFamily::Evm,
        server_version: 2,
    }
}
