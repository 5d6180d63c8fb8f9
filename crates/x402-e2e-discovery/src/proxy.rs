//! The Proxy Contract (spec.md §4.6) — the external seam between the
//! orchestrator and the opaque subprocesses it drives.
//!
//! The core never assumes *how* a proxy runs its subprocess; it only
//! requires obedience to these three trait shapes — a transport held
//! behind an `async_trait` object, the same shape `Transport` uses in
//! `turbomcp-transport/src/core.rs`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use x402_e2e_config::ProtocolFamily;

/// Result of a single health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub success: bool,
}

/// Config handed to a server proxy's `start`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Payee address per protocol family (`evm` -> `0x...`, `svm` -> base58 pubkey, ...).
    pub payee_addresses: HashMap<ProtocolFamily, String>,
    pub networks: Vec<String>,
    pub facilitator_url: Option<String>,
}

/// Config handed to a facilitator proxy's `start`.
#[derive(Debug, Clone)]
pub struct FacilitatorConfig {
    pub port: u16,
    pub networks: Vec<String>,
    pub extra_env: HashMap<String, String>,
}

/// Config handed to a client proxy's `call`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Private key per protocol family.
    pub private_keys: HashMap<ProtocolFamily, String>,
    pub server_url: String,
    pub endpoint_path: String,
}

/// The decoded `X-Payment-Response` envelope a client reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub transaction: Option<String>,
    pub network: Option<String>,
    #[serde(rename = "errorReason")]
    pub error_reason: Option<String>,
}

/// Outcome of a client proxy's `call`.
#[derive(Debug, Clone)]
pub struct ClientResult {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub status_code: Option<u16>,
    pub payment_response: Option<PaymentResponse>,
    pub error: Option<String>,
}

/// Server-side half of the Proxy Contract: one subprocess serving HTTP,
/// gated by a health endpoint, stoppable idempotently.
#[async_trait]
pub trait ServerProxy: Send + Sync {
    async fn start(&self, config: ServerConfig) -> Result<(), ProxyError>;
    async fn health(&self) -> HealthStatus;
    fn get_url(&self) -> String;
    fn get_protected_path(&self) -> String;
    async fn stop(&self);
}

/// Facilitator-side half of the Proxy Contract.
#[async_trait]
pub trait FacilitatorProxy: Send + Sync {
    async fn start(&self, config: FacilitatorConfig) -> Result<(), ProxyError>;
    async fn health(&self) -> HealthStatus;
    fn get_url(&self) -> String;
    async fn stop(&self);
}

/// Client-side half of the Proxy Contract: a one-shot (or short-lived)
/// subprocess that performs a single payment-gated HTTP call and reports
/// its outcome as structured data.
#[async_trait]
pub trait ClientProxy: Send + Sync {
    async fn call(&self, config: ClientConfig) -> ClientResult;
    async fn force_stop(&self);
}

/// Errors a proxy can report from `start`. Health failures are reported as
/// `HealthStatus { success: false }`, not as an error, so the health poller
/// can retry without matching on error variants.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to spawn subprocess: {0}")]
    Spawn(String),
    #[error("subprocess exited before becoming ready: {0}")]
    ExitedEarly(String),
}
