use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain scheme family a component or endpoint targets.
///
/// Determines which private keys/addresses are relevant and whether EVM
/// nonce serialization (the facilitator lock) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolFamily {
    Evm,
    Svm,
    Aptos,
}

impl Default for ProtocolFamily {
    /// Endpoints and clients that omit `protocolFamily`/`protocolFamilies`
    /// default to `evm` (spec.md §4.3).
    fn default() -> Self {
        Self::Evm
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Evm => "evm",
            Self::Svm => "svm",
            Self::Aptos => "aptos",
        };
        f.write_str(s)
    }
}

/// EVM transfer mechanism used by a payment-required endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    Eip3009,
    Permit2,
}

impl Default for TransferMethod {
    fn default() -> Self {
        Self::Eip3009
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eip3009 => "eip3009",
            Self::Permit2 => "permit2",
        };
        f.write_str(s)
    }
}

/// What kind of component a `test.config.json` describes, and which
/// top-level directory (`servers/`, `clients/`, `facilitators/`) it is
/// expected to live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Server,
    Client,
    Facilitator,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Server => "server",
            Self::Client => "client",
            Self::Facilitator => "facilitator",
        };
        f.write_str(s)
    }
}

/// A single route a server exposes. Only routes with `requires_payment =
/// true` participate in scenario generation (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "requiresPayment")]
    pub requires_payment: bool,
    #[serde(default, rename = "protocolFamily")]
    pub protocol_family: Option<ProtocolFamily>,
    #[serde(default, rename = "transferMethod")]
    pub transfer_method: Option<TransferMethod>,
}

impl Endpoint {
    /// Endpoint's protocol family, defaulting to `evm` when unset.
    pub fn protocol_family(&self) -> ProtocolFamily {
        self.protocol_family.unwrap_or_default()
    }

    /// Transfer method applicable when this is an EVM endpoint, defaulting
    /// to `eip3009`. Non-EVM endpoints ignore this value entirely.
    pub fn transfer_method(&self) -> TransferMethod {
        self.transfer_method.unwrap_or_default()
    }
}

/// Declarative, on-disk description of one discoverable component.
/// Immutable once loaded (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    pub name: String,
    pub kind: ComponentKind,
    #[serde(default)]
    pub language: String,

    #[serde(default, rename = "protocolFamilies")]
    pub protocol_families: Vec<ProtocolFamily>,

    /// Server's single supported protocol version.
    #[serde(default, rename = "x402Version")]
    pub x402_version: Option<u32>,

    /// Client's supported protocol versions.
    #[serde(default, rename = "x402Versions")]
    pub x402_versions: Vec<u32>,

    /// Server-only: the routes it exposes.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

impl TestConfig {
    /// Protocol families this component supports, defaulting to `[evm]`
    /// when the config omits the field.
    pub fn protocol_families(&self) -> Vec<ProtocolFamily> {
        if self.protocol_families.is_empty() {
            vec![ProtocolFamily::Evm]
        } else {
            self.protocol_families.clone()
        }
    }

    /// Endpoints that require payment — the only ones eligible for
    /// scenario generation.
    pub fn payment_endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().filter(|e| e.requires_payment)
    }
}

/// Environment-variable names the framework manages on behalf of every
/// facilitator; these are excluded from the per-facilitator required-env
/// validation (spec.md §6).
pub const FRAMEWORK_MANAGED_ENV_VARS: &[&str] = &[
    "PORT",
    "EVM_PRIVATE_KEY",
    "SVM_PRIVATE_KEY",
    "EVM_NETWORK",
    "SVM_NETWORK",
    "EVM_RPC_URL",
    "SVM_RPC_URL",
];
