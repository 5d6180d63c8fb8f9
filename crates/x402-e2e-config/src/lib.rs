//! Data model and config loader for the x402 end-to-end orchestrator.
//!
//! Every other crate in this workspace builds on the types defined here:
//! a `TestConfig` is read once per component directory at startup and
//! never mutated afterwards.

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{load_test_config, load_test_config_of_kind};
pub use types::{
    ComponentKind, Endpoint, ProtocolFamily, TestConfig, TransferMethod,
    FRAMEWORK_MANAGED_ENV_VARS,
};
