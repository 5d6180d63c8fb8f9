//! Orchestrator-level fatal errors (spec.md §7: setup-phase errors are
//! fatal and surface as a non-zero exit).

use crate::env_check::MissingEnvVars;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("global environment validation failed: {0}")]
    GlobalEnv(#[source] MissingEnvVars),

    #[error("facilitator environment validation failed: {0}")]
    FacilitatorEnv(#[source] MissingEnvVars),

    #[error("facilitator '{0}' failed to start or never became healthy")]
    FacilitatorStartFailed(String),

    #[error("permit2 base-approval setup failed: {0}")]
    Permit2SetupFailed(String),

    #[error("failed to write JSON report: {0}")]
    Report(#[from] x402_e2e_report::ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
