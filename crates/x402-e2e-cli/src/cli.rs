//! CLI argument surface (spec.md §6): the flag names are a fixed external
//! interface; the parsing machinery behind them is ours.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "x402-e2e",
    version,
    about = "Discovers, generates, minimizes, and runs x402 end-to-end test scenarios"
)]
pub struct Cli {
    /// Root directory containing servers/, clients/, facilitators/.
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Apply coverage-based minimization before execution.
    #[arg(long)]
    pub min: bool,

    /// Run combos concurrently instead of strictly one at a time.
    #[arg(long)]
    pub parallel: bool,

    /// Maximum simultaneous combos when `--parallel` is set.
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Which network tier the run targets.
    #[arg(long, value_enum, default_value = "testnet")]
    pub network_mode: NetworkModeArg,

    /// Write the structured JSON report to this path.
    #[arg(long)]
    pub output_json: Option<PathBuf>,

    /// Milliseconds to hold the facilitator lock after an EVM settlement
    /// before releasing it (spec.md §4.11).
    #[arg(long, default_value_t = 2000)]
    pub evm_settle_ms: u64,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug-level logging.
    #[arg(long)]
    pub verbose: bool,

    /// Also discover `<base>/legacy/legacy-*` components.
    #[arg(long)]
    pub include_legacy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NetworkModeArg {
    Testnet,
    Mainnet,
}

impl From<NetworkModeArg> for x402_e2e_report::NetworkMode {
    fn from(value: NetworkModeArg) -> Self {
        match value {
            NetworkModeArg::Testnet => x402_e2e_report::NetworkMode::Testnet,
            NetworkModeArg::Mainnet => x402_e2e_report::NetworkMode::Mainnet,
        }
    }
}
