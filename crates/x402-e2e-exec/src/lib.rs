//! Facilitator lifecycle management and combo execution (spec.md §4.10,
//! §4.11, §4.12) — the layer between discovery/scenario generation and the
//! orchestrator's top-level driver.

mod combo_executor;
mod facilitator_manager;
mod test_number;

pub use combo_executor::{execute_combo, run_single_test, ComboExecutorContext, FacilitatorServerMap};
pub use facilitator_manager::FacilitatorManager;
pub use test_number::TestNumberGenerator;
