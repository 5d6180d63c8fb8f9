//! Result aggregation and reporting (spec.md §4.13 step 14, §6).

mod json_report;
mod summary;
mod text_summary;

pub use json_report::{build_report, write_json_report, JsonReport, NetworkMode, ReportError, RunSummary};
pub use summary::{build_breakdowns, Breakdowns, PassFail};
pub use text_summary::render_text_summary;
