//! Per-project outcomes and run summary.

mod result;
mod run_summary;

pub use result::{ProjectOutcome, ProjectStatus, Step, StepOutcome};
pub use run_summary::RunSummary;
