// Application layer: wires config, storage and the HTTP client into a run.

pub mod runner;

pub use runner::{print_summary, report_failure, run_pipeline};
