//! Output module for run reports and state summaries

mod report;

pub use report::{print_run_history, print_run_report, print_watermarks};
