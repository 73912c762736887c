//! Debug and verification tooling

pub mod leak_harness;

pub use leak_harness::{run_clear_test, run_leak_cycle, ClearReport, LeakReport, LeakSnapshot};
