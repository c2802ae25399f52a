//! Test execution engine
//!
//! One worker thread per registered test, a join barrier, then a
//! deterministic summary.

mod runner;

pub use runner::{Runner, OUTPUT_BANNER};
