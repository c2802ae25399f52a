//! Data models for test execution
//!
//! This module contains the result structures shared across the crate.

mod test_result;

pub use test_result::{ExecutionResult, RunSummary, TestStatus};
