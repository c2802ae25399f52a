//! Test result models
//!
//! Defines per-test execution results and the aggregate run summary.

use std::fmt;

/// Outcome of a single test body
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed(String),
}

impl TestStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    /// Failure detail, if any
    pub fn failure(&self) -> Option<&str> {
        match self {
            TestStatus::Passed => None,
            TestStatus::Failed(reason) => Some(reason),
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "OK"),
            TestStatus::Failed(reason) => write!(f, "FAILED: {reason}"),
        }
    }
}

/// Result of a single test execution
///
/// Produced exactly once per test by the runner; read-only afterwards.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    pub name: String,
    pub status: TestStatus,
    /// Captured stdout text, if the test wrote any
    pub stdout: Option<String>,
    /// Captured stderr text, if the test wrote any
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            stdout: None,
            stderr: None,
        }
    }

    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed(reason.into()),
            stdout: None,
            stderr: None,
        }
    }

    pub fn with_stdout(mut self, text: impl Into<String>) -> Self {
        self.stdout = Some(text.into());
        self
    }

    pub fn with_stderr(mut self, text: impl Into<String>) -> Self {
        self.stderr = Some(text.into());
        self
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.status)
    }
}

/// Aggregate summary of a run, derived after the join barrier
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub total: usize,
    /// Names of failed tests, sorted lexicographically
    pub failed: Vec<String>,
}

impl RunSummary {
    /// Build a summary; failed names are sorted so the summary is
    /// deterministic regardless of finish order.
    pub fn new(total: usize, mut failed: Vec<String>) -> Self {
        failed.sort();
        Self { total, failed }
    }

    pub fn passed(&self) -> usize {
        self.total - self.failed.len()
    }

    pub fn is_all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit code for this run: zero only when every test passed.
    pub fn exit_code(&self) -> i32 {
        if self.is_all_passed() {
            0
        } else {
            1
        }
    }

    /// The undecorated summary headline
    pub fn headline(&self) -> String {
        if self.is_all_passed() {
            format!("All {} tests passed!", self.total)
        } else {
            format!("{} of {} tests passed.", self.passed(), self.total)
        }
    }
}
