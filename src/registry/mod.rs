//! Test registration
//!
//! Collects (unique name, fallible procedure) pairs before a run. A duplicate
//! name is a configuration error and aborts before any test executes.

use std::collections::HashSet;

use thiserror::Error;

use crate::capture::TestIo;

/// A registered test body.
///
/// The output handle is injected explicitly; test code writes through it
/// rather than the global print macros so per-thread capture works without
/// any symbol shadowing.
pub type TestFn = Box<dyn FnOnce(&TestIo) -> Result<(), TestFailure> + Send>;

/// Failure signal raised by a test body.
///
/// Returning `Err(TestFailure)` marks the test failed with the carried
/// message; a panic inside the body is reported as a generic fault instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TestFailure {
    message: String,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Assert `condition`, failing the test with `message` otherwise
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), TestFailure> {
    if condition {
        Ok(())
    } else {
        Err(TestFailure::new(message))
    }
}

/// Registry-level configuration errors, fatal before execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate test name: {name}")]
    DuplicateName { name: String },
}

/// One (name, procedure) pair, immutable once registered
pub struct RegisteredTest {
    pub name: String,
    pub(crate) run: TestFn,
}

impl RegisteredTest {
    pub(crate) fn into_parts(self) -> (String, TestFn) {
        (self.name, self.run)
    }
}

/// The finalized, order-irrelevant collection consumed by the runner
pub struct TestSet {
    tests: Vec<RegisteredTest>,
}

impl TestSet {
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tests.iter().map(|t| t.name.as_str()).collect()
    }
}

impl IntoIterator for TestSet {
    type Item = RegisteredTest;
    type IntoIter = std::vec::IntoIter<RegisteredTest>;

    fn into_iter(self) -> Self::IntoIter {
        self.tests.into_iter()
    }
}

/// Collects test registrations before a run
#[derive(Default)]
pub struct Registry {
    tests: Vec<RegisteredTest>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test under a unique name
    pub fn register<F>(&mut self, name: impl Into<String>, proc: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&TestIo) -> Result<(), TestFailure> + Send + 'static,
    {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(RegistryError::DuplicateName { name });
        }

        self.tests.push(RegisteredTest {
            name,
            run: Box::new(proc),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Freeze the registry into the set the runner consumes
    pub fn finalize(self) -> TestSet {
        TestSet { tests: self.tests }
    }
}
