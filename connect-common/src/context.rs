//! Run-scoped execution context
//!
//! The parallel-execution harness records a handful of values once per test
//! run (the shared namespace, the shared scraper pod) before any test starts.
//! Template code only ever sees the narrow [`ExecutionContext`] read interface.

use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Key of the namespace shared by the current run's parallel tests
pub const NAMESPACE_KEY: &str = "NAMESPACE_NAME";

/// Key of the scraper pod registered for the current run
pub const SCRAPER_KEY: &str = "SCRAPER_NAME";

/// Read-only view over run-scoped values
pub trait ExecutionContext: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Like [`get`](Self::get) but absence is an error
    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| Error::MissingContextEntry(key.to_string()))
    }
}

/// Key/value arena owned by the harness for a whole test run
///
/// Populated through [`RunStore::with`] before being shared, then only read.
#[derive(Debug, Clone, Default)]
pub struct RunStore {
    entries: HashMap<String, String>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, replacing any previous one
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ExecutionContext for RunStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Context of a single running test
#[derive(Clone)]
pub struct TestContext {
    /// Name of the test, used in log output
    pub test_name: String,
    /// Whether the test runs in the parallel-namespace execution mode
    pub parallel_namespace: bool,
    store: Arc<dyn ExecutionContext>,
}

impl TestContext {
    pub fn new(
        test_name: impl Into<String>,
        parallel_namespace: bool,
        store: Arc<dyn ExecutionContext>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            parallel_namespace,
            store,
        }
    }

    /// Shorthand for a serial test with an empty store
    pub fn serial(test_name: impl Into<String>) -> Self {
        Self::new(test_name, false, Arc::new(RunStore::new()))
    }

    pub fn store(&self) -> &dyn ExecutionContext {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for TestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestContext")
            .field("test_name", &self.test_name)
            .field("parallel_namespace", &self.parallel_namespace)
            .finish()
    }
}
