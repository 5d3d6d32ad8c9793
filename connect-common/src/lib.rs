//! Common types shared between connect-templates and the surrounding test harness

pub mod context;

pub use context::{ExecutionContext, RunStore, TestContext, NAMESPACE_KEY, SCRAPER_KEY};

/// Harness-level error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Execution context has no entry for '{0}'")]
    MissingContextEntry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("System error: {0}")]
    System(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
