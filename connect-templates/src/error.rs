//! Template error types
//!
//! Every failure is propagated to the calling test unchanged; nothing here is
//! retried or downgraded to success.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, provisioning or applying Connect resources
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Kubeconfig could not be turned into a client
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Manifest file could not be read
    #[error("Failed to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest file is not valid YAML for the requested kind
    #[error("Malformed manifest {path:?}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Manifest file has no document of the requested kind/name
    #[error("No {kind} '{name}' found in manifest {path:?}")]
    ManifestMissing {
        kind: String,
        name: String,
        path: PathBuf,
    },

    /// A caller-supplied parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Resource is missing a metadata field the operation needs
    #[error("{kind} is missing metadata.{field}")]
    MissingMetadata { kind: String, field: &'static str },

    /// Scraper pod was expected to exist already
    #[error("Scraper '{name}' does not exist in namespace {namespace}; create it before allowing {kind} traffic")]
    ProbeMissing {
        kind: String,
        name: String,
        namespace: String,
    },

    /// Execution context lookup failed
    #[error(transparent)]
    Context(#[from] connect_common::Error),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TemplateError> for connect_common::Error {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Context(inner) => inner,
            TemplateError::InvalidParameter(msg) => connect_common::Error::Validation(msg),
            other => connect_common::Error::System(other.to_string()),
        }
    }
}

/// Result type alias for template operations
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;
