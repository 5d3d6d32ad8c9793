//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client together with the namespace tests run in.

use crate::error::{TemplateError, TemplateResult};
use kube::{Client, Config};

/// Wrapper around kube-rs Client with the current test namespace
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    namespace: String,
    api_server: String,
}

impl K8sClient {
    /// Create client from kubeconfig YAML with optional context
    pub async fn from_kubeconfig(kubeconfig_yaml: &str, context: Option<&str>) -> TemplateResult<Self> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        let kubeconfig = Kubeconfig::from_yaml(kubeconfig_yaml).map_err(|e| {
            TemplateError::InvalidKubeconfig(format!("Failed to parse kubeconfig: {}", e))
        })?;

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.map(String::from),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| TemplateError::InvalidKubeconfig(format!("Failed to create config: {}", e)))?;

        Self::from_config(config)
    }

    /// Create client from the local environment (KUBECONFIG, ~/.kube/config or in-cluster)
    pub async fn infer() -> TemplateResult<Self> {
        let config = Config::infer().await.map_err(|e| {
            TemplateError::InvalidKubeconfig(format!("Failed to infer config: {}", e))
        })?;

        Self::from_config(config)
    }

    /// Create client from in-cluster configuration (for running inside K8s)
    pub fn from_incluster() -> TemplateResult<Self> {
        let config = Config::incluster().map_err(|e| {
            TemplateError::InvalidKubeconfig(format!("Failed to get in-cluster config: {}", e))
        })?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> TemplateResult<Self> {
        let namespace = config.default_namespace.clone();
        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config).map_err(|e| {
            TemplateError::InvalidKubeconfig(format!("Failed to create client: {}", e))
        })?;

        tracing::debug!("Connected to {} using namespace {}", api_server, namespace);

        Ok(Self {
            inner: client,
            namespace,
            api_server,
        })
    }

    /// Switch the namespace tests operate in
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Namespace of the currently running test
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("namespace", &self.namespace)
            .field("api_server", &self.api_server)
            .finish()
    }
}
