//! KafkaConnect templates for system tests
//!
//! Entry points turning a handful of test parameters into a ready-to-apply
//! KafkaConnect resource, opening it to the scraper when the cluster denies
//! traffic by default, and tearing it down again.

pub mod access;
pub mod defaults;
pub mod manifest;
pub mod namespace;

pub use access::AccessProvisioner;
pub use defaults::{default_kafka_connect, validate_params, worker_identifiers};
pub use namespace::resolve_namespace;

use connect_common::TestContext;
use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::crd::KafkaConnect;
use crate::error::{TemplateError, TemplateResult};
use crate::pipeline::{DeletionPropagation, ResourceKind, ResourcePipeline};

/// Name of the metrics ConfigMap shipped with the metrics manifest
pub const CONNECT_METRICS_CONFIG_MAP: &str = "connect-metrics";

/// Parameters of a test Connect cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub name: String,
    pub replicas: i32,
    /// Defaults to the current test namespace
    pub namespace: Option<String>,
    /// Defaults to `name`
    pub cluster_name: Option<String>,
    /// Provision scraper access; defaults to `true`
    pub allow_network_policy: bool,
}

impl ConnectParams {
    pub fn new(name: impl Into<String>, replicas: i32) -> Self {
        Self {
            name: name.into(),
            replicas,
            namespace: None,
            cluster_name: None,
            allow_network_policy: true,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_cluster(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = Some(cluster_name.into());
        self
    }

    pub fn allow_network_policy(mut self, allow: bool) -> Self {
        self.allow_network_policy = allow;
        self
    }
}

/// KafkaConnect template factory bound to an environment and a pipeline
#[derive(Clone)]
pub struct KafkaConnectTemplates {
    config: Arc<EnvironmentConfig>,
    pipeline: Arc<dyn ResourcePipeline>,
}

impl KafkaConnectTemplates {
    pub fn new(config: Arc<EnvironmentConfig>, pipeline: Arc<dyn ResourcePipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    fn provisioner(&self) -> AccessProvisioner<'_> {
        AccessProvisioner::new(&self.config, self.pipeline.as_ref())
    }

    /// Build a KafkaConnect from the plain manifest, provisioning scraper access as requested
    pub async fn kafka_connect_with(
        &self,
        ctx: &TestContext,
        params: ConnectParams,
    ) -> TemplateResult<KafkaConnect> {
        let namespace = params
            .namespace
            .unwrap_or_else(|| self.pipeline.current_namespace().to_string());
        let cluster_name = params.cluster_name.unwrap_or_else(|| params.name.clone());

        let raw = manifest::kafka_connect_from_yaml(&self.config.manifests.kafka_connect)?;
        let connect = default_kafka_connect(
            raw,
            &namespace,
            &params.name,
            &cluster_name,
            params.replicas,
            &self.config.kafka.version,
        )?;

        if params.allow_network_policy {
            self.provisioner().provision_access(ctx, &connect).await?;
        }

        Ok(connect)
    }

    /// Connect cluster named after its Kafka cluster, in the current namespace
    pub async fn kafka_connect(
        &self,
        ctx: &TestContext,
        name: &str,
        replicas: i32,
    ) -> TemplateResult<KafkaConnect> {
        self.kafka_connect_with(ctx, ConnectParams::new(name, replicas)).await
    }

    pub async fn kafka_connect_for_cluster(
        &self,
        ctx: &TestContext,
        name: &str,
        cluster_name: &str,
        replicas: i32,
    ) -> TemplateResult<KafkaConnect> {
        self.kafka_connect_with(ctx, ConnectParams::new(name, replicas).with_cluster(cluster_name))
            .await
    }

    pub async fn kafka_connect_in_namespace(
        &self,
        ctx: &TestContext,
        name: &str,
        namespace: &str,
        cluster_name: &str,
        replicas: i32,
    ) -> TemplateResult<KafkaConnect> {
        self.kafka_connect_with(
            ctx,
            ConnectParams::new(name, replicas)
                .in_namespace(namespace)
                .with_cluster(cluster_name),
        )
        .await
    }

    pub async fn kafka_connect_with_network_policy(
        &self,
        ctx: &TestContext,
        name: &str,
        replicas: i32,
        allow_network_policy: bool,
    ) -> TemplateResult<KafkaConnect> {
        self.kafka_connect_with(
            ctx,
            ConnectParams::new(name, replicas).allow_network_policy(allow_network_policy),
        )
        .await
    }

    /// Build a KafkaConnect exporting metrics, named after its Kafka cluster
    pub async fn kafka_connect_with_metrics(
        &self,
        name: &str,
        replicas: i32,
    ) -> TemplateResult<KafkaConnect> {
        self.kafka_connect_with_metrics_for_cluster(name, name, replicas).await
    }

    /// Build a KafkaConnect exporting metrics
    ///
    /// The metrics ConfigMap the resource points at is created (or replaced)
    /// in the current namespace before the resource is built. Parameters are
    /// checked first so a rejected call leaves nothing behind.
    pub async fn kafka_connect_with_metrics_for_cluster(
        &self,
        name: &str,
        cluster_name: &str,
        replicas: i32,
    ) -> TemplateResult<KafkaConnect> {
        let namespace = self.pipeline.current_namespace().to_string();
        validate_params(
            &namespace,
            name,
            cluster_name,
            replicas,
            &self.config.kafka.version,
        )?;

        let path = &self.config.manifests.kafka_connect_metrics;
        let raw = manifest::kafka_connect_from_yaml(path)?;
        let mut metrics_cm = manifest::config_map_from_yaml(path, CONNECT_METRICS_CONFIG_MAP)?;

        metrics_cm.metadata.namespace = Some(namespace.clone());
        self.pipeline.apply(metrics_cm.into()).await?;

        default_kafka_connect(
            raw,
            &namespace,
            name,
            cluster_name,
            replicas,
            &self.config.kafka.version,
        )
    }

    /// Build a KafkaConnect in the current namespace without scraper access
    pub fn default_kafka_connect(
        &self,
        name: &str,
        cluster_name: &str,
        replicas: i32,
    ) -> TemplateResult<KafkaConnect> {
        let raw = manifest::kafka_connect_from_yaml(&self.config.manifests.kafka_connect)?;
        default_kafka_connect(
            raw,
            self.pipeline.current_namespace(),
            name,
            cluster_name,
            replicas,
            &self.config.kafka.version,
        )
    }

    /// Apply a resource to the current namespace right away
    ///
    /// No scraper access is provisioned, which suits tests that need a broken
    /// or unmanaged resource.
    pub async fn kafka_connect_without_wait(
        &self,
        mut resource: KafkaConnect,
    ) -> TemplateResult<KafkaConnect> {
        let current = self.pipeline.current_namespace();
        let namespace = resource
            .metadata
            .namespace
            .get_or_insert_with(|| current.to_string());
        if namespace.is_empty() {
            *namespace = current.to_string();
        }
        if namespace.as_str() != current {
            return Err(TemplateError::InvalidParameter(format!(
                "KafkaConnect namespace {} does not match current namespace {}",
                namespace, current
            )));
        }

        self.pipeline.apply(resource.clone().into()).await?;
        Ok(resource)
    }

    /// Open an already built resource to the scraper without rebuilding it
    pub async fn allow_network_policy_for_kafka_connect(
        &self,
        ctx: &TestContext,
        resource: &KafkaConnect,
    ) -> TemplateResult<()> {
        self.provisioner().allow_access(ctx, resource).await
    }

    /// Delete a KafkaConnect from the current namespace, dependents first
    pub async fn delete_kafka_connect_without_wait(&self, name: &str) -> TemplateResult<()> {
        self.pipeline
            .delete(
                ResourceKind::KafkaConnect,
                self.pipeline.current_namespace(),
                name,
                DeletionPropagation::Foreground,
            )
            .await
    }
}

impl std::fmt::Debug for KafkaConnectTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaConnectTemplates")
            .field("namespace", &self.pipeline.current_namespace())
            .field("kafka_version", &self.config.kafka.version)
            .finish()
    }
}
