//! Resource management pipeline
//!
//! Templates never talk to the cluster directly. They hand finished objects to
//! a [`ResourcePipeline`], which owns create/replace/delete and any waiting or
//! retry policy.

pub mod cluster;
pub mod memory;

pub use cluster::KubePipeline;
pub use memory::InMemoryPipeline;

use crate::crd::KafkaConnect;
use crate::error::{TemplateError, TemplateResult};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::networking::v1::NetworkPolicy;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Kinds of objects produced by the templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    KafkaConnect,
    ConfigMap,
    Deployment,
    NetworkPolicy,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KafkaConnect => write!(f, "KafkaConnect"),
            Self::ConfigMap => write!(f, "ConfigMap"),
            Self::Deployment => write!(f, "Deployment"),
            Self::NetworkPolicy => write!(f, "NetworkPolicy"),
        }
    }
}

/// How dependents are handled when a resource is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionPropagation {
    /// Dependents are removed before the owner is gone
    #[default]
    Foreground,
    /// Owner is removed at once, dependents are collected afterwards
    Background,
    /// Dependents are left behind
    Orphan,
}

/// An object ready to be applied to the cluster
#[derive(Debug, Clone)]
pub enum ManagedResource {
    KafkaConnect(KafkaConnect),
    ConfigMap(ConfigMap),
    Deployment(Deployment),
    NetworkPolicy(NetworkPolicy),
}

impl ManagedResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::KafkaConnect(_) => ResourceKind::KafkaConnect,
            Self::ConfigMap(_) => ResourceKind::ConfigMap,
            Self::Deployment(_) => ResourceKind::Deployment,
            Self::NetworkPolicy(_) => ResourceKind::NetworkPolicy,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::KafkaConnect(r) => &r.metadata,
            Self::ConfigMap(r) => &r.metadata,
            Self::Deployment(r) => &r.metadata,
            Self::NetworkPolicy(r) => &r.metadata,
        }
    }

    /// Namespace and name, both of which must be set
    pub fn coordinates(&self) -> TemplateResult<(&str, &str)> {
        let meta = self.metadata();
        let missing = |field| TemplateError::MissingMetadata {
            kind: self.kind().to_string(),
            field,
        };

        let namespace = meta
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| missing("namespace"))?;
        let name = meta
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| missing("name"))?;

        Ok((namespace, name))
    }
}

impl From<KafkaConnect> for ManagedResource {
    fn from(resource: KafkaConnect) -> Self {
        Self::KafkaConnect(resource)
    }
}

impl From<ConfigMap> for ManagedResource {
    fn from(resource: ConfigMap) -> Self {
        Self::ConfigMap(resource)
    }
}

impl From<Deployment> for ManagedResource {
    fn from(resource: Deployment) -> Self {
        Self::Deployment(resource)
    }
}

impl From<NetworkPolicy> for ManagedResource {
    fn from(resource: NetworkPolicy) -> Self {
        Self::NetworkPolicy(resource)
    }
}

/// Create/delete collaborator
#[async_trait::async_trait]
pub trait ResourcePipeline: Send + Sync {
    /// Namespace of the currently running test
    fn current_namespace(&self) -> &str;

    /// Create or replace a resource
    async fn apply(&self, resource: ManagedResource) -> TemplateResult<()>;

    /// Delete a resource by name
    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        propagation: DeletionPropagation,
    ) -> TemplateResult<()>;

    /// Whether a resource currently exists
    async fn exists(&self, kind: ResourceKind, namespace: &str, name: &str) -> TemplateResult<bool>;
}
