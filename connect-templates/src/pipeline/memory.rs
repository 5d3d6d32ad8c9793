//! In-process pipeline
//!
//! Keeps applied objects in a map keyed by kind, namespace and name, with the
//! same upsert semantics as server-side apply. Used for dry runs of the
//! harness and throughout the tests.

use crate::error::TemplateResult;
use crate::pipeline::{DeletionPropagation, ManagedResource, ResourceKind, ResourcePipeline};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type ResourceKey = (ResourceKind, String, String);

/// A delete request as it was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRecord {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
    pub propagation: DeletionPropagation,
}

/// [`ResourcePipeline`] holding resources in memory
#[derive(Debug)]
pub struct InMemoryPipeline {
    namespace: String,
    resources: RwLock<BTreeMap<ResourceKey, ManagedResource>>,
    applies: RwLock<BTreeMap<ResourceKind, usize>>,
    deletes: RwLock<Vec<DeleteRecord>>,
}

impl InMemoryPipeline {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            resources: RwLock::new(BTreeMap::new()),
            applies: RwLock::new(BTreeMap::new()),
            deletes: RwLock::new(Vec::new()),
        }
    }

    /// Stored resource, if any
    pub async fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<ManagedResource> {
        let resources = self.resources.read().await;
        resources
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Stored resources of one kind, ordered by namespace and name
    pub async fn list(&self, kind: ResourceKind) -> Vec<ManagedResource> {
        let resources = self.resources.read().await;
        resources
            .iter()
            .filter(|((k, _, _), _)| *k == kind)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Number of stored resources of one kind
    pub async fn count(&self, kind: ResourceKind) -> usize {
        self.list(kind).await.len()
    }

    /// Number of apply calls received for one kind
    pub async fn apply_count(&self, kind: ResourceKind) -> usize {
        let applies = self.applies.read().await;
        applies.get(&kind).copied().unwrap_or(0)
    }

    pub async fn total_applies(&self) -> usize {
        let applies = self.applies.read().await;
        applies.values().sum()
    }

    /// Delete requests in the order they arrived
    pub async fn deletes(&self) -> Vec<DeleteRecord> {
        self.deletes.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ResourcePipeline for InMemoryPipeline {
    fn current_namespace(&self) -> &str {
        &self.namespace
    }

    async fn apply(&self, resource: ManagedResource) -> TemplateResult<()> {
        let kind = resource.kind();
        let (namespace, name) = resource.coordinates()?;
        let key = (kind, namespace.to_string(), name.to_string());

        tracing::debug!("Storing {} {}/{}", kind, key.1, key.2);

        *self.applies.write().await.entry(kind).or_insert(0) += 1;
        self.resources.write().await.insert(key, resource);

        Ok(())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        propagation: DeletionPropagation,
    ) -> TemplateResult<()> {
        self.deletes.write().await.push(DeleteRecord {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
            propagation,
        });
        self.resources
            .write()
            .await
            .remove(&(kind, namespace.to_string(), name.to_string()));

        Ok(())
    }

    async fn exists(&self, kind: ResourceKind, namespace: &str, name: &str) -> TemplateResult<bool> {
        Ok(self.get(kind, namespace, name).await.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn config_map(namespace: &str, name: &str, value: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([("key".to_string(), value.to_string())])),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_is_upsert() {
        let pipeline = InMemoryPipeline::new("ns1");

        pipeline.apply(config_map("ns1", "cm", "a").into()).await.unwrap();
        pipeline.apply(config_map("ns1", "cm", "b").into()).await.unwrap();

        assert_eq!(pipeline.count(ResourceKind::ConfigMap).await, 1);
        assert_eq!(pipeline.apply_count(ResourceKind::ConfigMap).await, 2);

        match pipeline.get(ResourceKind::ConfigMap, "ns1", "cm").await {
            Some(ManagedResource::ConfigMap(cm)) => {
                assert_eq!(cm.data.unwrap().get("key").unwrap(), "b");
            }
            other => panic!("unexpected resource: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_apply_requires_coordinates() {
        let pipeline = InMemoryPipeline::new("ns1");
        let mut cm = config_map("ns1", "cm", "a");
        cm.metadata.namespace = None;

        assert!(pipeline.apply(cm.into()).await.is_err());
        assert_eq!(pipeline.total_applies().await, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_and_records() {
        let pipeline = InMemoryPipeline::new("ns1");
        pipeline.apply(config_map("ns1", "cm", "a").into()).await.unwrap();

        pipeline
            .delete(ResourceKind::ConfigMap, "ns1", "cm", DeletionPropagation::Background)
            .await
            .unwrap();

        assert!(!pipeline.exists(ResourceKind::ConfigMap, "ns1", "cm").await.unwrap());
        let deletes = pipeline.deletes().await;
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].propagation, DeletionPropagation::Background);
    }
}
