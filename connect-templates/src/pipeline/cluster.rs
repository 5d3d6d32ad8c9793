//! Pipeline backed by a live cluster
//!
//! Every apply is a forced server-side apply, so repeating it for the same
//! object converges on one resource. Waiting for readiness and retrying are
//! left to the harness that drives the pipeline.

use crate::crd::KafkaConnect;
use crate::error::TemplateResult;
use crate::kubernetes::K8sClient;
use crate::pipeline::{DeletionPropagation, ManagedResource, ResourceKind, ResourcePipeline};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::networking::v1::NetworkPolicy;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PropagationPolicy};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Field manager recorded on every applied object
pub const FIELD_MANAGER: &str = "connect-templates";

/// [`ResourcePipeline`] over the Kubernetes API
#[derive(Debug, Clone)]
pub struct KubePipeline {
    client: K8sClient,
}

impl KubePipeline {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &K8sClient {
        &self.client
    }

    /// Typed API for KafkaConnect resources in the current namespace
    pub fn kafka_connect_api(&self) -> Api<KafkaConnect> {
        self.api(self.client.namespace())
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.inner().clone(), namespace)
    }

    async fn server_side_apply<K>(&self, namespace: &str, name: &str, resource: &K) -> TemplateResult<()>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api(namespace);
        api.patch(
            name,
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(resource),
        )
        .await?;

        Ok(())
    }

    async fn delete_named<K>(
        &self,
        namespace: &str,
        name: &str,
        propagation: DeletionPropagation,
    ) -> TemplateResult<()>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api(namespace);
        let params = DeleteParams {
            propagation_policy: Some(match propagation {
                DeletionPropagation::Foreground => PropagationPolicy::Foreground,
                DeletionPropagation::Background => PropagationPolicy::Background,
                DeletionPropagation::Orphan => PropagationPolicy::Orphan,
            }),
            ..Default::default()
        };
        api.delete(name, &params).await?;

        Ok(())
    }

    async fn exists_named<K>(&self, namespace: &str, name: &str) -> TemplateResult<bool>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = self.api(namespace);
        Ok(api.get_opt(name).await?.is_some())
    }
}

#[async_trait::async_trait]
impl ResourcePipeline for KubePipeline {
    fn current_namespace(&self) -> &str {
        self.client.namespace()
    }

    async fn apply(&self, resource: ManagedResource) -> TemplateResult<()> {
        let (namespace, name) = resource.coordinates()?;
        tracing::info!("Applying {} {}/{}", resource.kind(), namespace, name);

        match resource {
            ManagedResource::KafkaConnect(ref r) => self.server_side_apply(namespace, name, r).await,
            ManagedResource::ConfigMap(ref r) => self.server_side_apply(namespace, name, r).await,
            ManagedResource::Deployment(ref r) => self.server_side_apply(namespace, name, r).await,
            ManagedResource::NetworkPolicy(ref r) => self.server_side_apply(namespace, name, r).await,
        }
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        propagation: DeletionPropagation,
    ) -> TemplateResult<()> {
        tracing::info!("Deleting {} {}/{} ({:?})", kind, namespace, name, propagation);

        match kind {
            ResourceKind::KafkaConnect => {
                self.delete_named::<KafkaConnect>(namespace, name, propagation).await
            }
            ResourceKind::ConfigMap => self.delete_named::<ConfigMap>(namespace, name, propagation).await,
            ResourceKind::Deployment => {
                self.delete_named::<Deployment>(namespace, name, propagation).await
            }
            ResourceKind::NetworkPolicy => {
                self.delete_named::<NetworkPolicy>(namespace, name, propagation).await
            }
        }
    }

    async fn exists(&self, kind: ResourceKind, namespace: &str, name: &str) -> TemplateResult<bool> {
        match kind {
            ResourceKind::KafkaConnect => self.exists_named::<KafkaConnect>(namespace, name).await,
            ResourceKind::ConfigMap => self.exists_named::<ConfigMap>(namespace, name).await,
            ResourceKind::Deployment => self.exists_named::<Deployment>(namespace, name).await,
            ResourceKind::NetworkPolicy => self.exists_named::<NetworkPolicy>(namespace, name).await,
        }
    }
}
