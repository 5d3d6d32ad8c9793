//! NetworkPolicy access grants
//!
//! With default-deny network policies active, nothing can reach a Connect
//! cluster until an ingress rule admits the scraper pod explicitly.

use crate::crd::naming;
use crate::crd::KafkaConnect;
use crate::error::TemplateResult;
use crate::kubernetes::workloads::scraper::SCRAPER_APP_LABEL;
use k8s_openapi::api::networking::v1::{
    NetworkPolicy, NetworkPolicyIngressRule, NetworkPolicyPeer, NetworkPolicyPort,
    NetworkPolicySpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Label keys the Cluster Operator puts on every operand pod
pub const CLUSTER_LABEL: &str = "strimzi.io/cluster";
pub const KIND_LABEL: &str = "strimzi.io/kind";
pub const NAME_LABEL: &str = "strimzi.io/name";

/// Label the API server sets on every namespace to its own name
pub const NAMESPACE_NAME_LABEL: &str = "kubernetes.io/metadata.name";

/// Permission for a scraper to reach a resource's pods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// NetworkPolicy name
    pub name: String,
    /// Namespace of the protected resource
    pub namespace: String,
    /// Labels selecting the protected pods
    pub protected: BTreeMap<String, String>,
    /// Labels selecting the permitted origin pods
    pub origin: BTreeMap<String, String>,
    /// Namespace the origin pods run in
    pub origin_namespace: String,
    /// TCP ports opened to the origin
    pub ports: Vec<i32>,
}

impl AccessGrant {
    /// Grant for the pods of a Connect cluster, admitting the named scraper
    /// running in `scraper_namespace`
    pub fn for_kafka_connect(
        resource: &KafkaConnect,
        scraper_namespace: &str,
        scraper_name: &str,
    ) -> TemplateResult<Self> {
        let name = resource.require_name()?;
        let namespace = resource.require_namespace()?;

        let protected = BTreeMap::from([
            (CLUSTER_LABEL.to_string(), name.to_string()),
            (KIND_LABEL.to_string(), "KafkaConnect".to_string()),
            (NAME_LABEL.to_string(), naming::deployment_name(name)),
        ]);
        let origin = BTreeMap::from([(SCRAPER_APP_LABEL.to_string(), scraper_name.to_string())]);

        Ok(Self {
            name: naming::network_policy_name(name),
            namespace: namespace.to_string(),
            protected,
            origin,
            origin_namespace: scraper_namespace.to_string(),
            ports: vec![naming::REST_API_PORT, naming::METRICS_PORT],
        })
    }

    /// Render as an ingress-only NetworkPolicy
    pub fn to_network_policy(&self) -> NetworkPolicy {
        let ports = self
            .ports
            .iter()
            .map(|port| NetworkPolicyPort {
                protocol: Some("TCP".to_string()),
                port: Some(IntOrString::Int(*port)),
                end_port: None,
            })
            .collect();

        NetworkPolicy {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(NetworkPolicySpec {
                pod_selector: LabelSelector {
                    match_labels: Some(self.protected.clone()),
                    match_expressions: None,
                },
                policy_types: Some(vec!["Ingress".to_string()]),
                ingress: Some(vec![NetworkPolicyIngressRule {
                    from: Some(vec![NetworkPolicyPeer {
                        pod_selector: Some(LabelSelector {
                            match_labels: Some(self.origin.clone()),
                            match_expressions: None,
                        }),
                        namespace_selector: self.origin_namespace_selector(),
                        ip_block: None,
                    }]),
                    ports: Some(ports),
                }]),
                egress: None,
            }),
            ..Default::default()
        }
    }

    // Without a namespace selector a peer only matches pods in the policy's namespace
    fn origin_namespace_selector(&self) -> Option<LabelSelector> {
        if self.origin_namespace == self.namespace {
            return None;
        }
        Some(LabelSelector {
            match_labels: Some(BTreeMap::from([(
                NAMESPACE_NAME_LABEL.to_string(),
                self.origin_namespace.clone(),
            )])),
            match_expressions: None,
        })
    }
}
