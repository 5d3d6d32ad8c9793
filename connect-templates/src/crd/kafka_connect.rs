//! KafkaConnect custom resource
//!
//! Only the fields the system tests touch are modelled; everything else in a
//! manifest is carried through `KafkaConnectSpec::extra` untouched.

use crate::error::{TemplateError, TemplateResult};
use k8s_openapi::api::core::v1::ConfigMapKeySelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired state of a Kafka Connect cluster
#[derive(CustomResource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[kube(
    group = "kafka.strimzi.io",
    version = "v1beta2",
    kind = "KafkaConnect",
    plural = "kafkaconnects",
    shortname = "kc",
    namespaced,
    status = "KafkaConnectStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectSpec {
    /// Kafka Connect version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Number of Connect worker pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Bootstrap address of the Kafka cluster
    #[serde(default)]
    pub bootstrap_servers: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<ClientTls>,
    /// Worker configuration passed to Kafka Connect
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_config: Option<MetricsConfig>,
    /// Remaining spec fields (resources, template, jvmOptions, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// TLS settings for the connection to Kafka
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTls {
    #[serde(default)]
    pub trusted_certificates: Vec<CertSecretSource>,
}

/// Reference to a certificate stored in a Secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertSecretSource {
    pub secret_name: String,
    pub certificate: String,
}

/// Logging configuration of the Connect workers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Logging {
    Inline {
        #[serde(default)]
        loggers: BTreeMap<String, String>,
    },
    External {
        #[serde(rename = "valueFrom")]
        value_from: ExternalConfigurationReference,
    },
}

/// Metrics exporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetricsConfig {
    #[serde(rename = "jmxPrometheusExporter")]
    JmxPrometheusExporter {
        #[serde(rename = "valueFrom")]
        value_from: ExternalConfigurationReference,
    },
}

/// Pointer to a key of a ConfigMap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalConfigurationReference {
    pub config_map_key_ref: ConfigMapKeySelector,
}

/// Observed state reported by the Cluster Operator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnectStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Status condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl KafkaConnect {
    /// Resource name, which every derived identifier is computed from
    pub fn require_name(&self) -> TemplateResult<&str> {
        self.metadata
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TemplateError::MissingMetadata {
                kind: "KafkaConnect".to_string(),
                field: "name",
            })
    }

    pub fn require_namespace(&self) -> TemplateResult<&str> {
        self.metadata
            .namespace
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TemplateError::MissingMetadata {
                kind: "KafkaConnect".to_string(),
                field: "namespace",
            })
    }

    /// String value of a worker configuration key
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.spec.config.get(key).and_then(|v| v.as_str())
    }

    /// Level of an inline logger, if inline logging is configured
    pub fn inline_logger(&self, logger: &str) -> Option<&str> {
        match self.spec.logging {
            Some(Logging::Inline { ref loggers }) => loggers.get(logger).map(String::as_str),
            _ => None,
        }
    }
}
