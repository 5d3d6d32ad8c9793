//! Default KafkaConnect spec
//!
//! Fills a manifest skeleton with everything a test Connect cluster needs to
//! join a Kafka cluster: TLS trust, bootstrap address, per-instance internal
//! topics and debug logging. Pure; nothing here touches the cluster.

use crate::crd::naming;
use crate::crd::{CertSecretSource, ClientTls, KafkaConnect, Logging};
use crate::error::{TemplateError, TemplateResult};
use std::collections::BTreeMap;

/// Annotation recording the Kafka cluster a Connect cluster belongs to
pub const KAFKA_CLUSTER_ANNOTATION: &str = "test.strimzi.io/kafka-cluster";

pub const GROUP_ID: &str = "group.id";
pub const OFFSET_STORAGE_TOPIC: &str = "offset.storage.topic";
pub const CONFIG_STORAGE_TOPIC: &str = "config.storage.topic";
pub const STATUS_STORAGE_TOPIC: &str = "status.storage.topic";

/// Level forced on the Connect root logger
pub const ROOT_LOGGER_LEVEL: &str = "DEBUG";

/// Worker group id and internal topic names of a Connect cluster
///
/// Derived from the resource name only, so two Connect clusters sharing a
/// Kafka cluster never share storage topics.
pub fn worker_identifiers(name: &str) -> [(&'static str, String); 4] {
    [
        (GROUP_ID, naming::deployment_name(name)),
        (OFFSET_STORAGE_TOPIC, naming::config_storage_topic_offsets(name)),
        (CONFIG_STORAGE_TOPIC, naming::metrics_and_log_config_map_name(name)),
        (STATUS_STORAGE_TOPIC, naming::config_storage_topic_status(name)),
    ]
}

/// Reject parameters no Connect cluster can be built from
pub fn validate_params(
    namespace: &str,
    name: &str,
    cluster_name: &str,
    replicas: i32,
    kafka_version: &str,
) -> TemplateResult<()> {
    for (field, value) in [
        ("namespace", namespace),
        ("name", name),
        ("cluster name", cluster_name),
        ("Kafka version", kafka_version),
    ] {
        if value.trim().is_empty() {
            return Err(TemplateError::InvalidParameter(format!(
                "KafkaConnect {} cannot be empty",
                field
            )));
        }
    }
    if replicas < 1 {
        return Err(TemplateError::InvalidParameter(format!(
            "KafkaConnect replicas must be at least 1, got {}",
            replicas
        )));
    }
    Ok(())
}

/// Apply the default test configuration on top of a manifest skeleton
pub fn default_kafka_connect(
    mut raw: KafkaConnect,
    namespace: &str,
    name: &str,
    cluster_name: &str,
    replicas: i32,
    kafka_version: &str,
) -> TemplateResult<KafkaConnect> {
    validate_params(namespace, name, cluster_name, replicas, kafka_version)?;

    let metadata = &mut raw.metadata;
    metadata.name = Some(name.to_string());
    metadata.namespace = Some(namespace.to_string());
    metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(KAFKA_CLUSTER_ANNOTATION.to_string(), cluster_name.to_string());

    let spec = &mut raw.spec;
    spec.version = Some(kafka_version.to_string());
    spec.bootstrap_servers = naming::tls_bootstrap_address(cluster_name);
    spec.replicas = Some(replicas);
    spec.tls = Some(ClientTls {
        trusted_certificates: vec![CertSecretSource {
            secret_name: naming::cluster_ca_cert_secret_name(cluster_name),
            certificate: naming::CA_CERT_KEY.to_string(),
        }],
    });

    for (key, value) in worker_identifiers(name) {
        spec.config.insert(key.to_string(), serde_json::Value::String(value));
    }

    let mut loggers = match spec.logging.take() {
        Some(Logging::Inline { loggers }) => loggers,
        _ => BTreeMap::new(),
    };
    loggers.insert(naming::ROOT_LOGGER.to_string(), ROOT_LOGGER_LEVEL.to_string());
    spec.logging = Some(Logging::Inline { loggers });

    tracing::debug!(
        "Prepared KafkaConnect {}/{} for Kafka cluster {} with {} replicas",
        namespace,
        name,
        cluster_name,
        replicas
    );

    Ok(raw)
}
