//! Common test utilities and helpers

#![allow(dead_code)]

use connect_common::{RunStore, TestContext, NAMESPACE_KEY, SCRAPER_KEY};
use connect_templates::{EnvironmentConfig, InMemoryPipeline, KafkaConnectTemplates};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_NAMESPACE: &str = "connect-st";

pub const CONNECT_MANIFEST: &str = r#"
apiVersion: kafka.strimzi.io/v1beta2
kind: KafkaConnect
metadata:
  name: my-connect-cluster
spec:
  version: 3.6.0
  replicas: 1
  bootstrapServers: my-cluster-kafka-bootstrap:9093
  tls:
    trustedCertificates:
      - secretName: my-cluster-cluster-ca-cert
        certificate: ca.crt
  config:
    group.id: connect-cluster
    offset.storage.topic: connect-cluster-offsets
    config.storage.topic: connect-cluster-configs
    status.storage.topic: connect-cluster-status
    config.storage.replication.factor: -1
    offset.storage.replication.factor: -1
    status.storage.replication.factor: -1
"#;

pub const METRICS_MANIFEST: &str = r#"
apiVersion: kafka.strimzi.io/v1beta2
kind: KafkaConnect
metadata:
  name: my-connect-cluster
spec:
  replicas: 1
  bootstrapServers: my-cluster-kafka-bootstrap:9093
  metricsConfig:
    type: jmxPrometheusExporter
    valueFrom:
      configMapKeyRef:
        name: connect-metrics
        key: metrics-config.yml
---
kind: ConfigMap
apiVersion: v1
metadata:
  name: connect-metrics
  labels:
    app: strimzi
data:
  metrics-config.yml: |
    lowercaseOutputName: true
"#;

/// Test environment with manifests on disk and an in-memory cluster
pub struct TestEnv {
    pub templates: KafkaConnectTemplates,
    pub pipeline: Arc<InMemoryPipeline>,
    pub config: Arc<EnvironmentConfig>,
    _dir: TempDir,
}

impl TestEnv {
    pub fn new(default_deny: bool) -> Self {
        Self::with_config(|config| {
            config.network.default_to_deny_network_policies = default_deny;
        })
    }

    pub fn with_config<F: FnOnce(&mut EnvironmentConfig)>(customize: F) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let connect_path = dir.path().join("kafka-connect.yaml");
        let metrics_path = dir.path().join("kafka-connect-metrics.yaml");
        std::fs::write(&connect_path, CONNECT_MANIFEST).expect("Failed to write manifest");
        std::fs::write(&metrics_path, METRICS_MANIFEST).expect("Failed to write manifest");

        let mut config = EnvironmentConfig::default();
        config.manifests.kafka_connect = connect_path;
        config.manifests.kafka_connect_metrics = metrics_path;
        customize(&mut config);

        let config = Arc::new(config);
        let pipeline = Arc::new(InMemoryPipeline::new(TEST_NAMESPACE));
        let templates = KafkaConnectTemplates::new(config.clone(), pipeline.clone());

        Self {
            templates,
            pipeline,
            config,
            _dir: dir,
        }
    }
}

/// Context of a test running alone in its namespace
pub fn serial_context(test_name: &str) -> TestContext {
    TestContext::serial(test_name)
}

/// Context of a parallel-namespace test sharing `namespace` and `scraper`
pub fn parallel_context(test_name: &str, namespace: &str, scraper: Option<&str>) -> TestContext {
    let mut store = RunStore::new().with(NAMESPACE_KEY, namespace);
    if let Some(scraper) = scraper {
        store = store.with(SCRAPER_KEY, scraper);
    }
    TestContext::new(test_name, true, Arc::new(store))
}
