//! KafkaConnect template tests
//! Tests for spec defaults, scraper access provisioning, metrics and teardown

mod common;

use common::{parallel_context, serial_context, TestEnv, TEST_NAMESPACE};
use connect_templates::crd::naming;
use connect_templates::pipeline::memory::DeleteRecord;
use connect_templates::pipeline::{
    DeletionPropagation, ManagedResource, ResourceKind, ResourcePipeline,
};
use connect_templates::templates::defaults::{
    CONFIG_STORAGE_TOPIC, GROUP_ID, OFFSET_STORAGE_TOPIC, STATUS_STORAGE_TOPIC,
};
use connect_templates::{ConnectParams, TemplateError};

// ============== Spec Defaults ==============

#[tokio::test]
async fn test_kafka_connect_defaults_to_current_namespace_and_own_cluster() {
    let env = TestEnv::new(false);
    let ctx = serial_context("testDefaults");

    let connect = env.templates.kafka_connect(&ctx, "my-connect", 1).await.unwrap();

    assert_eq!(connect.metadata.namespace.as_deref(), Some(TEST_NAMESPACE));
    assert_eq!(connect.spec.bootstrap_servers, "my-connect-kafka-bootstrap:9093");
    assert_eq!(connect.spec.version.as_deref(), Some("3.6.0"));
}

#[tokio::test]
async fn test_kafka_connect_in_namespace_example() {
    let env = TestEnv::new(false);
    let ctx = serial_context("testExample");

    let connect = env
        .templates
        .kafka_connect_in_namespace(&ctx, "my-connect", "ns1", "my-cluster", 3)
        .await
        .unwrap();

    assert_eq!(connect.metadata.name.as_deref(), Some("my-connect"));
    assert_eq!(connect.metadata.namespace.as_deref(), Some("ns1"));
    assert_eq!(connect.spec.replicas, Some(3));
    assert_eq!(connect.spec.bootstrap_servers, "my-cluster-kafka-bootstrap:9093");
    assert_eq!(connect.config_value(GROUP_ID), Some("my-connect-connect"));
    assert_eq!(connect.config_value(OFFSET_STORAGE_TOPIC), Some("my-connect-offsets"));
    assert_eq!(connect.config_value(CONFIG_STORAGE_TOPIC), Some("my-connect-connect-config"));
    assert_eq!(connect.config_value(STATUS_STORAGE_TOPIC), Some("my-connect-status"));
    assert_eq!(connect.inline_logger(naming::ROOT_LOGGER), Some("DEBUG"));

    // Replication factors from the manifest are kept
    assert_eq!(
        connect.spec.config.get("config.storage.replication.factor"),
        Some(&serde_json::json!(-1))
    );
}

#[tokio::test]
async fn test_kafka_connect_rejects_zero_replicas() {
    let env = TestEnv::new(true);
    let ctx = serial_context("testZeroReplicas");

    let result = env.templates.kafka_connect(&ctx, "my-connect", 0).await;

    assert!(matches!(result, Err(TemplateError::InvalidParameter(_))));
    assert_eq!(env.pipeline.total_applies().await, 0);
}

#[tokio::test]
async fn test_missing_manifest_fails_setup() {
    let env = TestEnv::with_config(|config| {
        config.manifests.kafka_connect = "/nonexistent/kafka-connect.yaml".into();
    });
    let ctx = serial_context("testMissingManifest");

    let result = env.templates.kafka_connect(&ctx, "my-connect", 1).await;

    assert!(matches!(result, Err(TemplateError::ManifestRead { .. })));
}

// ============== Access Provisioning ==============

#[tokio::test]
async fn test_no_provisioning_without_default_deny() {
    let env = TestEnv::new(false);
    let ctx = serial_context("testAllowAll");

    env.templates.kafka_connect(&ctx, "my-connect", 1).await.unwrap();

    assert_eq!(env.pipeline.total_applies().await, 0);
}

#[tokio::test]
async fn test_default_deny_creates_scraper_and_grant() {
    let env = TestEnv::new(true);
    let ctx = serial_context("testDefaultDeny");

    env.templates.kafka_connect(&ctx, "my-connect", 1).await.unwrap();

    assert!(env
        .pipeline
        .exists(ResourceKind::Deployment, TEST_NAMESPACE, "my-connect-scraper")
        .await
        .unwrap());
    assert!(env
        .pipeline
        .exists(ResourceKind::NetworkPolicy, TEST_NAMESPACE, "my-connect-allow")
        .await
        .unwrap());
    // The Connect resource itself is left for the caller to apply
    assert_eq!(env.pipeline.count(ResourceKind::KafkaConnect).await, 0);
}

#[tokio::test]
async fn test_opt_out_of_network_policy() {
    let env = TestEnv::new(true);
    let ctx = serial_context("testOptOut");

    env.templates
        .kafka_connect_with_network_policy(&ctx, "my-connect", 1, false)
        .await
        .unwrap();

    assert_eq!(env.pipeline.total_applies().await, 0);
}

#[tokio::test]
async fn test_repeated_provisioning_is_idempotent() {
    let env = TestEnv::new(true);
    let ctx = serial_context("testIdempotent");

    for _ in 0..2 {
        env.templates.kafka_connect(&ctx, "my-connect", 1).await.unwrap();
    }

    assert_eq!(env.pipeline.count(ResourceKind::Deployment).await, 1);
    assert_eq!(env.pipeline.count(ResourceKind::NetworkPolicy).await, 1);
}

#[tokio::test]
async fn test_parallel_test_uses_run_scraper() {
    let env = TestEnv::new(true);
    let ctx = parallel_context("testParallel", "shared-ns", Some("run-scraper"));

    env.templates
        .kafka_connect_with(&ctx, ConnectParams::new("my-connect", 1).in_namespace("ns1"))
        .await
        .unwrap();

    assert!(env
        .pipeline
        .exists(ResourceKind::Deployment, "shared-ns", "run-scraper")
        .await
        .unwrap());

    // The grant stays with the Connect cluster and admits the scraper across namespaces
    match env
        .pipeline
        .get(ResourceKind::NetworkPolicy, "ns1", "my-connect-allow")
        .await
    {
        Some(ManagedResource::NetworkPolicy(policy)) => {
            let ingress = policy.spec.unwrap().ingress.unwrap();
            let peer = &ingress[0].from.as_ref().unwrap()[0];
            let namespaces = peer
                .namespace_selector
                .as_ref()
                .and_then(|selector| selector.match_labels.as_ref())
                .unwrap();
            assert_eq!(namespaces.get("kubernetes.io/metadata.name").unwrap(), "shared-ns");
        }
        other => panic!("access grant not applied: {:?}", other),
    }
}

#[tokio::test]
async fn test_namespace_rbac_scope_ignores_parallel_flag() {
    let env = TestEnv::with_config(|config| {
        config.network.default_to_deny_network_policies = true;
        config.rbac.scope = connect_templates::config::RbacScope::Namespace;
    });
    let ctx = parallel_context("testRbacScoped", "shared-ns", None);

    env.templates
        .kafka_connect_with(&ctx, ConnectParams::new("my-connect", 1).in_namespace("ns1"))
        .await
        .unwrap();

    assert!(env
        .pipeline
        .exists(ResourceKind::Deployment, "ns1", "my-connect-scraper")
        .await
        .unwrap());
    assert_eq!(env.pipeline.list(ResourceKind::Deployment).await.len(), 1);
}

#[tokio::test]
async fn test_allow_network_policy_for_existing_resource() {
    let env = TestEnv::new(true);
    let ctx = serial_context("testAllowExisting");

    let connect = env
        .templates
        .kafka_connect_with_network_policy(&ctx, "my-connect", 1, false)
        .await
        .unwrap();

    // No scraper yet
    let result = env
        .templates
        .allow_network_policy_for_kafka_connect(&ctx, &connect)
        .await;
    assert!(matches!(result, Err(TemplateError::ProbeMissing { .. })));

    env.templates.kafka_connect(&ctx, "my-connect", 1).await.unwrap();
    env.templates
        .allow_network_policy_for_kafka_connect(&ctx, &connect)
        .await
        .unwrap();

    assert_eq!(env.pipeline.count(ResourceKind::NetworkPolicy).await, 1);
}

// ============== Metrics ==============

#[tokio::test]
async fn test_metrics_config_map_registered_before_build() {
    let env = TestEnv::new(true);

    let connect = env
        .templates
        .kafka_connect_with_metrics_for_cluster("my-connect", "my-cluster", 1)
        .await
        .unwrap();

    match env
        .pipeline
        .get(ResourceKind::ConfigMap, TEST_NAMESPACE, "connect-metrics")
        .await
    {
        Some(ManagedResource::ConfigMap(cm)) => {
            assert!(cm.data.unwrap().contains_key("metrics-config.yml"));
        }
        other => panic!("metrics ConfigMap not registered: {:?}", other),
    }

    assert!(connect.spec.metrics_config.is_some());
    assert_eq!(connect.config_value(GROUP_ID), Some("my-connect-connect"));
    // Metrics variant never provisions access
    assert_eq!(env.pipeline.count(ResourceKind::NetworkPolicy).await, 0);
}

#[tokio::test]
async fn test_metrics_config_map_overwritten_on_rerun() {
    let env = TestEnv::new(false);

    env.templates.kafka_connect_with_metrics_for_cluster("a", "my-cluster", 1).await.unwrap();
    env.templates.kafka_connect_with_metrics_for_cluster("b", "my-cluster", 1).await.unwrap();

    assert_eq!(env.pipeline.apply_count(ResourceKind::ConfigMap).await, 2);
    assert_eq!(env.pipeline.count(ResourceKind::ConfigMap).await, 1);
}

#[tokio::test]
async fn test_metrics_rejected_parameters_register_nothing() {
    let env = TestEnv::new(true);

    let result = env
        .templates
        .kafka_connect_with_metrics_for_cluster("my-connect", "my-cluster", 0)
        .await;
    assert!(matches!(result, Err(TemplateError::InvalidParameter(_))));

    let result = env
        .templates
        .kafka_connect_with_metrics_for_cluster("my-connect", "", 1)
        .await;
    assert!(matches!(result, Err(TemplateError::InvalidParameter(_))));

    assert_eq!(env.pipeline.apply_count(ResourceKind::ConfigMap).await, 0);
    assert_eq!(env.pipeline.total_applies().await, 0);
}

#[tokio::test]
async fn test_metrics_cluster_defaults_to_own_name() {
    let env = TestEnv::new(false);

    let connect = env
        .templates
        .kafka_connect_with_metrics("my-connect", 2)
        .await
        .unwrap();

    assert_eq!(connect.spec.bootstrap_servers, "my-connect-kafka-bootstrap:9093");
    assert_eq!(connect.spec.replicas, Some(2));
    assert_eq!(env.pipeline.count(ResourceKind::ConfigMap).await, 1);
}

// ============== Apply and Teardown ==============

#[tokio::test]
async fn test_default_kafka_connect_has_no_side_effects() {
    let env = TestEnv::new(true);

    let connect = env
        .templates
        .default_kafka_connect("my-connect", "my-cluster", 2)
        .unwrap();

    assert_eq!(connect.metadata.namespace.as_deref(), Some(TEST_NAMESPACE));
    assert_eq!(env.pipeline.total_applies().await, 0);
}

#[tokio::test]
async fn test_kafka_connect_without_wait_applies_directly() {
    let env = TestEnv::new(true);
    let mut connect = env
        .templates
        .default_kafka_connect("my-connect", "my-cluster", 1)
        .unwrap();
    connect.metadata.namespace = None;

    let applied = env.templates.kafka_connect_without_wait(connect).await.unwrap();

    assert_eq!(applied.metadata.namespace.as_deref(), Some(TEST_NAMESPACE));
    assert!(env
        .pipeline
        .exists(ResourceKind::KafkaConnect, TEST_NAMESPACE, "my-connect")
        .await
        .unwrap());
    assert_eq!(env.pipeline.count(ResourceKind::NetworkPolicy).await, 0);
}

#[tokio::test]
async fn test_kafka_connect_without_wait_rejects_foreign_namespace() {
    let env = TestEnv::new(false);
    let ctx = serial_context("testForeignNamespace");
    let connect = env
        .templates
        .kafka_connect_in_namespace(&ctx, "my-connect", "other-ns", "my-cluster", 1)
        .await
        .unwrap();

    let result = env.templates.kafka_connect_without_wait(connect).await;

    assert!(matches!(result, Err(TemplateError::InvalidParameter(_))));
    assert_eq!(env.pipeline.total_applies().await, 0);
}

#[tokio::test]
async fn test_delete_uses_foreground_cascade() {
    let env = TestEnv::new(false);
    let connect = env
        .templates
        .default_kafka_connect("my-connect", "my-cluster", 1)
        .unwrap();
    env.templates.kafka_connect_without_wait(connect).await.unwrap();

    env.templates
        .delete_kafka_connect_without_wait("my-connect")
        .await
        .unwrap();

    assert_eq!(
        env.pipeline.deletes().await,
        vec![DeleteRecord {
            kind: ResourceKind::KafkaConnect,
            namespace: TEST_NAMESPACE.to_string(),
            name: "my-connect".to_string(),
            propagation: DeletionPropagation::Foreground,
        }]
    );
    assert!(!env
        .pipeline
        .exists(ResourceKind::KafkaConnect, TEST_NAMESPACE, "my-connect")
        .await
        .unwrap());
}

