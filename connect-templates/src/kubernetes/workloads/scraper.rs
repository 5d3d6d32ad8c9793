//! Scraper workload
//!
//! An idle pod inside the cluster network. Tests exec into it to reach
//! operands, and access grants name it as the only permitted origin.

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

/// Label carrying the scraper's traffic identity
pub const SCRAPER_APP_LABEL: &str = "app";

/// Label shared by every test client workload
pub const TEST_APP_LABEL: &str = "user-test-app";

pub const TEST_APP_SCRAPER: &str = "scraper";

/// Single-replica scraper Deployment
pub fn scraper_deployment(namespace: &str, name: &str, image: &str) -> Deployment {
    let labels = BTreeMap::from([
        (SCRAPER_APP_LABEL.to_string(), name.to_string()),
        (TEST_APP_LABEL.to_string(), TEST_APP_SCRAPER.to_string()),
    ]);

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(BTreeMap::from([(
                    SCRAPER_APP_LABEL.to_string(),
                    name.to_string(),
                )])),
                match_expressions: None,
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: name.to_string(),
                        image: Some(image.to_string()),
                        image_pull_policy: Some("IfNotPresent".to_string()),
                        command: Some(vec!["sleep".to_string()]),
                        args: Some(vec!["infinity".to_string()]),
                        ..Default::default()
                    }],
                    termination_grace_period_seconds: Some(0),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_deployment() {
        let deployment = scraper_deployment("ns1", "my-connect-scraper", "busybox:latest");

        assert_eq!(deployment.metadata.name.as_deref(), Some("my-connect-scraper"));
        assert_eq!(deployment.metadata.namespace.as_deref(), Some("ns1"));

        let spec = deployment.spec.unwrap();
        assert_eq!(spec.replicas, Some(1));

        let selector = spec.selector.match_labels.unwrap();
        let pod_labels = spec.template.metadata.unwrap().labels.unwrap();
        for (key, value) in &selector {
            assert_eq!(pod_labels.get(key), Some(value));
        }
        assert_eq!(pod_labels.get(TEST_APP_LABEL).unwrap(), TEST_APP_SCRAPER);

        let container = &spec.template.spec.unwrap().containers[0];
        assert_eq!(container.image.as_deref(), Some("busybox:latest"));
        assert_eq!(container.command, Some(vec!["sleep".to_string()]));
    }
}
