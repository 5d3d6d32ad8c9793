//! Resource naming conventions
//!
//! These mirror the names the Cluster Operator derives for a Connect cluster,
//! so tests can address generated objects without reading them back.

/// Port of the Kafka TLS listener behind the bootstrap service
pub const TLS_BOOTSTRAP_PORT: u16 = 9093;

/// Connect REST API port
pub const REST_API_PORT: i32 = 8083;

/// Prometheus JMX exporter port
pub const METRICS_PORT: i32 = 9404;

/// Key of the CA certificate inside the cluster CA secret
pub const CA_CERT_KEY: &str = "ca.crt";

/// Logger key of the Connect root logger
pub const ROOT_LOGGER: &str = "connect.root.logger.level";

/// Suffix of a scraper synthesised for a single resource
pub const SCRAPER_SUFFIX: &str = "-scraper";

/// Name of the Connect deployment; also used as the worker group id
pub fn deployment_name(name: &str) -> String {
    format!("{}-connect", name)
}

/// Name of the Connect REST API service
pub fn service_name(name: &str) -> String {
    format!("{}-connect-api", name)
}

/// Name of the metrics and logging ConfigMap; also used as the config storage topic
pub fn metrics_and_log_config_map_name(name: &str) -> String {
    format!("{}-connect-config", name)
}

pub fn config_storage_topic_offsets(name: &str) -> String {
    format!("{}-offsets", name)
}

pub fn config_storage_topic_status(name: &str) -> String {
    format!("{}-status", name)
}

/// Bootstrap address of the TLS listener of a Kafka cluster
pub fn tls_bootstrap_address(cluster_name: &str) -> String {
    format!("{}-kafka-bootstrap:{}", cluster_name, TLS_BOOTSTRAP_PORT)
}

/// Secret holding the public cluster CA certificate
pub fn cluster_ca_cert_secret_name(cluster_name: &str) -> String {
    format!("{}-cluster-ca-cert", cluster_name)
}

pub fn scraper_name(name: &str) -> String {
    format!("{}{}", name, SCRAPER_SUFFIX)
}

/// Name of the NetworkPolicy opening a resource to the scraper
pub fn network_policy_name(name: &str) -> String {
    format!("{}-allow", name)
}
