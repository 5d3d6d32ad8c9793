//! Strimzi custom resources used by the system tests

pub mod kafka_connect;
pub mod naming;

pub use kafka_connect::{
    CertSecretSource, ClientTls, ExternalConfigurationReference, KafkaConnect, KafkaConnectSpec,
    KafkaConnectStatus, Logging, MetricsConfig,
};
