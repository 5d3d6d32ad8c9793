//! KafkaConnect resource templates for Strimzi system tests
//!
//! Builds fully wired KafkaConnect custom resources from a manifest skeleton,
//! opens them to the test scraper when the cluster denies traffic by default,
//! and hands everything to a [`pipeline::ResourcePipeline`] for creation and
//! teardown.

// Core modules
pub mod config;
pub mod error;
pub mod logging;

// Custom resources
pub mod crd;

// Kubernetes integration
pub mod kubernetes;
pub mod pipeline;

// Templates
pub mod templates;

pub use config::EnvironmentConfig;
pub use crd::KafkaConnect;
pub use error::{TemplateError, TemplateResult};
pub use pipeline::{InMemoryPipeline, KubePipeline, ResourcePipeline};
pub use templates::{ConnectParams, KafkaConnectTemplates};
