//! Kubernetes plumbing for the Connect templates
//!
//! - Cluster connection via kubeconfig or in-cluster configuration
//! - NetworkPolicy rendering for scraper access grants
//! - Scraper workload rendering

pub mod client;
pub mod networking;
pub mod workloads;

pub use client::K8sClient;
