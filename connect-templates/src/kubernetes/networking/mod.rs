//! Kubernetes networking resources
//!
//! Handles NetworkPolicies that open test resources to the scraper.

pub mod network_policies;

pub use network_policies::AccessGrant;
