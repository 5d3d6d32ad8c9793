//! Kubernetes workloads created by the test harness

pub mod scraper;

pub use scraper::scraper_deployment;
