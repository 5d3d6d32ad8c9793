//! Test environment configuration
//!
//! Settings are loaded from:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)
//!
//! The loaded [`EnvironmentConfig`] is immutable and handed to every component
//! explicitly; nothing in this crate reads the process environment on its own.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration struct for the system test environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Kafka platform configuration
    pub kafka: KafkaConfig,
    /// Network policy regime of the cluster under test
    pub network: NetworkConfig,
    /// Operator RBAC scoping
    pub rbac: RbacConfig,
    /// Static manifests used as resource skeletons
    pub manifests: ManifestsConfig,
    /// Scraper pod configuration
    pub scraper: ScraperConfig,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Kafka platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Kafka version every test resource is pinned to
    pub version: String,
}

/// Network policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Cluster blocks all traffic unless a NetworkPolicy allows it
    pub default_to_deny_network_policies: bool,
}

/// RBAC scope of the operator under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RbacScope {
    #[default]
    Cluster,
    Namespace,
}

impl std::str::FromStr for RbacScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLUSTER" => Ok(Self::Cluster),
            "NAMESPACE" => Ok(Self::Namespace),
            other => Err(ConfigError::Parse(format!("unknown RBAC scope '{}'", other))),
        }
    }
}

/// RBAC configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    pub scope: RbacScope,
}

/// Paths to the static resource manifests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestsConfig {
    /// Plain KafkaConnect manifest
    pub kafka_connect: PathBuf,
    /// KafkaConnect manifest with metrics ConfigMap
    pub kafka_connect_metrics: PathBuf,
}

/// Scraper pod configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Container image of the scraper pod
    pub image: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for JSON log files; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Use JSON formatting on the console as well
    pub json_format: bool,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            version: "3.6.0".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            default_to_deny_network_policies: true,
        }
    }
}

impl Default for ManifestsConfig {
    fn default() -> Self {
        let examples = PathBuf::from("../packaging/examples");
        Self {
            kafka_connect: examples.join("connect/kafka-connect.yaml"),
            kafka_connect_metrics: examples.join("metrics/kafka-connect-metrics.yaml"),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            image: "registry.access.redhat.com/ubi8/openssl:latest".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json_format: false,
        }
    }
}

impl EnvironmentConfig {
    /// Load configuration from environment variables and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("CONNECT_ST_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("./connect-st.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply overrides from a variable lookup, normally the process environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Kafka
        if let Some(version) = lookup("ST_KAFKA_VERSION") {
            self.kafka.version = version;
        }

        // Network
        if let Some(deny) = lookup("DEFAULT_TO_DENY_NETWORK_POLICIES") {
            self.network.default_to_deny_network_policies =
                parse_bool("DEFAULT_TO_DENY_NETWORK_POLICIES", &deny)?;
        }

        // RBAC
        if let Some(scope) = lookup("STRIMZI_RBAC_SCOPE") {
            self.rbac.scope = scope.parse()?;
        }

        // Manifests
        if let Some(path) = lookup("PATH_TO_KAFKA_CONNECT_CONFIG") {
            self.manifests.kafka_connect = PathBuf::from(path);
        }
        if let Some(path) = lookup("PATH_TO_KAFKA_CONNECT_METRICS_CONFIG") {
            self.manifests.kafka_connect_metrics = PathBuf::from(path);
        }

        // Scraper
        if let Some(image) = lookup("SCRAPER_IMAGE") {
            self.scraper.image = image;
        }

        // Logging
        if let Some(level) = lookup("CONNECT_ST_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = lookup("CONNECT_ST_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Whether the operator runs namespace-scoped, which forces serial tests
    pub fn is_namespace_rbac_scope(&self) -> bool {
        self.rbac.scope == RbacScope::Namespace
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kafka.version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Kafka version cannot be empty".to_string(),
            ));
        }

        if self.scraper.image.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Scraper image cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| ConfigError::Parse(format!("{} must be true or false, got '{}'", key, value)))
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// Configuration validation failed
    #[error("Config validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for connect_common::Error {
    fn from(err: ConfigError) -> Self {
        connect_common::Error::InvalidConfig(err.to_string())
    }
}
