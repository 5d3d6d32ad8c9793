//! Static manifest loading
//!
//! Example manifests may hold several YAML documents; the Connect metrics
//! example ships the KafkaConnect next to the ConfigMap it references.

use crate::crd::KafkaConnect;
use crate::error::{TemplateError, TemplateResult};
use k8s_openapi::api::core::v1::ConfigMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Read the first KafkaConnect document of a manifest
pub fn kafka_connect_from_yaml(path: &Path) -> TemplateResult<KafkaConnect> {
    let content = read(path)?;
    find_document(path, &content, "KafkaConnect", None)
}

/// Read the ConfigMap called `name` from a manifest
pub fn config_map_from_yaml(path: &Path, name: &str) -> TemplateResult<ConfigMap> {
    let content = read(path)?;
    find_document(path, &content, "ConfigMap", Some(name))
}

fn read(path: &Path) -> TemplateResult<String> {
    std::fs::read_to_string(path).map_err(|source| TemplateError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })
}

fn find_document<T: DeserializeOwned>(
    path: &Path,
    content: &str,
    kind: &str,
    name: Option<&str>,
) -> TemplateResult<T> {
    let parse_error = |source| TemplateError::ManifestParse {
        path: path.to_path_buf(),
        source,
    };

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document).map_err(parse_error)?;
        if value.is_null() {
            continue;
        }
        if value.get("kind").and_then(|k| k.as_str()) != Some(kind) {
            continue;
        }
        if let Some(expected) = name {
            let actual = value
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(|n| n.as_str());
            if actual != Some(expected) {
                continue;
            }
        }

        return serde_yaml::from_value(value).map_err(parse_error);
    }

    Err(TemplateError::ManifestMissing {
        kind: kind.to_string(),
        name: name.unwrap_or("*").to_string(),
        path: path.to_path_buf(),
    })
}
