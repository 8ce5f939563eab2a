use std::collections::HashMap;

use serde::Deserialize;

/// Subset of the OCI/docker image configuration the checks look at.
#[derive(PartialEq, Eq, Clone, Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    config: ContainerConfig,
}

#[derive(PartialEq, Eq, Clone, Debug, Default, Deserialize)]
struct ContainerConfig {
    // docker writes `null` when no labels were set
    #[serde(rename = "Labels", default)]
    labels: Option<HashMap<String, String>>,
}

impl ConfigFile {
    pub fn with_labels(labels: HashMap<String, String>) -> Self {
        Self {
            config: ContainerConfig {
                labels: Some(labels),
            },
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.config
            .labels
            .as_ref()
            .and_then(|labels| labels.get(key))
            .map(String::as_str)
    }
}
