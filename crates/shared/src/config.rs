//! Configuration types for rolecheck

use crate::error::RbacError;
use crate::selector::DEFAULT_ROLE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Registry behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Role selected after construction and after every reset
    #[serde(default = "default_role")]
    pub default_role: String,

    /// Fail `define` when a source names a role that does not exist yet,
    /// instead of treating it as an empty contribution
    #[serde(default)]
    pub strict_inheritance: bool,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
            strict_inheritance: false,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a JSON or YAML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let config: Self = read_document(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no registry can run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.default_role.trim().is_empty() {
            return Err(RbacError::Config("defaultRole must name a role".to_string()));
        }
        Ok(())
    }
}

/// Parse a JSON (`.json`) or YAML (any other extension) document
pub fn read_document<T: DeserializeOwned>(path: &Path) -> crate::Result<T> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}
