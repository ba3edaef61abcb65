//! Configuration for hyperlink normalization

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{LinkError, Result};

/// Normalizer configuration, loaded from TOML when a config file is given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Also rewrite web URL targets (scheme and host are dropped)
    pub rewrite_urls: bool,
    /// Extension, without the dot, of the files picked up in directory mode
    pub extension: String,
}

impl NormalizerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| LinkError::file_access(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LinkError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() {
            return Err(LinkError::Config("extension must not be empty".to_string()));
        }
        if self.extension.contains(['/', '\\']) {
            return Err(LinkError::Config(format!(
                "extension '{}' must not contain a path separator",
                self.extension
            )));
        }
        Ok(())
    }

    /// File name suffix matched in directory mode (".xlsx")
    pub fn suffix(&self) -> String {
        if self.extension.starts_with('.') {
            self.extension.clone()
        } else {
            format!(".{}", self.extension)
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            rewrite_urls: false,
            extension: "xlsx".to_string(),
        }
    }
}
