//! Index configuration: where the artifact lives and how links are rendered.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::RelativePath;
use crate::store::IndexStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Generated artifact (bare JSON or `Index.PACKAGES = {...};`)
    pub artifact: PathBuf,
    /// Prefix for browsable links; empty keeps links relative
    #[serde(default)]
    pub base_url: String,
}

impl IndexConfig {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            base_url: String::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON config file. A relative `artifact` path is resolved
    /// against the config file's directory.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_json(&std::fs::read_to_string(path)?)?;
        if config.artifact.is_relative() {
            if let Some(dir) = path.parent() {
                config.artifact = dir.join(&config.artifact);
            }
        }
        Ok(config)
    }

    pub fn load_store(&self) -> Result<IndexStore> {
        IndexStore::load_path(&self.artifact)
    }

    pub fn href(&self, path: &RelativePath) -> String {
        path.href(&self.base_url)
    }
}
