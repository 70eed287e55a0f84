//! Directory-backed resource bundle.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    resources::ResourceBundle,
};
use std::path::PathBuf;

/// Resolves bundle resources as files inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ResourceBundle for DirectoryBundle {
    fn path_for_resource(&self, name: &str, extension: &str) -> Option<PathBuf> {
        let extension = extension.trim_start_matches('.');
        let path = self.root.join(format!("{name}.{extension}"));
        path.exists().then_some(path)
    }

    async fn read_resource(&self, name: &str, extension: &str) -> Result<Vec<u8>> {
        let path = self.path_for_resource(name, extension).ok_or_else(|| {
            BridgeError::NotAvailable(format!(
                "no resource {}.{}",
                name,
                extension.trim_start_matches('.')
            ))
        })?;
        Ok(tokio::fs::read(path).await?)
    }
}
