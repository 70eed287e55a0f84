//! Catalog loading from the app bundle.

use crate::error::{CatalogError, Result};
use crate::models::{Catalog, Video};
use bridge_traits::{BridgeError, ResourceBundle};
use core_runtime::logging::strip_path;
use tracing::{debug, info};

/// Resource name of the bundled manifest.
pub const CATALOG_RESOURCE: &str = "videos";
/// Extension of the bundled manifest.
pub const CATALOG_EXTENSION: &str = "json";

pub struct VideoManager;

impl VideoManager {
    /// Load the videos listed in the bundled `videos.json`.
    pub async fn fetch_videos(bundle: &dyn ResourceBundle) -> Result<Vec<Video>> {
        Ok(Self::fetch_catalog(bundle, CATALOG_RESOURCE).await?.videos)
    }

    /// Load and decode the manifest named `resource` (without extension).
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidPath`] if the bundle has no such resource
    /// - [`CatalogError::DoesNotExist`] if the resource cannot be read
    /// - [`CatalogError::FailedToDecode`] if the JSON does not match the schema
    pub async fn fetch_catalog(bundle: &dyn ResourceBundle, resource: &str) -> Result<Catalog> {
        let name = format!("{}.{}", resource, CATALOG_EXTENSION);
        let path = bundle
            .path_for_resource(resource, CATALOG_EXTENSION)
            .ok_or_else(|| CatalogError::InvalidPath(name.clone()))?;

        debug!(file = %strip_path(&path.to_string_lossy()), "Reading catalog");
        let data = bundle
            .read_resource(resource, CATALOG_EXTENSION)
            .await
            .map_err(|source| match source {
                // Removed between lookup and read.
                BridgeError::NotAvailable(_) => CatalogError::InvalidPath(name.clone()),
                source => CatalogError::DoesNotExist {
                    resource: name.clone(),
                    source,
                },
            })?;

        let catalog = Self::decode(&data)?;
        info!(name = %catalog.name, count = catalog.videos.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Decode a manifest document.
    pub fn decode(data: &[u8]) -> Result<Catalog> {
        Ok(serde_json::from_slice(data)?)
    }
}
