//! Bundled resource lookup.

use crate::error::Result;
use crate::platform::PlatformSendSync;
use std::path::PathBuf;

/// Locates and reads files shipped with the application bundle.
///
/// The core never touches the filesystem itself; it asks the bundle for the
/// bytes of a named resource.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ResourceBundle: PlatformSendSync {
    /// Path of `name.extension` inside the bundle, or `None` if the bundle
    /// has no such resource.
    ///
    /// Lookup only resolves a path; it does not guarantee the file is readable.
    fn path_for_resource(&self, name: &str, extension: &str) -> Option<PathBuf>;

    /// Read the whole of `name.extension`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotAvailable`](crate::BridgeError::NotAvailable) if the
    ///   bundle has no such resource
    /// - [`BridgeError::Io`](crate::BridgeError::Io) if it exists but cannot be read
    async fn read_resource(&self, name: &str, extension: &str) -> Result<Vec<u8>>;
}
