use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The bundle has no resource with the requested name.
    #[error("The path is invalid: no resource named {0}")]
    InvalidPath(String),

    /// The resource was located but could not be read.
    #[error("The video catalog {resource} could not be read: {source}")]
    DoesNotExist {
        resource: String,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to decode: {0}")]
    FailedToDecode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
