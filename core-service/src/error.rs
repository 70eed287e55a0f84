use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("No video at index {index} (catalog has {count})")]
    VideoNotFound { index: usize, count: usize },

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] core_catalog::CatalogError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlayerError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
