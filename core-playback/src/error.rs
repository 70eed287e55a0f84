//! # Playback Error Types
//!
//! Errors raised while configuring and driving a video playback session.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlayerError {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The player configuration carries no asset to play.
    #[error("No asset found in player configuration")]
    NoAssetFound,

    /// The host player refused the asset.
    #[error("Asset is not playable: {0}")]
    NotPlayable(String),

    /// The item failed after it was accepted by the player.
    #[error("Playback failed: {0}")]
    Failed(String),

    // ========================================================================
    // Now-Playing Errors
    // ========================================================================
    /// Remote command configuration was requested with an empty command list.
    #[error("No remote commands registered")]
    NoRegisteredCommands,

    /// The shared audio session rejected the playback category.
    #[error("Cannot set audio session category: {0}")]
    CannotSetCategory(String),

    /// The shared audio session could not be activated.
    #[error("Cannot activate audio session: {0}")]
    CannotActivateSession(String),

    /// The shared audio session could not be reactivated after an interruption.
    #[error("Cannot reactivate audio session: {0}")]
    CannotReactivateSession(String),

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Seek offset is not a finite number of seconds.
    #[error("Invalid seek offset: {0}")]
    InvalidSeekOffset(f64),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Player configuration values are out of range.
    #[error("Invalid player configuration: {0}")]
    InvalidConfiguration(String),

    /// Asset URL is not an absolute URL.
    #[error("Invalid asset URL '{url}': {reason}")]
    InvalidAssetUrl { url: String, reason: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Host bridge operation failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlayerError {
    /// Returns `true` if the error came from the shared audio session.
    pub fn is_audio_session_error(&self) -> bool {
        matches!(
            self,
            PlayerError::CannotSetCategory(_)
                | PlayerError::CannotActivateSession(_)
                | PlayerError::CannotReactivateSession(_)
        )
    }

    /// Returns `true` if the error is about the asset itself rather than the host.
    pub fn is_asset_error(&self) -> bool {
        matches!(
            self,
            PlayerError::NoAssetFound
                | PlayerError::NotPlayable(_)
                | PlayerError::Failed(_)
                | PlayerError::InvalidAssetUrl { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
