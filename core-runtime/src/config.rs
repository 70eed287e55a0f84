//! # Core Configuration Module
//!
//! Provides configuration management for the video player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every host bridge the core talks to. It enforces
//! fail-fast validation so a missing bridge is reported at startup instead of
//! when the first video is opened.
//!
//! ## Required Dependencies
//!
//! - `VideoPlayerAdapter` - The platform player that decodes and renders
//! - `RemoteCommandCenter` - Headset / lock-screen command registration
//! - `NowPlayingInfoCenter` - Lock-screen metadata surface
//! - `AudioSession` - Process-wide audio session
//! - `ResourceBundle` - Access to the bundled catalog manifest
//!
//! When the `desktop-shims` feature is enabled, the `bridge-desktop`
//! implementations are injected for any bridge that was not provided. The
//! desktop resource bundle resolves files under [`CoreConfigBuilder::resource_dir`]
//! (default: `resources`).
//!
//! ## Usage
//!
//! ### Desktop Defaults
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .resource_dir("/path/to/resources")
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ### Host-Provided Bridges
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .player(Arc::new(MyPlayer))
//!     .remote_commands(Arc::new(MyRemoteCommandCenter))
//!     .now_playing(Arc::new(MyNowPlayingCenter))
//!     .audio_session(Arc::new(MyAudioSession))
//!     .resource_bundle(Arc::new(MyBundle))
//!     .event_buffer_size(256)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    AudioSession, NowPlayingInfoCenter, RemoteCommandCenter, ResourceBundle, VideoPlayerAdapter,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Resource name of the bundled catalog manifest.
pub const DEFAULT_CATALOG_RESOURCE: &str = "videos";

/// Directory the desktop resource bundle falls back to.
pub const DEFAULT_RESOURCE_DIR: &str = "resources";

/// Core configuration for the video player core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform video player
    pub player: Arc<dyn VideoPlayerAdapter>,

    /// Remote command registration
    pub remote_commands: Arc<dyn RemoteCommandCenter>,

    /// Lock-screen metadata
    pub now_playing: Arc<dyn NowPlayingInfoCenter>,

    /// Shared audio session
    pub audio_session: Arc<dyn AudioSession>,

    /// App bundle resources (catalog manifest)
    pub resource_bundle: Arc<dyn ResourceBundle>,

    /// Name of the catalog resource inside the bundle, without extension
    pub catalog_resource: String,

    /// Capacity of the core event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("player", &"VideoPlayerAdapter { ... }")
            .field("remote_commands", &"RemoteCommandCenter { ... }")
            .field("now_playing", &"NowPlayingInfoCenter { ... }")
            .field("audio_session", &"AudioSession { ... }")
            .field("resource_bundle", &"ResourceBundle { ... }")
            .field("catalog_resource", &self.catalog_resource)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.catalog_resource.trim().is_empty() {
            return Err(Error::Config(
                "Catalog resource name cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Bridge Defaults
// ============================================================================

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{capability} implementation is required for {purpose}. \
             Desktop: ensure the 'desktop-shims' feature is enabled to use the bridge-desktop default. \
             Mobile: inject the platform-native implementation."
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_player() -> Result<Arc<dyn VideoPlayerAdapter>> {
    Ok(Arc::new(bridge_desktop::SimulatedVideoPlayer::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_player() -> Result<Arc<dyn VideoPlayerAdapter>> {
    Err(capability_missing("VideoPlayerAdapter", "video playback"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_remote_commands() -> Result<Arc<dyn RemoteCommandCenter>> {
    Ok(Arc::new(bridge_desktop::InMemoryRemoteCommandCenter::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_remote_commands() -> Result<Arc<dyn RemoteCommandCenter>> {
    Err(capability_missing("RemoteCommandCenter", "remote control handling"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_now_playing() -> Result<Arc<dyn NowPlayingInfoCenter>> {
    Ok(Arc::new(bridge_desktop::InMemoryNowPlayingCenter::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_now_playing() -> Result<Arc<dyn NowPlayingInfoCenter>> {
    Err(capability_missing("NowPlayingInfoCenter", "lock-screen metadata"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_audio_session() -> Result<Arc<dyn AudioSession>> {
    Ok(Arc::new(bridge_desktop::DesktopAudioSession::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_audio_session() -> Result<Arc<dyn AudioSession>> {
    Err(capability_missing("AudioSession", "audio session management"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_resource_bundle(dir: Option<PathBuf>) -> Result<Arc<dyn ResourceBundle>> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCE_DIR));
    Ok(Arc::new(bridge_desktop::DirectoryBundle::new(dir)))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_resource_bundle(_dir: Option<PathBuf>) -> Result<Arc<dyn ResourceBundle>> {
    Err(capability_missing("ResourceBundle", "loading the video catalog"))
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    player: Option<Arc<dyn VideoPlayerAdapter>>,
    remote_commands: Option<Arc<dyn RemoteCommandCenter>>,
    now_playing: Option<Arc<dyn NowPlayingInfoCenter>>,
    audio_session: Option<Arc<dyn AudioSession>>,
    resource_bundle: Option<Arc<dyn ResourceBundle>>,
    resource_dir: Option<PathBuf>,
    catalog_resource: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the platform video player (required).
    pub fn player(mut self, player: Arc<dyn VideoPlayerAdapter>) -> Self {
        self.player = Some(player);
        self
    }

    /// Sets the remote command center (required).
    pub fn remote_commands(mut self, center: Arc<dyn RemoteCommandCenter>) -> Self {
        self.remote_commands = Some(center);
        self
    }

    /// Sets the now-playing info center (required).
    pub fn now_playing(mut self, center: Arc<dyn NowPlayingInfoCenter>) -> Self {
        self.now_playing = Some(center);
        self
    }

    /// Sets the audio session (required).
    pub fn audio_session(mut self, session: Arc<dyn AudioSession>) -> Self {
        self.audio_session = Some(session);
        self
    }

    /// Sets the resource bundle (required).
    ///
    /// Takes precedence over [`resource_dir`](Self::resource_dir).
    pub fn resource_bundle(mut self, bundle: Arc<dyn ResourceBundle>) -> Self {
        self.resource_bundle = Some(bundle);
        self
    }

    /// Directory used by the desktop resource bundle.
    ///
    /// Only consulted when no bundle is injected and `desktop-shims` is enabled.
    pub fn resource_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    /// Overrides the catalog resource name.
    ///
    /// Default: `videos` (resolved as `videos.json`)
    pub fn catalog_resource(mut self, name: impl Into<String>) -> Self {
        self.catalog_resource = Some(name.into());
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`]
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - A required bridge is missing and no desktop default is available
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let player = match self.player {
            Some(player) => player,
            None => provide_default_player()?,
        };

        let remote_commands = match self.remote_commands {
            Some(center) => center,
            None => provide_default_remote_commands()?,
        };

        let now_playing = match self.now_playing {
            Some(center) => center,
            None => provide_default_now_playing()?,
        };

        let audio_session = match self.audio_session {
            Some(session) => session,
            None => provide_default_audio_session()?,
        };

        let resource_bundle = match self.resource_bundle {
            Some(bundle) => bundle,
            None => provide_default_resource_bundle(self.resource_dir)?,
        };

        let config = CoreConfig {
            player,
            remote_commands,
            now_playing,
            audio_session,
            resource_bundle,
            catalog_resource: self
                .catalog_resource
                .unwrap_or_else(|| DEFAULT_CATALOG_RESOURCE.to_string()),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::{
        DesktopAudioSession, DirectoryBundle, InMemoryNowPlayingCenter,
        InMemoryRemoteCommandCenter, SimulatedVideoPlayer,
    };

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .player(Arc::new(SimulatedVideoPlayer::new()))
            .remote_commands(Arc::new(InMemoryRemoteCommandCenter::new()))
            .now_playing(Arc::new(InMemoryNowPlayingCenter::new()))
            .audio_session(Arc::new(DesktopAudioSession::new()))
            .resource_bundle(Arc::new(DirectoryBundle::new("/bundle")))
    }

    #[test]
    fn test_builder_with_all_bridges() {
        let config = full_builder().build().unwrap();

        assert_eq!(config.catalog_resource, DEFAULT_CATALOG_RESOURCE);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_overrides() {
        let config = full_builder()
            .catalog_resource("featured")
            .event_buffer_size(8)
            .build()
            .unwrap();

        assert_eq!(config.catalog_resource, "featured");
        assert_eq!(config.event_buffer_size, 8);
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = full_builder().event_buffer_size(0).build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Event buffer size must be greater than 0"));
    }

    #[test]
    fn test_validate_rejects_blank_catalog_resource() {
        let result = full_builder().catalog_resource("  ").build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_player() {
        let result = CoreConfig::builder()
            .remote_commands(Arc::new(InMemoryRemoteCommandCenter::new()))
            .now_playing(Arc::new(InMemoryNowPlayingCenter::new()))
            .audio_session(Arc::new(DesktopAudioSession::new()))
            .resource_bundle(Arc::new(DirectoryBundle::new("/bundle")))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "VideoPlayerAdapter");
                assert!(message.contains("desktop-shims"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_resource_bundle() {
        let result = CoreConfig::builder()
            .player(Arc::new(SimulatedVideoPlayer::new()))
            .remote_commands(Arc::new(InMemoryRemoteCommandCenter::new()))
            .now_playing(Arc::new(InMemoryNowPlayingCenter::new()))
            .audio_session(Arc::new(DesktopAudioSession::new()))
            .resource_dir("/ignored/without/shims")
            .build();

        let err = result.unwrap_err().to_string();
        assert!(err.contains("ResourceBundle"));
        assert!(err.contains("video catalog"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_defaults() {
        let dir = std::env::temp_dir().join(format!("core-runtime-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("videos.json"), "{}").unwrap();

        let config = CoreConfig::builder().resource_dir(&dir).build().unwrap();

        assert_eq!(
            config.resource_bundle.path_for_resource("videos", "json"),
            Some(dir.join("videos.json"))
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = full_builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.catalog_resource, config.catalog_resource);
        assert!(format!("{:?}", cloned).contains("VideoPlayerAdapter"));
    }
}
