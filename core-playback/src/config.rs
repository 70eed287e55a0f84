//! # Player Configuration
//!
//! What a playback session plays and which remote commands it exposes.
//!
//! ## Overview
//!
//! `PlayerConfiguration` deserializes with defaults for every field, so an
//! empty JSON object yields the stock configuration: one Big Buck Bunny asset,
//! the four remote commands and a 10-second skip interval.

use crate::error::{PlayerError, Result};
use crate::metadata::NowPlayableMetadata;
use bridge_traits::remote::RemoteCommandKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Asset used when no configuration is supplied.
pub const DEFAULT_ASSET_URL: &str =
    "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Title of [`DEFAULT_ASSET_URL`].
pub const DEFAULT_ASSET_TITLE: &str = "Big Buck Bunny";

/// An asset the session can play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationAsset {
    #[serde(flatten)]
    pub metadata: NowPlayableMetadata,

    /// Start playback as soon as the item is ready.
    ///
    /// Default: true.
    #[serde(default = "default_should_play")]
    pub should_play: bool,
}

impl ConfigurationAsset {
    pub fn new(metadata: NowPlayableMetadata) -> Self {
        Self {
            metadata,
            should_play: default_should_play(),
        }
    }

    pub fn with_should_play(mut self, should_play: bool) -> Self {
        self.should_play = should_play;
        self
    }
}

/// Playback session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfiguration {
    /// Assets to play. The session plays the first one.
    ///
    /// Default: Big Buck Bunny.
    #[serde(default = "default_assets")]
    pub assets: Vec<ConfigurationAsset>,

    /// Remote commands that get a target.
    ///
    /// Default: play, pause, skip backward, skip forward.
    #[serde(default = "default_commands")]
    pub commands: Vec<RemoteCommandKind>,

    /// Remote commands that stay registered but disabled.
    ///
    /// Default: none.
    #[serde(default)]
    pub disabled_commands: Vec<RemoteCommandKind>,

    /// Whether video may be routed to external displays.
    ///
    /// Default: true.
    #[serde(default = "default_allows_external_playback")]
    pub allows_external_playback: bool,

    /// Interval used by skip commands and skip buttons.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_skip_interval")]
    pub skip_interval: Duration,

    /// Cadence of position updates while playing.
    ///
    /// Default: 0.5 seconds.
    #[serde(default = "default_periodic_time_interval")]
    pub periodic_time_interval: Duration,

    /// Wait between session teardown and audio session deactivation, so the
    /// deactivation does not race the final pause.
    ///
    /// Default: 500 milliseconds.
    #[serde(default = "default_audio_session_teardown_delay")]
    pub audio_session_teardown_delay: Duration,
}

impl Default for PlayerConfiguration {
    fn default() -> Self {
        Self {
            assets: default_assets(),
            commands: default_commands(),
            disabled_commands: Vec::new(),
            allows_external_playback: default_allows_external_playback(),
            skip_interval: default_skip_interval(),
            periodic_time_interval: default_periodic_time_interval(),
            audio_session_teardown_delay: default_audio_session_teardown_delay(),
        }
    }
}

impl PlayerConfiguration {
    /// Default configuration playing `assets` instead of the stock asset.
    pub fn with_assets(assets: Vec<ConfigurationAsset>) -> Self {
        Self {
            assets,
            ..Default::default()
        }
    }

    /// Configuration for a single asset given by URL and title.
    pub fn for_url(url: &str, title: impl Into<String>) -> Result<Self> {
        let metadata = NowPlayableMetadata::parse(url, title)?;
        Ok(Self::with_assets(vec![ConfigurationAsset::new(metadata)]))
    }

    pub fn with_commands(mut self, commands: Vec<RemoteCommandKind>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_disabled_commands(mut self, disabled: Vec<RemoteCommandKind>) -> Self {
        self.disabled_commands = disabled;
        self
    }

    /// First asset, which is the one a session plays.
    pub fn first_asset(&self) -> Option<&ConfigurationAsset> {
        self.assets.first()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.skip_interval.is_zero() {
            return Err(PlayerError::InvalidConfiguration(
                "skip_interval must be > 0".to_string(),
            ));
        }

        if self.periodic_time_interval.is_zero() {
            return Err(PlayerError::InvalidConfiguration(
                "periodic_time_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_should_play() -> bool {
    true
}

fn default_assets() -> Vec<ConfigurationAsset> {
    match Url::parse(DEFAULT_ASSET_URL) {
        Ok(url) => vec![ConfigurationAsset::new(NowPlayableMetadata::new(
            url,
            DEFAULT_ASSET_TITLE,
        ))],
        Err(_) => Vec::new(),
    }
}

fn default_commands() -> Vec<RemoteCommandKind> {
    vec![
        RemoteCommandKind::Play,
        RemoteCommandKind::Pause,
        RemoteCommandKind::SkipBackward,
        RemoteCommandKind::SkipForward,
    ]
}

fn default_allows_external_playback() -> bool {
    true
}

fn default_skip_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_periodic_time_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_audio_session_teardown_delay() -> Duration {
    Duration::from_millis(500)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assets.len(), 1);

        let asset = config.first_asset().unwrap();
        assert_eq!(asset.metadata.title, "Big Buck Bunny");
        assert_eq!(asset.metadata.asset_url.as_str(), DEFAULT_ASSET_URL);
        assert!(asset.should_play);

        assert_eq!(
            config.commands,
            vec![
                RemoteCommandKind::Play,
                RemoteCommandKind::Pause,
                RemoteCommandKind::SkipBackward,
                RemoteCommandKind::SkipForward,
            ]
        );
        assert!(config.disabled_commands.is_empty());
        assert!(config.allows_external_playback);
        assert_eq!(config.skip_interval, Duration::from_secs(10));
        assert_eq!(config.audio_session_teardown_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: PlayerConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PlayerConfiguration::default());
    }

    #[test]
    fn test_asset_json_defaults_should_play() {
        let json = r#"{
            "assets": [{ "asset_url": "https://example.com/Sintel.mp4", "title": "Sintel" }],
            "commands": ["play", "skipForward"]
        }"#;
        let config: PlayerConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(config.assets[0].metadata.title, "Sintel");
        assert!(config.assets[0].should_play);
        assert_eq!(
            config.commands,
            vec![RemoteCommandKind::Play, RemoteCommandKind::SkipForward]
        );
    }

    #[test]
    fn test_asset_json_rejects_relative_url() {
        let json = r#"{ "assets": [{ "asset_url": "Sintel.mp4", "title": "Sintel" }] }"#;
        assert!(serde_json::from_str::<PlayerConfiguration>(json).is_err());
    }

    #[test]
    fn test_with_assets_keeps_default_commands() {
        let config = PlayerConfiguration::for_url("http://example.com/a.mp4", "A").unwrap();
        assert_eq!(config.commands, PlayerConfiguration::default().commands);
        assert_eq!(config.first_asset().unwrap().metadata.title, "A");
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let config = PlayerConfiguration {
            skip_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlayerError::InvalidConfiguration(_))
        ));

        let config = PlayerConfiguration {
            periodic_time_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
