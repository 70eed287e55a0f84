//! # Now-Playing Metadata
//!
//! Mirrors the active session onto the host's lock-screen "Now Playing"
//! surface.
//!
//! ## Overview
//!
//! Metadata is split in two parts:
//! - [`NowPlayableMetadata`]: what is playing (asset URL and title). Published
//!   once per session and replaces whatever the host displayed before.
//! - [`NowPlayableDynamicMetadata`]: where playback is (rate, position,
//!   duration). Merged into the existing info on every rate or status change.
//!
//! Publishing is best-effort: the host center has no failure path.

use crate::error::{PlayerError, Result};
use bridge_traits::now_playing::{NowPlayingInfo, NowPlayingInfoCenter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default playback rate advertised with every dynamic update.
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Static description of the playing asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayableMetadata {
    pub asset_url: Url,
    pub title: String,
}

impl NowPlayableMetadata {
    pub fn new(asset_url: Url, title: impl Into<String>) -> Self {
        Self {
            asset_url,
            title: title.into(),
        }
    }

    /// Parse `url` as an absolute URL.
    pub fn parse(url: &str, title: impl Into<String>) -> Result<Self> {
        let asset_url = Url::parse(url).map_err(|e| PlayerError::InvalidAssetUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(asset_url, title))
    }
}

/// Playback progress mirrored to the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NowPlayableDynamicMetadata {
    pub rate: f32,
    pub position: Duration,
    pub duration: Option<Duration>,
}

/// Writes session metadata into the host [`NowPlayingInfoCenter`].
#[derive(Clone)]
pub struct NowPlayingPublisher {
    center: Arc<dyn NowPlayingInfoCenter>,
}

impl NowPlayingPublisher {
    pub fn new(center: Arc<dyn NowPlayingInfoCenter>) -> Self {
        Self { center }
    }

    /// Replace the host info with just the asset URL and title.
    pub fn publish(&self, metadata: &NowPlayableMetadata) {
        debug!(title = %metadata.title, "Publishing now-playing metadata");
        self.center.set_now_playing_info(Some(NowPlayingInfo {
            asset_url: Some(metadata.asset_url.to_string()),
            title: Some(metadata.title.clone()),
            ..Default::default()
        }));
    }

    /// Merge progress into the existing info, keeping every other field.
    pub fn publish_dynamic(&self, metadata: &NowPlayableDynamicMetadata) {
        let mut info = self.center.now_playing_info().unwrap_or_default();
        if let Some(duration) = metadata.duration {
            info.playback_duration = Some(duration.as_secs_f64());
        }
        info.elapsed_playback_time = Some(metadata.position.as_secs_f64());
        info.playback_rate = Some(f64::from(metadata.rate));
        info.default_playback_rate = Some(DEFAULT_PLAYBACK_RATE);
        self.center.set_now_playing_info(Some(info));
    }

    /// Remove the info from the host UI.
    pub fn clear(&self) {
        self.center.set_now_playing_info(None);
    }
}

impl std::fmt::Debug for NowPlayingPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NowPlayingPublisher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::InMemoryNowPlayingCenter;

    fn publisher() -> (NowPlayingPublisher, Arc<InMemoryNowPlayingCenter>) {
        let center = Arc::new(InMemoryNowPlayingCenter::new());
        (NowPlayingPublisher::new(center.clone()), center)
    }

    fn sintel() -> NowPlayableMetadata {
        NowPlayableMetadata::parse("http://example.com/Sintel.mp4", "Sintel").unwrap()
    }

    #[test]
    fn test_parse_rejects_relative_url() {
        let err = NowPlayableMetadata::parse("videos/Sintel.mp4", "Sintel").unwrap_err();
        assert!(matches!(err, PlayerError::InvalidAssetUrl { .. }));
    }

    #[test]
    fn test_publish_overwrites_previous_info() {
        let (publisher, center) = publisher();
        center.set_now_playing_info(Some(NowPlayingInfo {
            playback_rate: Some(2.0),
            ..Default::default()
        }));

        publisher.publish(&sintel());

        let info = center.now_playing_info().unwrap();
        assert_eq!(info.title.as_deref(), Some("Sintel"));
        assert_eq!(info.asset_url.as_deref(), Some("http://example.com/Sintel.mp4"));
        assert_eq!(info.playback_rate, None);
    }

    #[test]
    fn test_publish_dynamic_merges_and_sets_default_rate() {
        let (publisher, center) = publisher();
        publisher.publish(&sintel());

        publisher.publish_dynamic(&NowPlayableDynamicMetadata {
            rate: 2.0,
            position: Duration::from_secs(30),
            duration: Some(Duration::from_secs(888)),
        });

        let info = center.now_playing_info().unwrap();
        assert_eq!(info.title.as_deref(), Some("Sintel"));
        assert_eq!(info.playback_rate, Some(2.0));
        assert_eq!(info.elapsed_playback_time, Some(30.0));
        assert_eq!(info.playback_duration, Some(888.0));
        assert_eq!(info.default_playback_rate, Some(1.0));
    }

    #[test]
    fn test_publish_dynamic_keeps_known_duration() {
        let (publisher, center) = publisher();
        publisher.publish_dynamic(&NowPlayableDynamicMetadata {
            rate: 1.0,
            position: Duration::ZERO,
            duration: Some(Duration::from_secs(60)),
        });
        publisher.publish_dynamic(&NowPlayableDynamicMetadata {
            rate: 0.0,
            position: Duration::from_secs(5),
            duration: None,
        });

        let info = center.now_playing_info().unwrap();
        assert_eq!(info.playback_duration, Some(60.0));
        assert_eq!(info.playback_rate, Some(0.0));
    }

    #[test]
    fn test_clear_removes_info() {
        let (publisher, center) = publisher();
        publisher.publish(&sintel());
        publisher.clear();
        assert!(center.now_playing_info().is_none());
    }
}
