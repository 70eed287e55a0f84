//! Video player bridge.
//!
//! The host owns the actual media player (decoding, buffering, external
//! output). The core drives it through [`VideoPlayerAdapter`] and learns about
//! asynchronous changes through [`PlayerObservation`]s pushed into an
//! [`ObservationSink`]. Hosts may push observations from any thread; the core
//! redispatches them onto its own UI task before touching session state.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Readiness of the currently loaded player item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    /// The item has not been loaded yet or is still being inspected.
    #[default]
    Unknown,
    /// The item can be played.
    ReadyToPlay,
    /// The item failed to load; `message` carries the host's reason.
    Failed { message: String },
}

impl ItemStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ItemStatus::ReadyToPlay)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemStatus::Failed { .. })
    }
}

/// Whether the player is currently advancing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeControlStatus {
    #[default]
    Paused,
    /// Playback was requested but the player is buffering.
    WaitingToPlayAtSpecifiedRate,
    Playing,
}

/// Point-in-time view of the host player.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerStatus {
    pub item_status: ItemStatus,
    pub time_control_status: TimeControlStatus,
    /// Current rate; `0.0` when paused, negative when playing in reverse.
    pub rate: f32,
    pub position: Duration,
    /// `None` until the item duration is known (or for live streams).
    pub duration: Option<Duration>,
    pub can_play_fast_forward: bool,
    pub can_play_reverse: bool,
}

impl PlayerStatus {
    /// Returns `true` when the playhead sits at (or past) the item's end.
    pub fn is_at_end(&self) -> bool {
        match self.duration {
            Some(duration) => self.position >= duration,
            None => false,
        }
    }
}

/// Asynchronous change reported by the host player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerObservation {
    ItemStatusChanged(ItemStatus),
    TimeControlStatusChanged(TimeControlStatus),
    RateChanged(f32),
    /// Emitted at the cadence requested in [`VideoPlayerAdapter::add_observer`].
    PeriodicTime(Duration),
    DurationChanged(Duration),
    CanPlayFastForwardChanged(bool),
    CanPlayReverseChanged(bool),
    /// The item reached its end; the host has already stopped advancing time.
    PlayedToEnd,
    /// Completion of a previously issued seek. `finished` is `false` when the
    /// seek was interrupted by another seek.
    SeekCompleted { finished: bool },
}

/// Channel the host pushes observations into.
pub type ObservationSink = mpsc::UnboundedSender<PlayerObservation>;

/// Handle returned by [`VideoPlayerAdapter::add_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

impl ObserverToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Item the host should load into its player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerItemRequest {
    /// Absolute URL of the asset.
    pub url: String,
    /// Display title, used by hosts that surface their own media UI.
    pub title: String,
}

impl PlayerItemRequest {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Trait for host adapters that wrap a platform media player.
///
/// Seeks are fire-and-forget: [`seek`](VideoPlayerAdapter::seek) returns as
/// soon as the request is issued and completion is reported through
/// [`PlayerObservation::SeekCompleted`].
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait VideoPlayerAdapter: PlatformSendSync {
    /// Replace the current item. Returns [`BridgeError::ItemRejected`] when
    /// the host refuses the asset outright (not playable).
    ///
    /// [`BridgeError::ItemRejected`]: crate::error::BridgeError::ItemRejected
    async fn load(&self, item: PlayerItemRequest) -> Result<()>;

    /// Start playback at rate 1.0.
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Set the playback rate. Non-zero rates start playback.
    async fn set_rate(&self, rate: f32) -> Result<()>;

    /// Request a seek to an absolute position. The host clamps positions past
    /// the end of the item.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Allow or forbid routing video to external displays.
    async fn set_allows_external_playback(&self, allowed: bool) -> Result<()>;

    /// Current player state.
    async fn status(&self) -> Result<PlayerStatus>;

    /// Start pushing observations into `sink`, with periodic time updates
    /// every `periodic_interval`.
    fn add_observer(&self, sink: ObservationSink, periodic_interval: Duration) -> ObserverToken;

    /// Stop pushing observations for `token`. Unknown tokens are ignored.
    fn remove_observer(&self, token: ObserverToken);

    /// Drop the current item and any host resources held for it.
    async fn release(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_status_at_end() {
        let mut status = PlayerStatus {
            position: Duration::from_secs(10),
            duration: Some(Duration::from_secs(10)),
            ..Default::default()
        };
        assert!(status.is_at_end());

        status.position = Duration::from_secs(9);
        assert!(!status.is_at_end());

        status.duration = None;
        assert!(!status.is_at_end());
    }

    #[test]
    fn test_item_status_predicates() {
        assert!(ItemStatus::ReadyToPlay.is_ready());
        assert!(!ItemStatus::Unknown.is_ready());
        assert!(ItemStatus::Failed {
            message: "404".into()
        }
        .is_failed());
    }

    #[test]
    fn test_observer_token_roundtrip() {
        let token = ObserverToken::new(7);
        assert_eq!(token.raw(), 7);
        assert_eq!(token, ObserverToken::new(7));
    }
}
