//! "Now Playing" info center bridge (lock screen, control center).

use crate::platform::PlatformSendSync;
use serde::{Deserialize, Serialize};

/// Fields published to the host's now-playing surface.
///
/// Every field is optional so partial updates can be merged into what the
/// host already displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingInfo {
    #[serde(rename = "assetURL")]
    pub asset_url: Option<String>,
    pub title: Option<String>,
    /// Seconds.
    pub playback_duration: Option<f64>,
    /// Seconds.
    pub elapsed_playback_time: Option<f64>,
    pub playback_rate: Option<f64>,
    pub default_playback_rate: Option<f64>,
}

impl NowPlayingInfo {
    pub fn is_empty(&self) -> bool {
        *self == NowPlayingInfo::default()
    }
}

/// Host-wide now-playing info. There is exactly one per process, so the core
/// treats it as shared and only ever replaces or merges the whole value.
pub trait NowPlayingInfoCenter: PlatformSendSync {
    fn now_playing_info(&self) -> Option<NowPlayingInfo>;

    /// Replace the published info. `None` removes it from the system UI.
    fn set_now_playing_info(&self, info: Option<NowPlayingInfo>);
}
