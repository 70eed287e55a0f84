//! Shared audio session bridge.
//!
//! The audio session is process-wide: activating it claims audio output,
//! deactivating it lets other apps resume. The host also reports
//! interruptions (phone calls, alarms) and route changes (headphones
//! unplugged, external display attached) through it.

use crate::{error::Result, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSessionCategory {
    Ambient,
    SoloAmbient,
    Playback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSessionMode {
    Default,
    MoviePlayback,
}

/// Interruption reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptionNotice {
    Began,
    Ended { should_resume: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteChangeReason {
    NewDeviceAvailable,
    OldDeviceUnavailable,
    CategoryChange,
    Override,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSessionNotification {
    Interruption(InterruptionNotice),
    RouteChange(RouteChangeReason),
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AudioSession: PlatformSendSync {
    async fn set_category(&self, category: AudioSessionCategory, mode: AudioSessionMode)
        -> Result<()>;

    async fn set_active(&self, active: bool) -> Result<()>;

    /// Subscribe to interruption and route-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AudioSessionNotification>;
}
