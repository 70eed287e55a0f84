//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the host's
//! media stack. The core never decodes, buffers or routes media itself; it
//! configures and observes host objects through these traits.
//!
//! ## Traits
//!
//! ### Media
//! - [`VideoPlayerAdapter`](player::VideoPlayerAdapter) - Platform video player (load, play, rate, seek, observe)
//! - [`AudioSession`](audio_session::AudioSession) - Process-wide audio session, interruptions and route changes
//!
//! ### System Integration
//! - [`RemoteCommandCenter`](remote::RemoteCommandCenter) - Headset / lock-screen command targets
//! - [`NowPlayingInfoCenter`](now_playing::NowPlayingInfoCenter) - Lock-screen "Now Playing" metadata
//! - [`ResourceBundle`](resources::ResourceBundle) - Files shipped with the app bundle
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop / headless | `bridge-desktop` | ✅ Simulated player |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All fallible bridge operations return [`BridgeError`](error::BridgeError).
//! Implementations should convert platform errors into it with actionable
//! messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` on native targets. Host callbacks
//! (observations, remote command targets) may run on any thread; the core
//! redispatches them onto the session's UI task.

pub mod audio_session;
pub mod error;
pub mod logging;
pub mod now_playing;
pub mod platform;
pub mod player;
pub mod remote;
pub mod resources;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio_session::{
    AudioSession, AudioSessionCategory, AudioSessionMode, AudioSessionNotification,
    InterruptionNotice, RouteChangeReason,
};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use now_playing::{NowPlayingInfo, NowPlayingInfoCenter};
pub use player::{
    ItemStatus, ObservationSink, ObserverToken, PlayerItemRequest, PlayerObservation,
    PlayerStatus, TimeControlStatus, VideoPlayerAdapter,
};
pub use remote::{
    RemoteCommandCenter, RemoteCommandEvent, RemoteCommandHandler, RemoteCommandKind,
    RemoteCommandStatus,
};
pub use resources::ResourceBundle;
