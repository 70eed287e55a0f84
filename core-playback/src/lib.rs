//! # Playback Session Module
//!
//! Drives a host video player for one item at a time and keeps the system
//! media surfaces (remote commands, lock-screen info, audio session) in sync
//! with it.
//!
//! ## Overview
//!
//! This module handles:
//! - Player configuration (assets, remote commands, intervals)
//! - The session state machine and its controller
//! - A single-task session loop with a cloneable handle
//! - Remote command registration and interruption reporting
//! - Now-playing metadata publishing
//! - A pure control-view model for transport UIs
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackBridges, PlaybackSession, PlayerConfiguration, SessionCallbacks};
//!
//! let session = PlaybackSession::start(
//!     PlayerConfiguration::default(),
//!     PlaybackBridges::from(&core_config),
//!     event_bus.clone(),
//!     SessionCallbacks::new().on_periodic_time_update(|snapshot| {
//!         println!("at {:?}", snapshot.position);
//!     }),
//! )
//! .await?;
//!
//! session.play().await?;
//! session.skip_forward().await?;
//! session.end().await;
//! ```

pub mod config;
pub mod controller;
pub mod controls;
pub mod error;
pub mod metadata;
pub mod remote;
pub mod session;
pub mod state;

pub use config::{ConfigurationAsset, PlayerConfiguration};
pub use controller::{
    clamp_rate, PlaybackBridges, SessionAction, SessionCallbacks, SessionController,
    SessionSnapshot, MAX_RATE, MIN_RATE,
};
pub use controls::{format_time_label, ControlViewState, PlayPauseIcon};
pub use error::{PlayerError, Result};
pub use metadata::{NowPlayableDynamicMetadata, NowPlayableMetadata, NowPlayingPublisher};
pub use remote::{NowPlayableInterruption, RemoteCommandBridge};
pub use session::{PlaybackSession, SessionHandle};
pub use state::SessionState;
