//! # Desktop Bridge Implementations
//!
//! Default implementations of the host bridge traits for desktop and
//! headless builds (macOS, Windows, Linux, CI).
//!
//! ## Overview
//!
//! Desktop platforms have no lock screen, remote command center or audio
//! session arbitration, so this crate provides in-process stand-ins that keep
//! the core fully functional:
//! - `VideoPlayerAdapter` as [`SimulatedVideoPlayer`], a virtual playhead on the tokio clock
//! - `RemoteCommandCenter` as [`InMemoryRemoteCommandCenter`]
//! - `NowPlayingInfoCenter` as [`InMemoryNowPlayingCenter`]
//! - `AudioSession` as [`DesktopAudioSession`]
//! - `ResourceBundle` as [`DirectoryBundle`], resolving files in a directory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DirectoryBundle, SimulatedVideoPlayer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let player = Arc::new(SimulatedVideoPlayer::new());
//!     let bundle = Arc::new(DirectoryBundle::new("resources"));
//!
//!     // Use in core configuration
//! }
//! ```

mod audio_session;
mod bundle;
mod now_playing;
mod player;
mod remote;

pub use audio_session::DesktopAudioSession;
pub use bundle::DirectoryBundle;
pub use now_playing::InMemoryNowPlayingCenter;
pub use player::{SimulatedPlayerOptions, SimulatedVideoPlayer};
pub use remote::InMemoryRemoteCommandCenter;
