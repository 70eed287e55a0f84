//! # Remote Command Bridge
//!
//! Registers the session with the host's remote command center (headset
//! buttons, lock screen) and describes audio-session interruptions.
//!
//! ## Overview
//!
//! Every command in [`RemoteCommandKind::ALL`] is reconfigured on each call to
//! [`RemoteCommandBridge::configure`]: stale targets are removed, the handler
//! is added for requested commands, and the enabled flag is set from the
//! disabled list. A disabled command keeps its target; the host just stops
//! dispatching it.

use crate::error::{PlayerError, Result};
use bridge_traits::audio_session::InterruptionNotice;
use bridge_traits::remote::{RemoteCommandCenter, RemoteCommandHandler, RemoteCommandKind};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Interruption of the shared audio session, as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NowPlayableInterruption {
    Began,
    Ended { should_resume: bool },
    /// Reactivating the audio session after an interruption failed.
    Failed(String),
}

impl From<InterruptionNotice> for NowPlayableInterruption {
    fn from(notice: InterruptionNotice) -> Self {
        match notice {
            InterruptionNotice::Began => NowPlayableInterruption::Began,
            InterruptionNotice::Ended { should_resume } => {
                NowPlayableInterruption::Ended { should_resume }
            }
        }
    }
}

impl fmt::Display for NowPlayableInterruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NowPlayableInterruption::Began => f.write_str("began"),
            NowPlayableInterruption::Ended { should_resume } => {
                write!(f, "ended (should_resume: {should_resume})")
            }
            NowPlayableInterruption::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// Wires a command handler into a [`RemoteCommandCenter`].
#[derive(Clone)]
pub struct RemoteCommandBridge {
    center: Arc<dyn RemoteCommandCenter>,
    skip_interval: Duration,
}

impl RemoteCommandBridge {
    pub fn new(center: Arc<dyn RemoteCommandCenter>, skip_interval: Duration) -> Self {
        Self {
            center,
            skip_interval,
        }
    }

    pub fn skip_interval(&self) -> Duration {
        self.skip_interval
    }

    /// Register `handler` for `commands` and disable `disabled`.
    ///
    /// Fails with [`PlayerError::NoRegisteredCommands`] when `commands` is
    /// empty, without touching the center.
    pub fn configure(
        &self,
        commands: &[RemoteCommandKind],
        disabled: &[RemoteCommandKind],
        handler: RemoteCommandHandler,
    ) -> Result<()> {
        if commands.is_empty() {
            return Err(PlayerError::NoRegisteredCommands);
        }

        for command in RemoteCommandKind::ALL {
            self.center.remove_targets(command);

            if commands.contains(&command) {
                if command.is_skip() {
                    self.center
                        .set_preferred_intervals(command, &[self.skip_interval]);
                }
                self.center.add_target(command, Arc::clone(&handler));
            }

            self.center.set_enabled(command, !disabled.contains(&command));
        }

        debug!(?commands, ?disabled, "Configured remote commands");
        Ok(())
    }

    /// Remove every target registered by [`configure`](Self::configure).
    pub fn unregister_all(&self) {
        for command in RemoteCommandKind::ALL {
            self.center.remove_targets(command);
        }
    }
}

impl fmt::Debug for RemoteCommandBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCommandBridge")
            .field("skip_interval", &self.skip_interval)
            .finish_non_exhaustive()
    }
}
