//! Session state machine.
//!
//! ```text
//! Idle ─> Loading ─> Ready <─> Playing <─> Paused
//!            │         │          │          │
//!            └─────────┴──> Failed <─────────┘
//!
//! every non-terminal state ─> Ended
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Failed,
    /// Terminal.
    Ended,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Failed => "failed",
            SessionState::Ended => "ended",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended)
    }

    /// Whether the item has loaded and can take transport commands.
    pub fn is_playable(&self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::Playing | SessionState::Paused
        )
    }

    /// Returns `true` if the machine has an edge from `self` to `next`.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        match (self, next) {
            (Ended, _) => false,
            (_, Ended) => true,
            (Idle, Loading) => true,
            (Loading, Ready) | (Loading, Failed) => true,
            (Ready, Playing) => true,
            (Playing, Ready) | (Playing, Paused) => true,
            (Paused, Playing) => true,
            (Ready | Playing | Paused, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
