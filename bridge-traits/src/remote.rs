//! Remote command center bridge (headset buttons, lock screen, control center).

use crate::platform::PlatformSendSync;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Closed set of remote commands the core knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoteCommandKind {
    Play,
    Pause,
    SkipForward,
    SkipBackward,
}

impl RemoteCommandKind {
    /// Every command, in registration order.
    pub const ALL: [RemoteCommandKind; 4] = [
        RemoteCommandKind::Play,
        RemoteCommandKind::Pause,
        RemoteCommandKind::SkipForward,
        RemoteCommandKind::SkipBackward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCommandKind::Play => "play",
            RemoteCommandKind::Pause => "pause",
            RemoteCommandKind::SkipForward => "skipForward",
            RemoteCommandKind::SkipBackward => "skipBackward",
        }
    }

    /// Skip commands advertise a preferred interval to the host UI.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            RemoteCommandKind::SkipForward | RemoteCommandKind::SkipBackward
        )
    }
}

impl fmt::Display for RemoteCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered by the host when a remote command fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCommandEvent {
    pub command: RemoteCommandKind,
    /// Interval carried by skip commands.
    pub interval: Option<Duration>,
}

impl RemoteCommandEvent {
    pub fn new(command: RemoteCommandKind) -> Self {
        Self {
            command,
            interval: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

/// Result reported back to the host for a handled command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommandStatus {
    Success,
    NoSuchContent,
    NoActionableNowPlayingItem,
    CommandFailed,
}

/// Target invoked by the host on its own execution context.
pub type RemoteCommandHandler =
    Arc<dyn Fn(RemoteCommandEvent) -> RemoteCommandStatus + Send + Sync>;

/// Host command center. Each command keeps its own target list and enabled
/// flag, independently of the others.
pub trait RemoteCommandCenter: PlatformSendSync {
    /// Remove every target registered for `command`.
    fn remove_targets(&self, command: RemoteCommandKind);

    fn add_target(&self, command: RemoteCommandKind, handler: RemoteCommandHandler);

    fn set_enabled(&self, command: RemoteCommandKind, enabled: bool);

    /// Intervals shown by the host for skip commands. Ignored for others.
    fn set_preferred_intervals(&self, command: RemoteCommandKind, intervals: &[Duration]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_match_wire_format() {
        for command in RemoteCommandKind::ALL {
            let json = serde_json::to_string(&command).unwrap();
            assert_eq!(json, format!("\"{}\"", command.as_str()));
        }
    }

    #[test]
    fn test_only_skip_commands_are_skip() {
        let skips: Vec<_> = RemoteCommandKind::ALL
            .into_iter()
            .filter(RemoteCommandKind::is_skip)
            .collect();
        assert_eq!(
            skips,
            vec![RemoteCommandKind::SkipForward, RemoteCommandKind::SkipBackward]
        );
    }

    #[test]
    fn test_event_builder_sets_interval() {
        let event = RemoteCommandEvent::new(RemoteCommandKind::SkipForward)
            .with_interval(Duration::from_secs(10));
        assert_eq!(event.interval, Some(Duration::from_secs(10)));
        assert_eq!(RemoteCommandEvent::new(RemoteCommandKind::Play).interval, None);
    }
}
