//! Control-view model.
//!
//! Pure mapping from a [`SessionSnapshot`] to what the on-screen controls
//! show. Rendering is left to the host UI.

use crate::controller::SessionSnapshot;
use crate::state::SessionState;
use bridge_traits::{ItemStatus, TimeControlStatus};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayPauseIcon {
    Play,
    Pause,
}

/// State of the transport controls for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlViewState {
    pub play_pause_icon: PlayPauseIcon,
    pub play_pause_enabled: bool,
    pub slider_enabled: bool,
    /// Seconds.
    pub slider_value: f64,
    /// Seconds; zero until the duration is known.
    pub slider_max: f64,
    pub elapsed_label: String,
    pub remaining_label: String,
    /// Skip forward / backward buttons.
    pub skip_enabled: bool,
    pub fast_forward_enabled: bool,
    pub reverse_enabled: bool,
}

impl ControlViewState {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let live = !matches!(snapshot.state, SessionState::Ended | SessionState::Failed);
        let ready = live && snapshot.item_status == ItemStatus::ReadyToPlay;

        let play_pause_icon = match snapshot.time_control_status {
            TimeControlStatus::Playing => PlayPauseIcon::Pause,
            TimeControlStatus::Paused | TimeControlStatus::WaitingToPlayAtSpecifiedRate => {
                PlayPauseIcon::Play
            }
        };

        let elapsed = snapshot.position.as_secs_f64();
        let duration = snapshot.duration.map_or(0.0, |d| d.as_secs_f64());
        let remaining = snapshot
            .duration
            .map_or(0.0, |d| d.saturating_sub(snapshot.position).as_secs_f64());

        Self {
            play_pause_icon,
            play_pause_enabled: live && !snapshot.item_status.is_failed(),
            slider_enabled: ready,
            slider_value: elapsed,
            slider_max: duration,
            elapsed_label: format_time_label(elapsed),
            remaining_label: format_time_label(remaining),
            skip_enabled: ready,
            fast_forward_enabled: ready && snapshot.can_play_fast_forward,
            reverse_enabled: ready && snapshot.can_play_reverse,
        }
    }

    /// Controls shown when there is no session: everything disabled.
    pub fn inactive() -> Self {
        Self::from_snapshot(&SessionSnapshot {
            state: SessionState::Ended,
            ..Default::default()
        })
    }

    /// Position selected by dragging the slider to `value` seconds.
    pub fn slider_position(&self, value: f64) -> Duration {
        let clamped = if value.is_finite() {
            value.clamp(0.0, self.slider_max.max(0.0))
        } else {
            0.0
        };
        Duration::try_from_secs_f64(clamped).unwrap_or_default()
    }
}

impl From<&SessionSnapshot> for ControlViewState {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

/// Format seconds as zero-padded `mm:ss`. Minutes are not wrapped into
/// hours; negative and non-finite inputs render as `00:00`.
pub fn format_time_label(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
