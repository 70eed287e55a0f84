//! # Playback Session
//!
//! Runs a [`SessionController`] on its own task and hands out a cloneable
//! [`SessionHandle`].
//!
//! ## Overview
//!
//! ```text
//! SessionHandle ──commands (mpsc)──────┐
//! remote targets ──commands (mpsc)─────┤
//! host player ──observations (mpsc)────┼──> session task ──> SessionController
//! audio session ──notifications (bcast)┘
//! ```
//!
//! The task processes one message at a time, so UI hooks never run
//! concurrently and the controller needs no locks. Observations are drained
//! before commands so a command always sees the latest player state.
//!
//! The task exits when the session is ended, either explicitly through
//! [`SessionHandle::end`] or because every handle was dropped. After that,
//! handle calls are no-ops.

use crate::config::PlayerConfiguration;
use crate::controller::{
    PlaybackBridges, SessionAction, SessionCallbacks, SessionController, SessionSnapshot,
};
use crate::error::Result;
use crate::state::SessionState;
use bridge_traits::{
    AudioSessionNotification, PlayerObservation, RemoteCommandEvent, RemoteCommandHandler,
    RemoteCommandStatus,
};
use core_runtime::events::{EventBus, EventStream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Commands buffered per session before remote targets report failure.
const COMMAND_BUFFER: usize = 32;

enum SessionCommand {
    Perform(SessionAction, oneshot::Sender<Result<()>>),
    Remote(RemoteCommandEvent),
    End(oneshot::Sender<Option<JoinHandle<()>>>),
}

/// Entry point for starting playback sessions.
pub struct PlaybackSession;

impl PlaybackSession {
    /// Configure the host for `config`'s first asset and start the session task.
    ///
    /// # Errors
    ///
    /// - [`NoAssetFound`](crate::PlayerError::NoAssetFound) if `config` has no assets
    /// - [`CannotSetCategory`](crate::PlayerError::CannotSetCategory) /
    ///   [`CannotActivateSession`](crate::PlayerError::CannotActivateSession)
    ///   if the audio session refuses playback
    /// - [`NoRegisteredCommands`](crate::PlayerError::NoRegisteredCommands) if
    ///   `config.commands` is empty
    /// - [`NotPlayable`](crate::PlayerError::NotPlayable) if the player rejects the asset
    ///
    /// Whatever was configured before the failure is torn down again.
    #[instrument(skip(config, bridges, events, callbacks))]
    pub async fn start(
        config: PlayerConfiguration,
        bridges: PlaybackBridges,
        events: EventBus,
        callbacks: SessionCallbacks,
    ) -> Result<SessionHandle> {
        let session_id = Uuid::new_v4();
        let audio_notifications = bridges.audio_session.subscribe();
        let bus = events.clone();
        let mut controller = SessionController::new(session_id, config, bridges, events, callbacks)?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (observation_tx, observation_rx) = mpsc::unbounded_channel();
        let handler = remote_handler(command_tx.downgrade());

        if let Err(e) = controller.start(observation_tx, handler).await {
            error!(%session_id, error = %e, "Failed to start playback session");
            controller.end().await;
            return Err(e);
        }

        let handle = SessionHandle {
            session_id,
            skip_interval: controller.skip_interval(),
            commands: command_tx,
            snapshots: controller.subscribe(),
            events: bus,
        };

        tokio::spawn(run(controller, command_rx, observation_rx, audio_notifications));
        info!(%session_id, "Playback session started");
        Ok(handle)
    }
}

/// Remote targets only hold a weak sender, so registered targets do not keep
/// an abandoned session alive.
fn remote_handler(commands: mpsc::WeakSender<SessionCommand>) -> RemoteCommandHandler {
    Arc::new(move |event| {
        let Some(commands) = commands.upgrade() else {
            return RemoteCommandStatus::NoActionableNowPlayingItem;
        };
        match commands.try_send(SessionCommand::Remote(event)) {
            Ok(()) => RemoteCommandStatus::Success,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                RemoteCommandStatus::NoActionableNowPlayingItem
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(command = %event.command, "Session command queue full");
                RemoteCommandStatus::CommandFailed
            }
        }
    })
}

async fn run(
    mut controller: SessionController,
    mut commands: mpsc::Receiver<SessionCommand>,
    mut observations: mpsc::UnboundedReceiver<PlayerObservation>,
    mut notifications: broadcast::Receiver<AudioSessionNotification>,
) {
    let mut notifications_open = true;

    loop {
        tokio::select! {
            biased;

            Some(observation) = observations.recv() => {
                controller.handle_observation(observation).await;
            }

            notification = notifications.recv(), if notifications_open => match notification {
                Ok(notification) => controller.handle_audio_notification(notification).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "Dropped audio session notifications");
                }
                Err(broadcast::error::RecvError::Closed) => notifications_open = false,
            },

            command = commands.recv() => match command {
                Some(SessionCommand::Perform(action, reply)) => {
                    let result = controller.perform(action).await;
                    // The caller may have stopped waiting.
                    let _ = reply.send(result);
                }
                Some(SessionCommand::Remote(event)) => {
                    // Failures are logged and surfaced as events by the controller.
                    let _ = controller.handle_remote(event).await;
                }
                Some(SessionCommand::End(reply)) => {
                    let deactivation = controller.end().await;
                    let _ = reply.send(deactivation);
                    break;
                }
                None => {
                    debug!("All session handles dropped");
                    controller.end().await;
                    break;
                }
            },
        }
    }

    debug!(session_id = %controller.session_id(), "Session task finished");
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable handle to a running session.
///
/// Every method is a no-op returning `Ok(())` once the session has ended.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    skip_interval: Duration,
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: EventBus,
}

impl SessionHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn skip_interval(&self) -> Duration {
        self.skip_interval
    }

    /// Latest snapshot published by the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Events emitted by this session only. Catalog events and other
    /// sessions' events are skipped.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.events.subscribe()).for_session(self.session_id.to_string())
    }

    pub fn is_ended(&self) -> bool {
        self.snapshots.borrow().state == SessionState::Ended || self.commands.is_closed()
    }

    /// Toggle play/pause.
    pub async fn play(&self) -> Result<()> {
        self.perform(SessionAction::Play).await
    }

    /// Play at rate 1.0 without toggling.
    pub async fn resume(&self) -> Result<()> {
        self.perform(SessionAction::Resume).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.perform(SessionAction::Pause).await
    }

    /// Seek relative to the current position, in seconds.
    pub async fn seek_by(&self, offset_secs: f64) -> Result<()> {
        self.perform(SessionAction::SeekBy(offset_secs)).await
    }

    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        self.perform(SessionAction::SeekTo(position)).await
    }

    pub async fn skip_forward(&self) -> Result<()> {
        self.perform(SessionAction::SkipForward).await
    }

    pub async fn skip_backward(&self) -> Result<()> {
        self.perform(SessionAction::SkipBackward).await
    }

    /// Add `delta` to the current rate, clamped to [-2, 2].
    pub async fn set_rate(&self, delta: f32) -> Result<()> {
        self.perform(SessionAction::SetRate(delta)).await
    }

    pub async fn fast_forward(&self) -> Result<()> {
        self.perform(SessionAction::FastForward).await
    }

    pub async fn reverse(&self) -> Result<()> {
        self.perform(SessionAction::Reverse).await
    }

    pub async fn perform(&self, action: SessionAction) -> Result<()> {
        let (reply, response) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::Perform(action, reply))
            .await
            .is_err()
        {
            debug!(?action, "Session ended; ignoring action");
            return Ok(());
        }
        response.await.unwrap_or(Ok(()))
    }

    /// End the session and wait until teardown has run. Audio session
    /// deactivation follows after the configured delay.
    pub async fn end(&self) {
        self.end_deferred().await;
    }

    /// Like [`end`](Self::end), but also waits for the audio session to be
    /// deactivated. Use before starting another session on the same host.
    pub async fn end_and_wait(&self) {
        if let Some(deactivation) = self.end_deferred().await {
            if let Err(e) = deactivation.await {
                warn!(error = %e, "Audio session deactivation task failed");
            }
        }
    }

    /// Like [`end`](Self::end), but hands back the pending audio session
    /// deactivation instead of detaching it. `None` if the session had
    /// already ended.
    pub async fn end_deferred(&self) -> Option<JoinHandle<()>> {
        let (reply, done) = oneshot::channel();
        if self.commands.send(SessionCommand::End(reply)).await.is_err() {
            return None;
        }
        done.await.ok().flatten()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("state", &self.snapshots.borrow().state)
            .finish()
    }
}
