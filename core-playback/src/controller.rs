//! # Session Controller
//!
//! Drives the host player for one playback session.
//!
//! ## Overview
//!
//! The controller owns everything a session touches:
//! - the host [`VideoPlayerAdapter`] and the observer registered on it
//! - the shared [`AudioSession`] (category, activation, deactivation)
//! - remote command registration through [`RemoteCommandBridge`]
//! - the lock-screen info through [`NowPlayingPublisher`]
//! - a [`SessionSnapshot`] mirrored to UI hooks and a `watch` channel
//!
//! It is not shared between tasks. [`PlaybackSession`](crate::session::PlaybackSession)
//! moves it into a single task that feeds it commands, player observations
//! and audio-session notifications one at a time, so none of its state needs
//! a lock.
//!
//! ## Transport Semantics
//!
//! - `Play` toggles: it pauses when already playing at rate 1.0, otherwise it
//!   plays at rate 1.0, rewinding to zero first when the playhead is at the end.
//! - `Resume` (remote play) always plays and never toggles.
//! - `SetRate(delta)` adds `delta` to the current rate and clamps the result
//!   to [`MIN_RATE`]..=[`MAX_RATE`].
//! - `SeekBy(offset)` saturates at zero; the player clamps past the end.
//! - Commands issued before the item is ready are deferred (play) or cancel
//!   the deferred play (pause); seek and rate commands are ignored.

use crate::config::{ConfigurationAsset, PlayerConfiguration};
use crate::error::{PlayerError, Result};
use crate::metadata::{NowPlayableDynamicMetadata, NowPlayingPublisher};
use crate::remote::{NowPlayableInterruption, RemoteCommandBridge};
use crate::state::SessionState;
use bridge_traits::{
    AudioSession, AudioSessionCategory, AudioSessionMode, AudioSessionNotification, BridgeError,
    InterruptionNotice, ItemStatus, NowPlayingInfoCenter, ObservationSink, ObserverToken,
    PlayerItemRequest, PlayerObservation, PlayerStatus, RemoteCommandCenter, RemoteCommandEvent,
    RemoteCommandHandler, RemoteCommandKind, TimeControlStatus, VideoPlayerAdapter,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_runtime::logging::redact_url;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Fastest forward rate.
pub const MAX_RATE: f32 = 2.0;

/// Fastest reverse rate.
pub const MIN_RATE: f32 = -2.0;

/// Rate change applied by fast-forward and reverse.
pub const RATE_STEP: f32 = 2.0;

/// Clamp `rate` to the supported range. NaN becomes 0 (paused).
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(MIN_RATE, MAX_RATE)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// UI-observable view of a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub item_status: ItemStatus,
    pub time_control_status: TimeControlStatus,
    pub rate: f32,
    pub position: Duration,
    /// `None` until the item reports its duration.
    pub duration: Option<Duration>,
    pub can_play_fast_forward: bool,
    pub can_play_reverse: bool,
}

impl SessionSnapshot {
    pub fn is_at_end(&self) -> bool {
        matches!(self.duration, Some(duration) if self.position >= duration)
    }

    pub fn dynamic_metadata(&self) -> NowPlayableDynamicMetadata {
        NowPlayableDynamicMetadata {
            rate: self.rate,
            position: self.position,
            duration: self.duration,
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Transport command understood by the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionAction {
    /// Play/pause toggle.
    Play,
    /// Play at rate 1.0 without toggling.
    Resume,
    Pause,
    /// Relative seek in seconds; negative values seek backwards.
    SeekBy(f64),
    SeekTo(Duration),
    SkipForward,
    SkipBackward,
    /// Rate delta.
    SetRate(f32),
    FastForward,
    Reverse,
}

impl SessionAction {
    /// Map a remote command onto a session action. Skip commands use the
    /// interval carried by the event, falling back to `skip_interval`.
    pub fn from_remote(event: RemoteCommandEvent, skip_interval: Duration) -> Self {
        let interval = event.interval.unwrap_or(skip_interval).as_secs_f64();
        match event.command {
            RemoteCommandKind::Play => SessionAction::Resume,
            RemoteCommandKind::Pause => SessionAction::Pause,
            RemoteCommandKind::SkipForward => SessionAction::SeekBy(interval),
            RemoteCommandKind::SkipBackward => SessionAction::SeekBy(-interval),
        }
    }
}

// ============================================================================
// Callbacks
// ============================================================================

pub type SnapshotHook = Box<dyn FnMut(&SessionSnapshot) + Send>;
pub type StateChangeHook = Box<dyn FnMut(SessionState, &SessionSnapshot) + Send>;
pub type InterruptionHook = Box<dyn FnMut(&NowPlayableInterruption, &SessionSnapshot) + Send>;

/// UI hooks fired from the session task. Hooks never run concurrently.
#[derive(Default)]
pub struct SessionCallbacks {
    status_update: Option<SnapshotHook>,
    time_control_status_update: Option<SnapshotHook>,
    periodic_time_update: Option<SnapshotHook>,
    fast_forward_update: Option<SnapshotHook>,
    reverse_update: Option<SnapshotHook>,
    state_change: Option<StateChangeHook>,
    interruption: Option<InterruptionHook>,
}

impl SessionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Item status changed (unknown, ready, failed).
    pub fn on_status_update(mut self, hook: impl FnMut(&SessionSnapshot) + Send + 'static) -> Self {
        self.status_update = Some(Box::new(hook));
        self
    }

    /// Playing, paused or waiting.
    pub fn on_time_control_status_update(
        mut self,
        hook: impl FnMut(&SessionSnapshot) + Send + 'static,
    ) -> Self {
        self.time_control_status_update = Some(Box::new(hook));
        self
    }

    /// Position moved (periodic tick, seek or end of item).
    pub fn on_periodic_time_update(
        mut self,
        hook: impl FnMut(&SessionSnapshot) + Send + 'static,
    ) -> Self {
        self.periodic_time_update = Some(Box::new(hook));
        self
    }

    pub fn on_fast_forward_update(
        mut self,
        hook: impl FnMut(&SessionSnapshot) + Send + 'static,
    ) -> Self {
        self.fast_forward_update = Some(Box::new(hook));
        self
    }

    pub fn on_reverse_update(mut self, hook: impl FnMut(&SessionSnapshot) + Send + 'static) -> Self {
        self.reverse_update = Some(Box::new(hook));
        self
    }

    /// Session state changed; receives the previous state.
    pub fn on_state_change(
        mut self,
        hook: impl FnMut(SessionState, &SessionSnapshot) + Send + 'static,
    ) -> Self {
        self.state_change = Some(Box::new(hook));
        self
    }

    pub fn on_interruption(
        mut self,
        hook: impl FnMut(&NowPlayableInterruption, &SessionSnapshot) + Send + 'static,
    ) -> Self {
        self.interruption = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCallbacks")
            .field("status_update", &self.status_update.is_some())
            .field(
                "time_control_status_update",
                &self.time_control_status_update.is_some(),
            )
            .field("periodic_time_update", &self.periodic_time_update.is_some())
            .field("fast_forward_update", &self.fast_forward_update.is_some())
            .field("reverse_update", &self.reverse_update.is_some())
            .field("state_change", &self.state_change.is_some())
            .field("interruption", &self.interruption.is_some())
            .finish()
    }
}

fn fire(hook: &mut Option<SnapshotHook>, snapshot: &SessionSnapshot) {
    if let Some(hook) = hook.as_mut() {
        hook(snapshot);
    }
}

// ============================================================================
// Bridges
// ============================================================================

/// Host objects a session drives.
#[derive(Clone)]
pub struct PlaybackBridges {
    pub player: Arc<dyn VideoPlayerAdapter>,
    pub remote_commands: Arc<dyn RemoteCommandCenter>,
    pub now_playing: Arc<dyn NowPlayingInfoCenter>,
    pub audio_session: Arc<dyn AudioSession>,
}

impl From<&CoreConfig> for PlaybackBridges {
    fn from(config: &CoreConfig) -> Self {
        Self {
            player: Arc::clone(&config.player),
            remote_commands: Arc::clone(&config.remote_commands),
            now_playing: Arc::clone(&config.now_playing),
            audio_session: Arc::clone(&config.audio_session),
        }
    }
}

impl fmt::Debug for PlaybackBridges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackBridges").finish_non_exhaustive()
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct SessionController {
    session_id: Uuid,
    config: PlayerConfiguration,
    asset: ConfigurationAsset,
    player: Arc<dyn VideoPlayerAdapter>,
    audio_session: Arc<dyn AudioSession>,
    remote: RemoteCommandBridge,
    publisher: NowPlayingPublisher,
    events: EventBus,
    callbacks: SessionCallbacks,
    snapshot: SessionSnapshot,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    observer: Option<ObserverToken>,
    /// Play once the item becomes ready.
    autoplay: bool,
}

impl SessionController {
    /// Create a controller for the first asset of `config`.
    ///
    /// Fails with [`PlayerError::NoAssetFound`] when the configuration has no
    /// assets. Nothing is touched on the host until [`start`](Self::start).
    pub fn new(
        session_id: Uuid,
        config: PlayerConfiguration,
        bridges: PlaybackBridges,
        events: EventBus,
        callbacks: SessionCallbacks,
    ) -> Result<Self> {
        config.validate()?;
        let asset = config
            .first_asset()
            .cloned()
            .ok_or(PlayerError::NoAssetFound)?;
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());

        Ok(Self {
            session_id,
            remote: RemoteCommandBridge::new(bridges.remote_commands, config.skip_interval),
            publisher: NowPlayingPublisher::new(bridges.now_playing),
            player: bridges.player,
            audio_session: bridges.audio_session,
            config,
            asset,
            events,
            callbacks,
            snapshot: SessionSnapshot::default(),
            snapshot_tx,
            observer: None,
            autoplay: false,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Receiver that sees every snapshot the controller publishes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn asset(&self) -> &ConfigurationAsset {
        &self.asset
    }

    pub fn skip_interval(&self) -> Duration {
        self.config.skip_interval
    }

    /// Configure the host for playback and load the item.
    ///
    /// Observations are pushed into `sink`; remote commands go to `handler`.
    /// On error the caller is expected to [`end`](Self::end) the controller to
    /// undo whatever was already configured.
    pub async fn start(&mut self, sink: ObservationSink, handler: RemoteCommandHandler) -> Result<()> {
        let metadata = self.asset.metadata.clone();
        info!(
            session_id = %self.session_id,
            title = %metadata.title,
            url = %redact_url(&metadata.asset_url),
            "Starting playback session"
        );

        self.transition(SessionState::Loading);
        self.emit(PlaybackEvent::SessionStarted {
            session_id: self.id(),
            title: metadata.title.clone(),
            asset_url: metadata.asset_url.to_string(),
        });

        self.player
            .set_allows_external_playback(self.config.allows_external_playback)
            .await?;

        self.audio_session
            .set_category(AudioSessionCategory::Playback, AudioSessionMode::MoviePlayback)
            .await
            .map_err(|e| PlayerError::CannotSetCategory(e.to_string()))?;
        self.audio_session
            .set_active(true)
            .await
            .map_err(|e| PlayerError::CannotActivateSession(e.to_string()))?;

        self.remote.configure(
            &self.config.commands,
            &self.config.disabled_commands,
            handler,
        )?;
        self.publisher.publish(&metadata);

        self.observer = Some(
            self.player
                .add_observer(sink, self.config.periodic_time_interval),
        );

        let request = PlayerItemRequest::new(metadata.asset_url.as_str(), metadata.title.as_str());
        if let Err(e) = self.player.load(request).await {
            let err = match e {
                BridgeError::ItemRejected(reason) => PlayerError::NotPlayable(reason),
                other => PlayerError::Bridge(other),
            };
            self.fail(err.to_string());
            return Err(err);
        }

        self.autoplay = self.asset.should_play;
        self.notify();
        Ok(())
    }

    /// Run a transport command. A no-op once the session has ended.
    pub async fn perform(&mut self, action: SessionAction) -> Result<()> {
        if self.snapshot.state.is_terminal() {
            debug!(?action, "Session ended; ignoring action");
            return Ok(());
        }

        debug!(?action, state = %self.snapshot.state, "Performing session action");
        let skip = self.config.skip_interval.as_secs_f64();
        match action {
            SessionAction::Play => self.toggle_play().await,
            SessionAction::Resume => self.resume().await,
            SessionAction::Pause => self.pause().await,
            SessionAction::SeekBy(offset) => self.seek_by(offset).await,
            SessionAction::SeekTo(position) => self.seek_to(position).await,
            SessionAction::SkipForward => self.seek_by(skip).await,
            SessionAction::SkipBackward => self.seek_by(-skip).await,
            SessionAction::SetRate(delta) => self.change_rate(delta).await,
            SessionAction::FastForward => self.fast_forward().await,
            SessionAction::Reverse => self.reverse().await,
        }
    }

    /// Handle a command fired by the host's remote command center.
    pub async fn handle_remote(&mut self, event: RemoteCommandEvent) -> Result<()> {
        let action = SessionAction::from_remote(event, self.config.skip_interval);
        let result = self.perform(action).await;
        if let Err(e) = &result {
            warn!(command = %event.command, error = %e, "Remote command failed");
        }
        self.emit(PlaybackEvent::RemoteCommand {
            session_id: self.id(),
            command: event.command.to_string(),
            handled: result.is_ok(),
        });
        result
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// `Ok(true)` when the item is loaded, `Ok(false)` while it is still
    /// loading, and an error once it has failed.
    fn ensure_loaded(&self) -> Result<bool> {
        match self.snapshot.state {
            SessionState::Ready | SessionState::Playing | SessionState::Paused => Ok(true),
            SessionState::Failed => Err(PlayerError::Failed(self.failure_message())),
            _ => Ok(false),
        }
    }

    fn failure_message(&self) -> String {
        match &self.snapshot.item_status {
            ItemStatus::Failed { message } => message.clone(),
            _ => "item failed".to_string(),
        }
    }

    async fn toggle_play(&mut self) -> Result<()> {
        if !self.ensure_loaded()? {
            self.autoplay = true;
            return Ok(());
        }

        let status = self.player.status().await?;
        match status.time_control_status {
            TimeControlStatus::Playing if status.rate == 1.0 => self.player.pause().await?,
            TimeControlStatus::WaitingToPlayAtSpecifiedRate => self.player.pause().await?,
            _ => self.play_from(&status).await?,
        }
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        if !self.ensure_loaded()? {
            self.autoplay = true;
            return Ok(());
        }
        let status = self.player.status().await?;
        self.play_from(&status).await
    }

    async fn play_from(&mut self, status: &PlayerStatus) -> Result<()> {
        if status.is_at_end() {
            debug!("At end of item; rewinding before play");
            self.player.seek(Duration::ZERO).await?;
        }
        self.player.play().await?;
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        if !self.ensure_loaded()? {
            self.autoplay = false;
            return Ok(());
        }
        self.player.pause().await?;
        Ok(())
    }

    async fn seek_by(&mut self, offset: f64) -> Result<()> {
        if !offset.is_finite() {
            return Err(PlayerError::InvalidSeekOffset(offset));
        }
        if !self.ensure_loaded()? {
            return Ok(());
        }

        let status = self.player.status().await?;
        let target = (status.position.as_secs_f64() + offset).max(0.0);
        let target =
            Duration::try_from_secs_f64(target).map_err(|_| PlayerError::InvalidSeekOffset(offset))?;
        self.player.seek(target).await?;
        Ok(())
    }

    async fn seek_to(&mut self, position: Duration) -> Result<()> {
        if !self.ensure_loaded()? {
            return Ok(());
        }
        self.player.seek(position).await?;
        Ok(())
    }

    async fn change_rate(&mut self, delta: f32) -> Result<()> {
        if !self.ensure_loaded()? {
            return Ok(());
        }
        let status = self.player.status().await?;
        self.player.set_rate(clamp_rate(status.rate + delta)).await?;
        Ok(())
    }

    async fn fast_forward(&mut self) -> Result<()> {
        if !self.ensure_loaded()? {
            return Ok(());
        }
        let status = self.player.status().await?;
        if !status.can_play_fast_forward {
            debug!("Item cannot play fast forward");
            return Ok(());
        }
        if status.is_at_end() {
            self.player.seek(Duration::ZERO).await?;
        }
        self.player
            .set_rate(clamp_rate(status.rate + RATE_STEP))
            .await?;
        Ok(())
    }

    async fn reverse(&mut self) -> Result<()> {
        if !self.ensure_loaded()? {
            return Ok(());
        }
        let status = self.player.status().await?;
        if !status.can_play_reverse {
            debug!("Item cannot play reverse");
            return Ok(());
        }
        if status.position.is_zero() {
            if let Some(duration) = status.duration {
                self.player.seek(duration).await?;
            }
        }
        self.player
            .set_rate(clamp_rate(status.rate - RATE_STEP))
            .await?;
        Ok(())
    }

    // ========================================================================
    // Observations
    // ========================================================================

    /// Fold a host player observation into the session.
    pub async fn handle_observation(&mut self, observation: PlayerObservation) {
        if self.snapshot.state.is_terminal() {
            return;
        }

        match observation {
            PlayerObservation::ItemStatusChanged(status) => {
                self.snapshot.item_status = status.clone();
                match status {
                    ItemStatus::ReadyToPlay => {
                        self.transition(SessionState::Ready);
                        if self.autoplay {
                            self.autoplay = false;
                            if let Err(e) = self.resume().await {
                                warn!(error = %e, "Autoplay failed");
                            }
                        }
                    }
                    ItemStatus::Failed { message } => self.fail(message),
                    ItemStatus::Unknown => {}
                }
                fire(&mut self.callbacks.status_update, &self.snapshot);
                self.publish_dynamic();
            }
            PlayerObservation::TimeControlStatusChanged(status) => {
                self.snapshot.time_control_status = status;
                let position_ms = millis(self.snapshot.position);
                match status {
                    TimeControlStatus::Playing => {
                        if self.transition(SessionState::Playing) {
                            self.emit(PlaybackEvent::Resumed {
                                session_id: self.id(),
                                position_ms,
                            });
                        }
                    }
                    TimeControlStatus::Paused => {
                        if self.transition(SessionState::Paused) {
                            self.emit(PlaybackEvent::Paused {
                                session_id: self.id(),
                                position_ms,
                            });
                        }
                    }
                    TimeControlStatus::WaitingToPlayAtSpecifiedRate => {
                        debug!("Player is waiting to play");
                    }
                }
                fire(&mut self.callbacks.time_control_status_update, &self.snapshot);
                self.publish_dynamic();
            }
            PlayerObservation::RateChanged(rate) => {
                self.snapshot.rate = rate;
                self.emit(PlaybackEvent::RateChanged {
                    session_id: self.id(),
                    rate,
                });
                fire(&mut self.callbacks.time_control_status_update, &self.snapshot);
                self.publish_dynamic();
            }
            PlayerObservation::PeriodicTime(position) => {
                self.snapshot.position = position;
                self.emit_position();
                fire(&mut self.callbacks.periodic_time_update, &self.snapshot);
            }
            PlayerObservation::DurationChanged(duration) => {
                self.snapshot.duration = Some(duration);
                self.publish_dynamic();
            }
            PlayerObservation::CanPlayFastForwardChanged(can) => {
                self.snapshot.can_play_fast_forward = can;
                fire(&mut self.callbacks.fast_forward_update, &self.snapshot);
            }
            PlayerObservation::CanPlayReverseChanged(can) => {
                self.snapshot.can_play_reverse = can;
                fire(&mut self.callbacks.reverse_update, &self.snapshot);
            }
            PlayerObservation::PlayedToEnd => {
                if let Some(duration) = self.snapshot.duration {
                    self.snapshot.position = duration;
                }
                self.snapshot.rate = 0.0;
                self.transition(SessionState::Paused);
                info!(session_id = %self.session_id, "Item played to end");
                self.emit(PlaybackEvent::Completed {
                    session_id: self.id(),
                });
                fire(&mut self.callbacks.periodic_time_update, &self.snapshot);
                self.publish_dynamic();
            }
            PlayerObservation::SeekCompleted { finished } => {
                if finished {
                    self.publish_dynamic();
                } else {
                    debug!("Seek interrupted by a later seek");
                }
            }
        }

        self.notify();
    }

    /// React to an interruption or route change of the shared audio session.
    ///
    /// Playback is neither paused nor resumed here; the interruption hook
    /// decides. The session is only reactivated when an interruption ends.
    pub async fn handle_audio_notification(&mut self, notification: AudioSessionNotification) {
        if self.snapshot.state.is_terminal() {
            return;
        }

        match notification {
            AudioSessionNotification::Interruption(notice) => {
                let mut interruption = NowPlayableInterruption::from(notice);
                let should_resume = match notice {
                    InterruptionNotice::Began => {
                        warn!(session_id = %self.session_id, "Audio session interrupted");
                        None
                    }
                    InterruptionNotice::Ended { should_resume } => {
                        info!(should_resume, "Audio session interruption ended");
                        if let Err(e) = self.audio_session.set_active(true).await {
                            let err = PlayerError::CannotReactivateSession(e.to_string());
                            warn!(error = %err, "Failed to reactivate audio session");
                            interruption = NowPlayableInterruption::Failed(err.to_string());
                        }
                        Some(should_resume)
                    }
                };

                self.emit(PlaybackEvent::Interruption {
                    session_id: self.id(),
                    began: matches!(notice, InterruptionNotice::Began),
                    should_resume,
                });
                if let Some(hook) = self.callbacks.interruption.as_mut() {
                    hook(&interruption, &self.snapshot);
                }
            }
            AudioSessionNotification::RouteChange(reason) => {
                info!(?reason, "Audio route changed");
                self.emit(PlaybackEvent::RouteChanged {
                    session_id: self.id(),
                    reason: format!("{reason:?}"),
                });
            }
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Tear the session down. Calling it again is a no-op returning `None`.
    ///
    /// Observers are detached first so nothing reaches the session after this
    /// returns. Audio session deactivation runs on the returned task after the
    /// configured teardown delay.
    pub async fn end(&mut self) -> Option<JoinHandle<()>> {
        if self.snapshot.state.is_terminal() {
            return None;
        }
        info!(session_id = %self.session_id, "Ending playback session");

        if let Some(token) = self.observer.take() {
            self.player.remove_observer(token);
        }
        if let Err(e) = self.player.pause().await {
            warn!(error = %e, "Failed to pause player during teardown");
        }
        if let Err(e) = self.player.release().await {
            warn!(error = %e, "Failed to release player item");
        }
        self.remote.unregister_all();
        self.publisher.clear();
        self.autoplay = false;

        self.transition(SessionState::Ended);
        self.emit(PlaybackEvent::Ended {
            session_id: self.id(),
        });
        self.notify();

        let audio_session = Arc::clone(&self.audio_session);
        let delay = self.config.audio_session_teardown_delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = audio_session.set_active(false).await {
                warn!(error = %e, "Failed to deactivate audio session");
            }
        }))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn id(&self) -> String {
        self.session_id.to_string()
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        self.events.emit(CoreEvent::Playback(event)).ok();
    }

    fn emit_position(&self) {
        self.emit(PlaybackEvent::PositionChanged {
            session_id: self.id(),
            position_ms: millis(self.snapshot.position),
            duration_ms: self.snapshot.duration.map(millis),
        });
    }

    fn publish_dynamic(&self) {
        self.publisher.publish_dynamic(&self.snapshot.dynamic_metadata());
    }

    fn notify(&self) {
        self.snapshot_tx.send_replace(self.snapshot.clone());
    }

    fn fail(&mut self, message: String) {
        error!(session_id = %self.session_id, %message, "Playback item failed");
        if let ItemStatus::Unknown = self.snapshot.item_status {
            self.snapshot.item_status = ItemStatus::Failed {
                message: message.clone(),
            };
        }
        self.transition(SessionState::Failed);
        self.emit(PlaybackEvent::Error {
            session_id: Some(self.id()),
            message,
            recoverable: false,
        });
    }

    /// Move the state machine. Returns `false` for same-state and invalid moves.
    fn transition(&mut self, next: SessionState) -> bool {
        let from = self.snapshot.state;
        if from == next {
            return false;
        }
        if !from.can_transition_to(next) {
            debug!(%from, to = %next, "Ignoring invalid state transition");
            return false;
        }

        self.snapshot.state = next;
        debug!(session_id = %self.session_id, %from, to = %next, "Session state changed");
        self.emit(PlaybackEvent::StateChanged {
            session_id: self.id(),
            from: from.to_string(),
            to: next.to_string(),
        });
        if let Some(hook) = self.callbacks.state_change.as_mut() {
            hook(from, &self.snapshot);
        }
        true
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session_id", &self.session_id)
            .field("title", &self.asset.metadata.title)
            .field("snapshot", &self.snapshot)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::{DesktopAudioSession, InMemoryNowPlayingCenter, InMemoryRemoteCommandCenter};
    use bridge_traits::error::Result as BridgeResult;
    use mockall::mock;
    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    mock! {
        Player {}

        #[async_trait]
        impl VideoPlayerAdapter for Player {
            async fn load(&self, item: PlayerItemRequest) -> BridgeResult<()>;
            async fn play(&self) -> BridgeResult<()>;
            async fn pause(&self) -> BridgeResult<()>;
            async fn set_rate(&self, rate: f32) -> BridgeResult<()>;
            async fn seek(&self, position: Duration) -> BridgeResult<()>;
            async fn set_allows_external_playback(&self, allowed: bool) -> BridgeResult<()>;
            async fn status(&self) -> BridgeResult<PlayerStatus>;
            fn add_observer(&self, sink: ObservationSink, periodic_interval: Duration) -> ObserverToken;
            fn remove_observer(&self, token: ObserverToken);
            async fn release(&self) -> BridgeResult<()>;
        }
    }

    fn ready_status(position: u64, rate: f32) -> PlayerStatus {
        PlayerStatus {
            item_status: ItemStatus::ReadyToPlay,
            time_control_status: if rate == 0.0 {
                TimeControlStatus::Paused
            } else {
                TimeControlStatus::Playing
            },
            rate,
            position: Duration::from_secs(position),
            duration: Some(Duration::from_secs(100)),
            can_play_fast_forward: true,
            can_play_reverse: true,
        }
    }

    /// Mock that accepts the calls made by `start`.
    fn startable_player() -> MockPlayer {
        let mut player = MockPlayer::new();
        player
            .expect_set_allows_external_playback()
            .returning(|_| Ok(()));
        player
            .expect_add_observer()
            .returning(|_, _| ObserverToken::new(1));
        player.expect_load().returning(|_| Ok(()));
        player
    }

    fn controller_with(player: MockPlayer, should_play: bool) -> SessionController {
        let mut config = PlayerConfiguration::default();
        config.assets[0].should_play = should_play;
        let bridges = PlaybackBridges {
            player: Arc::new(player),
            remote_commands: Arc::new(InMemoryRemoteCommandCenter::new()),
            now_playing: Arc::new(InMemoryNowPlayingCenter::new()),
            audio_session: Arc::new(DesktopAudioSession::new()),
        };
        SessionController::new(
            Uuid::new_v4(),
            config,
            bridges,
            EventBus::default(),
            SessionCallbacks::new(),
        )
        .unwrap()
    }

    async fn ready_controller(player: MockPlayer) -> SessionController {
        let mut controller = controller_with(player, false);
        let (sink, _rx) = mpsc::unbounded_channel();
        controller
            .start(sink, Arc::new(|_| bridge_traits::RemoteCommandStatus::Success))
            .await
            .unwrap();
        controller
            .handle_observation(PlayerObservation::ItemStatusChanged(ItemStatus::ReadyToPlay))
            .await;
        controller
    }

    #[test]
    fn test_clamp_rate() {
        assert_eq!(clamp_rate(3.0), 2.0);
        assert_eq!(clamp_rate(-4.0), -2.0);
        assert_eq!(clamp_rate(0.5), 0.5);
        assert_eq!(clamp_rate(f32::NAN), 0.0);
        assert_eq!(clamp_rate(f32::INFINITY), 2.0);
    }

    #[test]
    fn test_action_from_remote() {
        let ten = Duration::from_secs(10);
        assert_eq!(
            SessionAction::from_remote(RemoteCommandEvent::new(RemoteCommandKind::Play), ten),
            SessionAction::Resume
        );
        assert_eq!(
            SessionAction::from_remote(RemoteCommandEvent::new(RemoteCommandKind::SkipBackward), ten),
            SessionAction::SeekBy(-10.0)
        );
        let event = RemoteCommandEvent::new(RemoteCommandKind::SkipForward)
            .with_interval(Duration::from_secs(15));
        assert_eq!(SessionAction::from_remote(event, ten), SessionAction::SeekBy(15.0));
    }

    #[test]
    fn test_new_without_assets_fails() {
        let config = PlayerConfiguration::with_assets(Vec::new());
        let bridges = PlaybackBridges {
            player: Arc::new(MockPlayer::new()),
            remote_commands: Arc::new(InMemoryRemoteCommandCenter::new()),
            now_playing: Arc::new(InMemoryNowPlayingCenter::new()),
            audio_session: Arc::new(DesktopAudioSession::new()),
        };
        let result = SessionController::new(
            Uuid::new_v4(),
            config,
            bridges,
            EventBus::default(),
            SessionCallbacks::new(),
        );
        assert!(matches!(result, Err(PlayerError::NoAssetFound)));
    }

    #[tokio::test]
    async fn test_start_maps_rejected_item_to_not_playable() {
        let mut player = MockPlayer::new();
        player
            .expect_set_allows_external_playback()
            .with(eq(true))
            .returning(|_| Ok(()));
        player
            .expect_add_observer()
            .returning(|_, _| ObserverToken::new(1));
        player
            .expect_load()
            .returning(|_| Err(BridgeError::ItemRejected("codec".into())));

        let mut controller = controller_with(player, true);
        let (sink, _rx) = mpsc::unbounded_channel();
        let err = controller
            .start(sink, Arc::new(|_| bridge_traits::RemoteCommandStatus::Success))
            .await
            .unwrap_err();

        assert!(matches!(err, PlayerError::NotPlayable(ref reason) if reason == "codec"));
        assert_eq!(controller.snapshot().state, SessionState::Failed);
    }

    #[tokio::test]
    async fn test_play_pauses_when_playing_at_normal_rate() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(5, 1.0)));
        player.expect_pause().times(1).returning(|| Ok(()));
        player.expect_play().never();

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::Play).await.unwrap();
    }

    #[tokio::test]
    async fn test_play_at_end_rewinds_first() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(100, 0.0)));
        player
            .expect_seek()
            .with(eq(Duration::ZERO))
            .times(1)
            .returning(|_| Ok(()));
        player.expect_play().times(1).returning(|| Ok(()));

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::Play).await.unwrap();
    }

    #[tokio::test]
    async fn test_play_at_fast_rate_returns_to_normal() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(5, 2.0)));
        player.expect_play().times(1).returning(|| Ok(()));
        player.expect_pause().never();

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::Play).await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_change_alone_fires_time_control_hook() {
        let mut controller = ready_controller(startable_player()).await;
        let rates = Arc::new(std::sync::Mutex::new(Vec::new()));
        controller.callbacks = SessionCallbacks::new().on_time_control_status_update({
            let rates = rates.clone();
            move |snapshot| rates.lock().unwrap().push(snapshot.rate)
        });

        controller
            .handle_observation(PlayerObservation::RateChanged(2.0))
            .await;

        assert_eq!(*rates.lock().unwrap(), vec![2.0]);
        assert_eq!(controller.snapshot.rate, 2.0);
    }

    #[tokio::test]
    async fn test_set_rate_clamps() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(5, 1.5)));
        player
            .expect_set_rate()
            .with(eq(MAX_RATE))
            .times(1)
            .returning(|_| Ok(()));

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::SetRate(2.0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_seek_by_saturates_at_zero() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(3, 0.0)));
        player
            .expect_seek()
            .with(eq(Duration::ZERO))
            .times(1)
            .returning(|_| Ok(()));

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::SkipBackward).await.unwrap();
    }

    #[tokio::test]
    async fn test_seek_by_rejects_non_finite_offset() {
        let mut controller = ready_controller(startable_player()).await;
        let err = controller
            .perform(SessionAction::SeekBy(f64::NAN))
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::InvalidSeekOffset(_)));
    }

    #[tokio::test]
    async fn test_reverse_at_zero_seeks_to_end() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(0, 0.0)));
        player
            .expect_seek()
            .with(eq(Duration::from_secs(100)))
            .times(1)
            .returning(|_| Ok(()));
        player
            .expect_set_rate()
            .with(eq(MIN_RATE))
            .times(1)
            .returning(|_| Ok(()));

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::Reverse).await.unwrap();
    }

    #[tokio::test]
    async fn test_fast_forward_requires_capability() {
        let mut player = startable_player();
        player.expect_status().returning(|| {
            Ok(PlayerStatus {
                can_play_fast_forward: false,
                ..ready_status(5, 1.0)
            })
        });
        player.expect_set_rate().never();

        let mut controller = ready_controller(player).await;
        controller.perform(SessionAction::FastForward).await.unwrap();
    }

    #[tokio::test]
    async fn test_adapter_failure_propagates() {
        let mut player = startable_player();
        player.expect_status().returning(|| Ok(ready_status(5, 0.0)));
        player
            .expect_play()
            .returning(|| Err(BridgeError::OperationFailed("device lost".into())));

        let mut controller = ready_controller(player).await;
        let err = controller.perform(SessionAction::Play).await.unwrap_err();
        assert!(matches!(err, PlayerError::Bridge(_)));
    }

    #[tokio::test]
    async fn test_transport_after_failure_reports_failed() {
        let mut controller = ready_controller(startable_player()).await;
        controller
            .handle_observation(PlayerObservation::ItemStatusChanged(ItemStatus::Failed {
                message: "network lost".into(),
            }))
            .await;

        let err = controller.perform(SessionAction::Play).await.unwrap_err();
        assert!(matches!(err, PlayerError::Failed(ref m) if m == "network lost"));
    }

    #[tokio::test]
    async fn test_end_tolerates_adapter_errors_and_is_idempotent() {
        let mut player = startable_player();
        player.expect_remove_observer().times(1).return_const(());
        player
            .expect_pause()
            .times(1)
            .returning(|| Err(BridgeError::OperationFailed("gone".into())));
        player.expect_release().times(1).returning(|| Ok(()));

        let mut controller = ready_controller(player).await;
        assert!(controller.end().await.is_some());
        assert!(controller.end().await.is_none());

        assert_eq!(controller.snapshot().state, SessionState::Ended);
        controller.perform(SessionAction::Play).await.unwrap();
    }

    #[tokio::test]
    async fn test_played_to_end_pauses_at_duration() {
        let mut controller = ready_controller(startable_player()).await;
        controller
            .handle_observation(PlayerObservation::DurationChanged(Duration::from_secs(100)))
            .await;
        controller
            .handle_observation(PlayerObservation::TimeControlStatusChanged(
                TimeControlStatus::Playing,
            ))
            .await;
        assert_eq!(controller.snapshot().state, SessionState::Playing);

        controller
            .handle_observation(PlayerObservation::PlayedToEnd)
            .await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Paused);
        assert_eq!(snapshot.position, Duration::from_secs(100));
        assert!(snapshot.is_at_end());
    }
}
