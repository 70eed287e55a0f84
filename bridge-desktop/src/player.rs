//! Simulated video player.
//!
//! Advances a virtual playhead on the tokio clock instead of decoding media,
//! which makes it usable both for headless demos and for deterministic tests
//! under `tokio::time::pause()`.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    player::{
        ItemStatus, ObservationSink, ObserverToken, PlayerItemRequest, PlayerObservation,
        PlayerStatus, TimeControlStatus, VideoPlayerAdapter,
    },
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Schemes the simulated player accepts. Anything else is rejected as not playable.
const PLAYABLE_SCHEMES: &[&str] = &["http://", "https://", "file://"];

struct Observer {
    sink: ObservationSink,
    cancel: CancellationToken,
}

struct SimState {
    item: Option<PlayerItemRequest>,
    item_status: ItemStatus,
    rate: f32,
    anchor_position: Duration,
    anchor_instant: Instant,
    allows_external_playback: bool,
    observers: HashMap<u64, Observer>,
    next_token: u64,
}

impl SimState {
    fn position(&self, duration: Duration) -> Duration {
        if self.rate == 0.0 {
            return self.anchor_position;
        }
        let elapsed = self.anchor_instant.elapsed().as_secs_f64() * f64::from(self.rate);
        let secs = (self.anchor_position.as_secs_f64() + elapsed).clamp(0.0, duration.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    fn reanchor(&mut self, position: Duration) {
        self.anchor_position = position;
        self.anchor_instant = Instant::now();
    }

    fn emit(&self, observation: PlayerObservation) {
        for observer in self.observers.values() {
            // A closed sink means the session is gone; it removes its observer on teardown.
            let _ = observer.sink.send(observation.clone());
        }
    }
}

/// Configurable knobs of the simulated player.
#[derive(Debug, Clone)]
pub struct SimulatedPlayerOptions {
    /// Duration reported for every loaded item.
    pub duration: Duration,
    /// Delay between `load` and the item becoming ready. Zero readies synchronously.
    pub load_delay: Duration,
    /// When set, loaded items fail with this message instead of becoming ready.
    pub load_failure: Option<String>,
    pub can_play_fast_forward: bool,
    pub can_play_reverse: bool,
}

impl Default for SimulatedPlayerOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(596),
            load_delay: Duration::ZERO,
            load_failure: None,
            can_play_fast_forward: true,
            can_play_reverse: true,
        }
    }
}

/// Headless [`VideoPlayerAdapter`] backed by a virtual clock.
#[derive(Clone)]
pub struct SimulatedVideoPlayer {
    options: SimulatedPlayerOptions,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedVideoPlayer {
    pub fn new() -> Self {
        Self::with_options(SimulatedPlayerOptions::default())
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self::with_options(SimulatedPlayerOptions {
            duration,
            ..Default::default()
        })
    }

    pub fn with_options(options: SimulatedPlayerOptions) -> Self {
        Self {
            options,
            state: Arc::new(Mutex::new(SimState {
                item: None,
                item_status: ItemStatus::Unknown,
                rate: 0.0,
                anchor_position: Duration::ZERO,
                anchor_instant: Instant::now(),
                allows_external_playback: false,
                observers: HashMap::new(),
                next_token: 1,
            })),
        }
    }

    /// Item currently loaded, if any.
    pub fn loaded_item(&self) -> Option<PlayerItemRequest> {
        self.state.lock().item.clone()
    }

    pub fn allows_external_playback(&self) -> bool {
        self.state.lock().allows_external_playback
    }

    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub fn current_rate(&self) -> f32 {
        self.state.lock().rate
    }

    pub fn current_position(&self) -> Duration {
        self.state.lock().position(self.options.duration)
    }

    /// Jump the playhead to the end of the item and report completion, as if
    /// playback had run out.
    pub fn finish_item(&self) {
        let mut state = self.state.lock();
        state.reanchor(self.options.duration);
        Self::stop_at_end(&mut state);
    }

    /// Mark the loaded item as failed (e.g. the network dropped mid-stream).
    pub fn fail_item(&self, message: impl Into<String>) {
        let mut state = self.state.lock();
        let status = ItemStatus::Failed {
            message: message.into(),
        };
        state.item_status = status.clone();
        state.emit(PlayerObservation::ItemStatusChanged(status));
    }

    fn stop_at_end(state: &mut SimState) {
        state.rate = 0.0;
        state.emit(PlayerObservation::RateChanged(0.0));
        state.emit(PlayerObservation::TimeControlStatusChanged(
            TimeControlStatus::Paused,
        ));
        state.emit(PlayerObservation::PlayedToEnd);
    }

    fn become_ready(state: &Mutex<SimState>, options: &SimulatedPlayerOptions) {
        let mut state = state.lock();
        if state.item.is_none() {
            return;
        }
        let status = match &options.load_failure {
            Some(message) => ItemStatus::Failed {
                message: message.clone(),
            },
            None => ItemStatus::ReadyToPlay,
        };
        state.item_status = status.clone();
        if status.is_ready() {
            state.emit(PlayerObservation::DurationChanged(options.duration));
            state.emit(PlayerObservation::CanPlayFastForwardChanged(
                options.can_play_fast_forward,
            ));
            state.emit(PlayerObservation::CanPlayReverseChanged(
                options.can_play_reverse,
            ));
        }
        state.emit(PlayerObservation::ItemStatusChanged(status));
    }

    fn start(&self, rate: f32) -> Result<()> {
        let mut state = self.state.lock();
        if state.item.is_none() {
            return Err(BridgeError::OperationFailed("no item loaded".to_string()));
        }
        let position = state.position(self.options.duration);
        state.reanchor(position);
        state.rate = rate;
        state.emit(PlayerObservation::RateChanged(rate));
        let control = if state.item_status.is_ready() {
            TimeControlStatus::Playing
        } else {
            TimeControlStatus::WaitingToPlayAtSpecifiedRate
        };
        state.emit(PlayerObservation::TimeControlStatusChanged(control));
        Ok(())
    }

    fn tick(state: &Mutex<SimState>, duration: Duration, token: u64) {
        let mut state = state.lock();
        if state.rate == 0.0 {
            return;
        }
        let position = state.position(duration);
        if let Some(observer) = state.observers.get(&token) {
            let _ = observer.sink.send(PlayerObservation::PeriodicTime(position));
        }

        let hit_end = state.rate > 0.0 && position >= duration;
        let hit_start = state.rate < 0.0 && position.is_zero();
        if hit_end {
            state.reanchor(duration);
            Self::stop_at_end(&mut state);
        } else if hit_start {
            state.reanchor(Duration::ZERO);
            state.rate = 0.0;
            state.emit(PlayerObservation::RateChanged(0.0));
            state.emit(PlayerObservation::TimeControlStatusChanged(
                TimeControlStatus::Paused,
            ));
        }
    }
}

impl Default for SimulatedVideoPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedVideoPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedVideoPlayer")
            .field("options", &self.options)
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[async_trait]
impl VideoPlayerAdapter for SimulatedVideoPlayer {
    async fn load(&self, item: PlayerItemRequest) -> Result<()> {
        if !PLAYABLE_SCHEMES.iter().any(|s| item.url.starts_with(s)) {
            return Err(BridgeError::ItemRejected(format!(
                "unsupported url: {}",
                item.url
            )));
        }

        {
            let mut state = self.state.lock();
            debug!(url = %item.url, "Loading simulated item");
            state.item = Some(item);
            state.item_status = ItemStatus::Unknown;
            state.rate = 0.0;
            state.reanchor(Duration::ZERO);
        }

        if self.options.load_delay.is_zero() {
            Self::become_ready(&self.state, &self.options);
        } else {
            let state = Arc::clone(&self.state);
            let options = self.options.clone();
            tokio::spawn(async move {
                tokio::time::sleep(options.load_delay).await;
                Self::become_ready(&state, &options);
            });
        }
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.start(1.0)
    }

    async fn pause(&self) -> Result<()> {
        let mut state = self.state.lock();
        let position = state.position(self.options.duration);
        state.reanchor(position);
        state.rate = 0.0;
        state.emit(PlayerObservation::RateChanged(0.0));
        state.emit(PlayerObservation::TimeControlStatusChanged(
            TimeControlStatus::Paused,
        ));
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> Result<()> {
        if rate == 0.0 {
            self.pause().await
        } else {
            self.start(rate)
        }
    }

    async fn seek(&self, position: Duration) -> Result<()> {
        let mut state = self.state.lock();
        let target = position.min(self.options.duration);
        state.reanchor(target);
        state.emit(PlayerObservation::PeriodicTime(target));
        state.emit(PlayerObservation::SeekCompleted { finished: true });
        Ok(())
    }

    async fn set_allows_external_playback(&self, allowed: bool) -> Result<()> {
        self.state.lock().allows_external_playback = allowed;
        Ok(())
    }

    async fn status(&self) -> Result<PlayerStatus> {
        let state = self.state.lock();
        let ready = state.item_status.is_ready();
        let time_control_status = match (state.rate == 0.0, ready) {
            (true, _) => TimeControlStatus::Paused,
            (false, true) => TimeControlStatus::Playing,
            (false, false) => TimeControlStatus::WaitingToPlayAtSpecifiedRate,
        };
        Ok(PlayerStatus {
            item_status: state.item_status.clone(),
            time_control_status,
            rate: state.rate,
            position: state.position(self.options.duration),
            duration: ready.then_some(self.options.duration),
            can_play_fast_forward: ready && self.options.can_play_fast_forward,
            can_play_reverse: ready && self.options.can_play_reverse,
        })
    }

    fn add_observer(&self, sink: ObservationSink, periodic_interval: Duration) -> ObserverToken {
        let cancel = CancellationToken::new();
        let token = {
            let mut state = self.state.lock();
            let token = state.next_token;
            state.next_token += 1;
            state.observers.insert(
                token,
                Observer {
                    sink,
                    cancel: cancel.clone(),
                },
            );
            token
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) if !periodic_interval.is_zero() => {
                let state = Arc::clone(&self.state);
                let duration = self.options.duration;
                handle.spawn(async move {
                    let mut ticker = tokio::time::interval(periodic_interval);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = ticker.tick() => Self::tick(&state, duration, token),
                        }
                    }
                });
            }
            Ok(_) => {}
            Err(_) => warn!("No tokio runtime; periodic time updates disabled"),
        }

        ObserverToken::new(token)
    }

    fn remove_observer(&self, token: ObserverToken) {
        if let Some(observer) = self.state.lock().observers.remove(&token.raw()) {
            observer.cancel.cancel();
        }
    }

    async fn release(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.item = None;
        state.item_status = ItemStatus::Unknown;
        state.rate = 0.0;
        state.reanchor(Duration::ZERO);
        Ok(())
    }
}
