//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridges from a [`CoreConfig`] into the
//! catalog and playback crates. Host applications hold one
//! [`VideoPlayerService`]: they load the catalog for the list screen, open a
//! video when a row is selected and close it when the player screen goes
//! away. Desktop apps typically enable the `desktop-shims` feature, which lets
//! [`bootstrap_desktop`] fill every bridge with the in-process shims.

pub mod error;

pub use error::{CoreError, Result};

use core_catalog::{VideoList, VideoManager};
use core_playback::{
    ConfigurationAsset, ControlViewState, NowPlayableMetadata, PlaybackBridges, PlaybackSession,
    PlayerConfiguration, SessionCallbacks, SessionHandle,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, EventStream};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

#[cfg(feature = "desktop-shims")]
use std::path::PathBuf;

/// Primary façade exposed to host applications.
///
/// At most one playback session is active at a time; opening a video ends the
/// previous session first.
pub struct VideoPlayerService {
    config: CoreConfig,
    events: EventBus,
    /// Commands and intervals applied to every opened video.
    template: PlayerConfiguration,
    videos: RwLock<VideoList>,
    active: Mutex<Option<SessionHandle>>,
    /// Audio session deactivation left behind by [`close_video`](Self::close_video).
    pending_deactivation: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl VideoPlayerService {
    /// Create a service with the default player configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let events = EventBus::new(config.event_buffer_size);
        Ok(Self {
            config,
            events,
            template: PlayerConfiguration::default(),
            videos: RwLock::new(VideoList::default()),
            active: Mutex::new(None),
            pending_deactivation: parking_lot::Mutex::new(None),
        })
    }

    /// Replace the configuration template used by [`open_video`](Self::open_video).
    /// Its assets are ignored; each video supplies its own.
    pub fn with_player_configuration(mut self, template: PlayerConfiguration) -> Result<Self> {
        template.validate()?;
        self.template = template;
        Ok(self)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Stream of every event emitted by the catalog and playback sessions.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Load the bundled catalog, replacing the cached list.
    ///
    /// Failures are logged and leave the list empty.
    pub async fn load_videos(&self) -> VideoList {
        match self.try_load_videos().await {
            Ok(list) => list,
            Err(e) => {
                error!(
                    resource = %self.config.catalog_resource,
                    error = %e,
                    "Failed to load video catalog"
                );
                self.events
                    .emit(CoreEvent::Catalog(CatalogEvent::LoadFailed {
                        message: e.to_string(),
                    }))
                    .ok();
                *self.videos.write() = VideoList::default();
                VideoList::default()
            }
        }
    }

    /// Like [`load_videos`](Self::load_videos) but returns the error and
    /// leaves the cached list untouched on failure.
    pub async fn try_load_videos(&self) -> Result<VideoList> {
        let catalog = VideoManager::fetch_catalog(
            self.config.resource_bundle.as_ref(),
            &self.config.catalog_resource,
        )
        .await?;

        info!(
            catalog = %catalog.name,
            count = catalog.videos.len(),
            "Video catalog loaded"
        );
        self.events
            .emit(CoreEvent::Catalog(CatalogEvent::Loaded {
                count: catalog.videos.len(),
            }))
            .ok();

        let list = VideoList::new(catalog.videos);
        *self.videos.write() = list.clone();
        Ok(list)
    }

    /// The list returned by the last successful load.
    pub fn videos(&self) -> VideoList {
        self.videos.read().clone()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Start a session for the video at `index` in the loaded list.
    ///
    /// Any active session is ended first. Its audio session deactivation, or
    /// the one left pending by [`close_video`](Self::close_video), completes
    /// before the new session activates, so the two never overlap on the host.
    ///
    /// # Errors
    ///
    /// - [`CoreError::VideoNotFound`] if `index` is out of range
    /// - [`CoreError::Playback`] if the video has no playable source or the
    ///   session fails to start
    #[instrument(skip(self, callbacks))]
    pub async fn open_video(
        &self,
        index: usize,
        callbacks: SessionCallbacks,
    ) -> Result<SessionHandle> {
        let configuration = self.configuration_for(index)?;

        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            debug!(session_id = %previous.session_id(), "Ending previous session");
            previous.end_and_wait().await;
        }
        self.finish_pending_deactivation().await;

        let handle = PlaybackSession::start(
            configuration,
            PlaybackBridges::from(&self.config),
            self.events.clone(),
            callbacks,
        )
        .await?;

        *active = Some(handle.clone());
        Ok(handle)
    }

    /// The running session, if any.
    pub async fn active_session(&self) -> Option<SessionHandle> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|handle| !handle.is_ended())
            .cloned()
    }

    /// End the active session. No-op without one.
    ///
    /// Returns once teardown has run; the delayed audio session deactivation
    /// keeps running and the next [`open_video`](Self::open_video) waits for it.
    pub async fn close_video(&self) {
        // Held until the deactivation is recorded so `open_video` cannot miss it.
        let mut active = self.active.lock().await;
        let Some(handle) = active.take() else {
            return;
        };
        if let Some(deactivation) = handle.end_deferred().await {
            *self.pending_deactivation.lock() = Some(deactivation);
        }
    }

    /// Controls for the active session, or all disabled without one.
    pub async fn control_view(&self) -> ControlViewState {
        match self.active_session().await {
            Some(handle) => ControlViewState::from_snapshot(&handle.snapshot()),
            None => ControlViewState::inactive(),
        }
    }

    async fn finish_pending_deactivation(&self) {
        let pending = self.pending_deactivation.lock().take();
        if let Some(deactivation) = pending {
            debug!("Waiting for previous audio session deactivation");
            if let Err(e) = deactivation.await {
                warn!(error = %e, "Audio session deactivation task failed");
            }
        }
    }

    fn configuration_for(&self, index: usize) -> Result<PlayerConfiguration> {
        let videos = self.videos.read();
        let video = videos.get(index).ok_or(CoreError::VideoNotFound {
            index,
            count: videos.len(),
        })?;

        let assets = video
            .source()
            .map(|source| NowPlayableMetadata::parse(source, video.title.clone()))
            .transpose()?
            .map(ConfigurationAsset::new)
            .into_iter()
            .collect();

        Ok(PlayerConfiguration {
            assets,
            ..self.template.clone()
        })
    }
}

impl std::fmt::Debug for VideoPlayerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlayerService")
            .field("config", &self.config)
            .field("videos", &self.videos.read().len())
            .finish()
    }
}

/// Convenience bootstrapper for desktop hosts: every bridge is filled with
/// the in-process shims and the catalog is read from `resource_dir`.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let service = core_service::bootstrap_desktop("resources")?;
/// let videos = service.load_videos().await;
/// if !videos.is_empty() {
///     let session = service
///         .open_video(0, core_playback::SessionCallbacks::new())
///         .await?;
///     session.play().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(resource_dir: impl Into<PathBuf>) -> Result<VideoPlayerService> {
    let config = CoreConfig::builder()
        .resource_dir(resource_dir.into())
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    VideoPlayerService::new(config)
}
