//! # Event Bus System
//!
//! Provides an event-driven architecture for the video player core using `tokio::sync::broadcast`.
//! This module enables decoupled communication between core modules through typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐    emit     ┌───────────┐
//! │ Catalog       ├────────────>│           │
//! └───────────────┘             │ EventBus  │     subscribe    ┌────────────┐
//!                               │ (broadcast├─────────────────>│ Subscriber │
//! ┌───────────────┐    emit     │  channel) │                  └────────────┘
//! │ Session loop  ├────────────>│           │
//! └───────────────┘             └───────────┘
//! ```
//!
//! ## Usage
//!
//! ### Publishing Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, CatalogEvent};
//!
//! let event_bus = EventBus::new(100);
//! let event = CoreEvent::Catalog(CatalogEvent::Loaded { count: 13 });
//!
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Subscribing to Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent};
//! use tokio::sync::broadcast::error::RecvError;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     loop {
//!         match stream.recv().await {
//!             Ok(event) => println!("Received: {:?}", event),
//!             Err(RecvError::Lagged(n)) => {
//!                 eprintln!("Missed {} events", n);
//!             }
//!             Err(RecvError::Closed) => break,
//!         }
//!     }
//! });
//! # }
//! ```
//!
//! ## Event Types
//!
//! ### Catalog Events
//! - `Loaded`: The bundled catalog was decoded
//! - `LoadFailed`: The catalog could not be located, read or decoded
//!
//! ### Playback Events
//! - `SessionStarted`: A session was created for an asset
//! - `StateChanged`: The session state machine moved
//! - `Paused` / `Resumed`: Time control status changed
//! - `RateChanged`: Playback rate changed (fast-forward, reverse)
//! - `PositionChanged`: Periodic or seek-driven position update
//! - `Completed`: The item played to its end
//! - `RemoteCommand`: A headset or lock-screen command was handled
//! - `Interruption` / `RouteChanged`: Audio session notifications
//! - `Ended`: The session was torn down
//! - `Error`: The item failed
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types of errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Position updates arrive twice a second while playing; size the buffer
//! accordingly if a subscriber does slow work per event.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog-related events
    Catalog(CatalogEvent),
    /// Playback-related events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Catalog(CatalogEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Interruption { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::RouteChanged { .. }) => EventSeverity::Warning,
            CoreEvent::Catalog(CatalogEvent::Loaded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::SessionStarted { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Ended { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events related to the bundled video catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// Catalog decoded successfully.
    Loaded {
        /// Number of videos in the catalog.
        count: usize,
    },
    /// Catalog could not be loaded; the list stays empty.
    LoadFailed {
        /// Human-readable error message.
        message: String,
    },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::Loaded { .. } => "Catalog loaded",
            CatalogEvent::LoadFailed { .. } => "Catalog failed to load",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to a video playback session.
///
/// Every variant carries the id of the session that produced it, so
/// subscribers can discard events from a session that was already replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A session was created and its item is loading.
    SessionStarted {
        session_id: String,
        title: String,
        asset_url: String,
    },
    /// The session state machine moved.
    StateChanged {
        session_id: String,
        from: String,
        to: String,
    },
    /// Playback paused.
    Paused {
        session_id: String,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// Playback resumed or started.
    Resumed {
        session_id: String,
        /// Position when resumed (milliseconds).
        position_ms: u64,
    },
    /// Playback rate changed.
    RateChanged { session_id: String, rate: f32 },
    /// Playback position changed (seek or natural progression).
    PositionChanged {
        session_id: String,
        /// New position (milliseconds).
        position_ms: u64,
        /// Item duration (milliseconds), once known.
        duration_ms: Option<u64>,
    },
    /// Item finished playing naturally.
    Completed { session_id: String },
    /// A remote command was received.
    RemoteCommand {
        session_id: String,
        /// Wire name of the command (`play`, `skipForward`, ...).
        command: String,
        /// Whether the session was still able to act on it.
        handled: bool,
    },
    /// The audio session was interrupted or the interruption ended.
    Interruption {
        session_id: String,
        began: bool,
        /// Host hint on interruption end; `None` while the interruption is ongoing.
        should_resume: Option<bool>,
    },
    /// The audio output route changed.
    RouteChanged { session_id: String, reason: String },
    /// The session was torn down.
    Ended { session_id: String },
    /// Playback error occurred.
    Error {
        session_id: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether playback can be retried.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::SessionStarted { .. } => "Playback session started",
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::RateChanged { .. } => "Playback rate changed",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::Completed { .. } => "Item completed",
            PlaybackEvent::RemoteCommand { .. } => "Remote command received",
            PlaybackEvent::Interruption { .. } => "Audio session interruption",
            PlaybackEvent::RouteChanged { .. } => "Audio route changed",
            PlaybackEvent::Ended { .. } => "Playback session ended",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }

    /// Id of the session that produced this event, if any.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            PlaybackEvent::SessionStarted { session_id, .. }
            | PlaybackEvent::StateChanged { session_id, .. }
            | PlaybackEvent::Paused { session_id, .. }
            | PlaybackEvent::Resumed { session_id, .. }
            | PlaybackEvent::RateChanged { session_id, .. }
            | PlaybackEvent::PositionChanged { session_id, .. }
            | PlaybackEvent::Completed { session_id }
            | PlaybackEvent::RemoteCommand { session_id, .. }
            | PlaybackEvent::Interruption { session_id, .. }
            | PlaybackEvent::RouteChanged { session_id, .. }
            | PlaybackEvent::Ended { session_id } => Some(session_id),
            PlaybackEvent::Error { session_id, .. } => session_id.as_deref(),
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast bus shared by the catalog and every playback session.
///
/// Cloning is cheap; all clones publish into the same channel. A subscriber
/// that falls more than `capacity` events behind gets `RecvError::Lagged` and
/// skips ahead. Nothing is replayed to late subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every subscriber and return how many received it.
    ///
    /// Fails only when nobody is subscribed; session code ignores that case.
    ///
    /// ```rust
    /// use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
    ///
    /// let bus = EventBus::new(16);
    /// let mut rx = bus.subscribe();
    /// bus.emit(CoreEvent::Playback(PlaybackEvent::Completed {
    ///     session_id: "session-1".to_string(),
    /// }))
    /// .unwrap();
    /// assert!(rx.try_recv().is_ok());
    /// ```
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        trace!(severity = ?event.severity(), "{}", event.description());
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering capabilities.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, CoreEvent};
///
/// let event_bus = EventBus::new(100);
/// let stream = EventStream::new(event_bus.subscribe());
///
/// // Only playback events
/// let playback = stream.filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Keeps only playback events produced by `session_id`.
    pub fn for_session(self, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        self.filter(move |event| match event {
            CoreEvent::Playback(e) => e.session_id() == Some(session_id.as_str()),
            _ => false,
        })
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
