//! # Logging & Tracing Infrastructure
//!
//! Provides structured logging with `tracing` crate, supporting:
//! - JSON, pretty and compact output formats
//! - Module-level filtering
//! - Integration with host logging via `LoggerSink`
//! - Span contexts around session setup
//!
//! ## Overview
//!
//! This module configures the `tracing-subscriber` infrastructure and provides
//! utilities for forwarding logs to platform-specific logging systems through
//! the `LoggerSink` trait. When a sink is configured, every event that survives
//! filtering is mirrored to the host logger while still flowing through the
//! standard `tracing` layers.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use bridge_traits::logging::{ConsoleLogger, LogLevel};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LoggingConfig::default()
//!         .with_format(LogFormat::Pretty)
//!         .with_level(LogLevel::Debug)
//!         .with_logger_sink(Arc::new(ConsoleLogger::default()));
//!
//!     init_logging(config).expect("Failed to initialize logging");
//!
//!     tracing::info!("Player started");
//! }
//! ```
//!
//! ## Asset URLs
//!
//! Streaming URLs may carry signed query strings. Log them through
//! [`redact_url`] rather than verbatim.

use crate::error::{Error, Result};
use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer,
};
use url::Url;

/// Workspace crates that get the configured level by default.
const CORE_TARGETS: &[&str] = &[
    "core_runtime",
    "core_catalog",
    "core_playback",
    "core_service",
    "bridge_desktop",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level
    pub level: LogLevel,
    /// Custom filter string (e.g., "core_playback=debug,core_catalog=trace")
    pub filter: Option<String>,
    /// Optional logger sink for forwarding logs to host
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Enable span contexts
    pub enable_spans: bool,
    /// Display target module in logs
    pub display_target: bool,
    /// Display thread info
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            logger_sink: None,
            enable_spans: true,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("has_logger_sink", &self.logger_sink.is_some())
            .finish()
    }
}

impl LoggingConfig {
    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set minimum log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set custom filter string
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set logger sink for host integration
    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Enable or disable span contexts
    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    /// Enable or disable target display
    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    /// Enable or disable thread info
    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Initialize the logging system
///
/// This should be called once during application startup. Subsequent calls
/// will return an error.
///
/// # Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - The filter string is invalid
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(&config))
        .with(LoggerSinkLayer::new(config.logger_sink.clone()))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = match &config.filter {
        Some(custom_filter) => custom_filter.clone(),
        None => {
            // Our crates at the configured level, everything else at warn
            let level = config.level.as_str().to_lowercase();
            let mut directives = vec!["warn".to_string()];
            directives.extend(CORE_TARGETS.iter().map(|target| format!("{}={}", target, level)));
            directives.join(",")
        }
    };

    EnvFilter::try_new(filter_string)
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

/// Stdout layer for the configured format.
fn fmt_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let span_events = if config.enable_spans {
        FmtSpan::ACTIVE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_target(config.display_target)
        .with_thread_ids(config.display_thread_info)
        .with_thread_names(config.display_thread_info)
        .with_writer(io::stdout);

    match config.format {
        LogFormat::Pretty => layer.pretty().with_span_events(span_events).boxed(),
        // JSON carries the span list inline instead of enter/exit lines.
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_current_span(config.enable_spans)
            .with_span_list(config.enable_spans)
            .boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Layer that forwards events to a `LoggerSink` implementation.
pub struct LoggerSinkLayer {
    sink: Option<Arc<dyn LoggerSink>>,
}

impl LoggerSinkLayer {
    pub fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for LoggerSinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        let metadata = event.metadata();
        let level = tracing_level_to_log_level(*metadata.level());

        if level < sink.min_level() {
            return;
        }

        let mut visitor = SinkVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .message
            .unwrap_or_else(|| metadata.name().to_string());

        let mut entry = LogEntry::new(level, metadata.target(), message);

        for (key, value) in visitor.fields {
            entry = entry.with_field(key, value);
        }

        if let Some(span) = ctx.lookup_current() {
            entry.span_id = Some(span.name().to_string());
        }

        let sink = Arc::clone(sink);

        // Inside a runtime the sink write must not block the emitting task.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = sink.log(entry).await {
                    eprintln!("LoggerSink error: {}", err);
                }
            });
            return;
        }

        if let Err(err) = futures::executor::block_on(sink.log(entry)) {
            eprintln!("LoggerSink error: {}", err);
        }
    }
}

#[derive(Default)]
struct SinkVisitor {
    message: Option<String>,
    fields: HashMap<String, String>,
}

impl SinkVisitor {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for SinkVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{:?}", value));
    }
}

fn tracing_level_to_log_level(level: tracing::Level) -> LogLevel {
    match level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}

/// Strip credentials, query string and fragment from a URL for logging.
///
/// ```ignore
/// use core_runtime::logging::redact_url;
///
/// let url = url::Url::parse("https://user:pw@cdn.example.com/v.mp4?sig=abc")?;
/// tracing::info!(url = %redact_url(&url), "Loading asset");
/// // Logs: url="https://cdn.example.com/v.mp4"
/// ```
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    redacted.set_fragment(None);
    // Both only fail for URLs without a host, which carry no credentials.
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.to_string()
}

/// Strip full file paths to basename only for privacy
///
/// ```ignore
/// use core_runtime::logging::strip_path;
///
/// let path = "/Users/john/App.app/videos.json";
/// tracing::info!(file = %strip_path(path), "Reading catalog");
/// // Logs: file="videos.json"
/// ```
pub fn strip_path(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .rsplit('\\')
        .next()
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as SinkResult;
    use std::sync::Mutex;

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_level(LogLevel::Debug)
            .with_filter("core_playback=trace")
            .with_spans(false)
            .with_target(true)
            .with_thread_info(true);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.filter, Some("core_playback=trace".to_string()));
        assert!(!config.enable_spans);
        assert!(config.display_target);
        assert!(config.display_thread_info);
    }

    #[test]
    fn test_redact_url() {
        let redact = |raw: &str| redact_url(&Url::parse(raw).unwrap());

        assert_eq!(
            redact("https://user:pw@cdn.example.com/v.mp4?sig=abc#t=10"),
            "https://cdn.example.com/v.mp4"
        );
        assert_eq!(
            redact("http://commondatastorage.googleapis.com/sample/BigBuckBunny.mp4"),
            "http://commondatastorage.googleapis.com/sample/BigBuckBunny.mp4"
        );
        assert_eq!(redact("https://example.com"), "https://example.com/");
        assert_eq!(redact("https://token@example.com:8443/a"), "https://example.com:8443/a");
        assert_eq!(redact("file:///tmp/clip.mov?x=1"), "file:///tmp/clip.mov");
    }

    #[test]
    fn test_strip_path() {
        assert_eq!(strip_path("/home/user/app/videos.json"), "videos.json");
        assert_eq!(strip_path("C:\\Users\\John\\videos.json"), "videos.json");
        assert_eq!(strip_path("videos.json"), "videos.json");
        assert_eq!(strip_path("/var/log/"), "");
    }

    #[test]
    fn test_default_format() {
        #[cfg(debug_assertions)]
        assert_eq!(LogFormat::default(), LogFormat::Pretty);

        #[cfg(not(debug_assertions))]
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_build_filter() {
        let config = LoggingConfig::default().with_level(LogLevel::Debug);
        let filter = build_filter(&config).unwrap().to_string();
        assert!(filter.contains("core_playback=debug"));
        assert!(filter.contains("core_catalog=debug"));
    }

    #[test]
    fn test_build_custom_filter() {
        let config = LoggingConfig::default().with_filter("core_playback=trace,core_catalog=debug");
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("core_playback=trace"));
    }

    #[test]
    fn test_logger_sink_layer_forwards_event() {
        let sink = Arc::new(TestLoggerSink::default());
        let trait_sink: Arc<dyn LoggerSink> = sink.clone();
        let layer = LoggerSinkLayer::new(Some(trait_sink));
        let subscriber = tracing_subscriber::registry().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::info!(target: "test.target", session = "s-1", "session ready");

        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.target, "test.target");
        assert_eq!(entry.message, "session ready");
        assert_eq!(entry.fields.get("session"), Some(&"s-1".to_string()));
    }

    #[test]
    fn test_emitted_events_are_traced_with_severity() {
        use crate::events::{CatalogEvent, CoreEvent, EventBus};

        let sink = Arc::new(TestLoggerSink::default());
        let trait_sink: Arc<dyn LoggerSink> = sink.clone();
        let layer = LoggerSinkLayer::new(Some(trait_sink));
        let subscriber = tracing_subscriber::registry().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let bus = EventBus::new(4);
        let _rx = bus.subscribe();
        bus.emit(CoreEvent::Catalog(CatalogEvent::LoadFailed {
            message: "missing".to_string(),
        }))
        .unwrap();

        let entries = sink.entries.lock().unwrap();
        let entry = entries
            .iter()
            .find(|e| e.target == "core_runtime::events")
            .unwrap();
        assert_eq!(entry.level, LogLevel::Trace);
        assert_eq!(entry.message, "Catalog failed to load");
        assert_eq!(entry.fields.get("severity"), Some(&"Error".to_string()));
    }

    #[derive(Default)]
    struct TestLoggerSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    #[async_trait]
    impl LoggerSink for TestLoggerSink {
        async fn log(&self, entry: LogEntry) -> SinkResult<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            LogLevel::Trace
        }
    }
}
