//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the video player core:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge validation
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions, the set of host bridges a core
//! instance needs, and the event broadcasting used to observe catalog and
//! playback activity.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
