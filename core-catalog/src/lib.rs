//! # Video Catalog
//!
//! Loads the video catalog shipped with the app and models the list screen.
//!
//! ## Overview
//!
//! The catalog is a JSON manifest (`videos.json`) resolved through the host's
//! [`ResourceBundle`](bridge_traits::ResourceBundle):
//!
//! ```json
//! { "name": "Movies",
//!   "videos": [ { "description": "...", "sources": ["http://..."],
//!                 "subtitle": "By Blender Foundation",
//!                 "thumb": "images/BigBuckBunny.jpg", "title": "Big Buck Bunny" } ] }
//! ```
//!
//! [`VideoManager`] locates, reads and decodes it; [`VideoList`] exposes the
//! rows the list screen renders.

pub mod error;
pub mod list;
pub mod manager;
pub mod models;

pub use error::{CatalogError, Result};
pub use list::{VideoList, VideoRow};
pub use manager::VideoManager;
pub use models::{Catalog, Subtitle, Video};
