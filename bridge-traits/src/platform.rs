//! Thread-safety markers shared by every bridge trait.
//!
//! Host players, command centers and audio sessions are called from the
//! session's UI task and from host callback contexts at the same time, so
//! native implementations must be shareable across threads. `wasm32` builds
//! run on a single thread and wrap objects that cannot be `Send`, so the
//! bounds collapse to nothing there.

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}
