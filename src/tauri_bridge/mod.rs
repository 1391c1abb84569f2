//! Bridge layer between Tauri and Bevy
//!
//! Command handlers the page invokes, the `frame://` protocol, and the
//! thread-safe state both sides share.

pub mod commands;
pub mod error;
pub mod protocol;
pub mod shared_state;

pub use error::BridgeError;
pub use shared_state::{SharedFanControls, SharedFrameBuffer, SharedPointer, SharedRenderStats};
