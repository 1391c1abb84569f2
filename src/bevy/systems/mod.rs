//! Bevy systems
//!
//! Scene construction, the per-frame fan animator, and frame publishing.

pub mod animation;
pub mod frame_extraction;
pub mod scene;

pub use animation::animate_fan;
pub use frame_extraction::extract_and_process_frame;
pub use scene::setup_scene;
