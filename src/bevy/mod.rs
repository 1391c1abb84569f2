//! Bevy engine integration
//!
//! Components, resources, systems, plugins, and application setup for the
//! offscreen fan scene.

pub mod app;
pub mod components;
pub mod plugins;
pub mod resources;
pub mod systems;

pub use app::{start_bevy, BevyBridge};
