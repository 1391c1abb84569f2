//! Bevy plugins
//!
//! Custom plugins that extend the engine for offscreen rendering.

pub mod image_copy;

pub use image_copy::ImageCopyPlugin;
