//! Bevy component definitions
//!
//! Marker components that tag the parts of the fan model the animator
//! needs to find again every frame.

use bevy::prelude::*;

/// Marker component for the offscreen rendering camera
#[derive(Component)]
pub struct OffscreenCamera;

/// Root of the fan model. Receives the pointer tilt.
#[derive(Component)]
pub struct FanBody;

/// Group holding the blades. Receives the spin rotation about Z.
#[derive(Component)]
pub struct BladeAssembly;

/// One blade, identified by its slot around the hub
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blade(pub u32);

/// Rounded cap at the end of a blade
#[derive(Component)]
pub struct BladeTip;
