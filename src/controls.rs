//! Page-level control state
//!
//! The spin flag, the toggle click counter and the decorative fan speed
//! slider. The page owns this state through Tauri commands; the Bevy world
//! only ever reads the spin flag.

use serde::{Deserialize, Serialize};

use crate::config::slider::{FAN_SPEED_DEFAULT, FAN_SPEED_MAX, FAN_SPEED_MIN};

/// Controls shown on the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FanControls {
    spinning: bool,
    clicks: u32,
    fan_speed: u8,
}

/// Copy of the controls handed back to the page after every change
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControlsSnapshot {
    pub spinning: bool,
    pub clicks: u32,
    pub fan_speed: u8,
}

impl Default for FanControls {
    fn default() -> Self {
        Self {
            spinning: false,
            clicks: 0,
            fan_speed: FAN_SPEED_DEFAULT,
        }
    }
}

impl FanControls {
    pub fn spinning(&self) -> bool {
        self.spinning
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Current slider position. Nothing reads this for behaviour.
    pub fn fan_speed(&self) -> u8 {
        self.fan_speed
    }

    /// Flip the spin flag and count the click
    pub fn toggle_spin(&mut self) -> ControlsSnapshot {
        self.spinning = !self.spinning;
        self.clicks = self.clicks.saturating_add(1);
        self.snapshot()
    }

    /// Move the slider. Only the slider value changes.
    pub fn set_fan_speed(&mut self, value: u8) -> ControlsSnapshot {
        self.fan_speed = value.clamp(FAN_SPEED_MIN, FAN_SPEED_MAX);
        self.snapshot()
    }

    pub fn snapshot(&self) -> ControlsSnapshot {
        ControlsSnapshot {
            spinning: self.spinning(),
            clicks: self.clicks(),
            fan_speed: self.fan_speed(),
        }
    }
}
