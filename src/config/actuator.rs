//! Per-axis actuator configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::StepsPerSec;

/// Complete actuator configuration for one axis.
#[derive(Debug, Clone, Deserialize)]
pub struct ActuatorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Full steps per millimeter of carriage travel (including microstepping).
    pub steps_per_mm: f32,

    /// Maximum feed rate in millimeters per second.
    #[serde(rename = "max_rate_mm_per_sec")]
    pub max_rate: f32,

    /// Step rate floor in steps per second. Rates below this are clamped
    /// up so progress tracking never stalls.
    #[serde(default = "default_minimum_rate")]
    pub minimum_rate: StepsPerSec,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,
}

fn default_minimum_rate() -> StepsPerSec {
    StepsPerSec(20)
}

impl ActuatorConfig {
    /// Maximum feed rate expressed in steps per second.
    pub fn max_rate_steps_per_sec(&self) -> u32 {
        (self.max_rate * self.steps_per_mm) as u32
    }
}
