//! Step timer configuration.

use serde::Deserialize;

use super::units::Hertz;

/// Tick source configuration.
///
/// The step tick fires at `frequency_hz`; every
/// `frequency_hz / acceleration_ticks_per_sec` ticks the rate controller
/// recomputes actuator speeds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    /// Step tick frequency in Hz.
    #[serde(default = "default_frequency")]
    pub frequency_hz: Hertz,

    /// Acceleration ticks per second.
    #[serde(default = "default_acceleration_ticks")]
    pub acceleration_ticks_per_sec: u32,
}

fn default_frequency() -> Hertz {
    Hertz(100_000)
}

fn default_acceleration_ticks() -> u32 {
    1_000
}

impl TimerConfig {
    /// Step ticks between two acceleration ticks.
    pub fn acceleration_divider(&self) -> u32 {
        (self.frequency_hz.value() / self.acceleration_ticks_per_sec).max(1)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            frequency_hz: default_frequency(),
            acceleration_ticks_per_sec: default_acceleration_ticks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_divider() {
        let config = TimerConfig::default();
        assert_eq!(config.acceleration_divider(), 100);
    }
}
