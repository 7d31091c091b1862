//! Derived runtime actuator parameters.

use super::actuator::ActuatorConfig;

/// Runtime parameters for one actuator, computed once at initialization.
#[derive(Debug, Clone)]
pub struct ActuatorSettings {
    /// Steps per millimeter of travel.
    pub steps_per_mm: f32,

    /// Step rate floor in steps per second.
    pub minimum_rate: u32,

    /// Maximum feed rate in millimeters per second.
    pub max_rate: f32,

    /// Maximum feed rate in steps per second.
    pub max_rate_steps_per_sec: u32,

    /// Whether the direction pin logic is inverted.
    pub invert_direction: bool,
}

impl ActuatorSettings {
    /// Compute runtime settings from an actuator configuration.
    pub fn from_config(config: &ActuatorConfig) -> Self {
        Self {
            steps_per_mm: config.steps_per_mm,
            minimum_rate: config.minimum_rate.value(),
            max_rate: config.max_rate,
            max_rate_steps_per_sec: config.max_rate_steps_per_sec(),
            invert_direction: config.invert_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::StepsPerSec;

    #[test]
    fn test_from_config() {
        let config = ActuatorConfig {
            name: heapless::String::try_from("beta").unwrap(),
            steps_per_mm: 160.0,
            max_rate: 250.0,
            minimum_rate: StepsPerSec(15),
            invert_direction: true,
        };

        let settings = ActuatorSettings::from_config(&config);
        assert_eq!(settings.max_rate_steps_per_sec, 40_000);
        assert_eq!(settings.minimum_rate, 15);
        assert!(settings.invert_direction);
    }
}
