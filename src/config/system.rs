//! System configuration - root configuration structure.

use serde::Deserialize;

use crate::axis::Axis;

use super::actuator::ActuatorConfig;
use super::settings::ActuatorSettings;
use super::timer::TimerConfig;

/// Per-axis table of actuator configurations.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfigs {
    /// Alpha (X) actuator.
    pub alpha: ActuatorConfig,
    /// Beta (Y) actuator.
    pub beta: ActuatorConfig,
    /// Gamma (Z) actuator.
    pub gamma: ActuatorConfig,
}

impl AxisConfigs {
    /// Get the configuration for one axis.
    pub fn get(&self, axis: Axis) -> &ActuatorConfig {
        match axis {
            Axis::Alpha => &self.alpha,
            Axis::Beta => &self.beta,
            Axis::Gamma => &self.gamma,
        }
    }
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Tick source configuration.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Actuator configurations, one per axis.
    pub actuators: AxisConfigs,
}

impl SystemConfig {
    /// Get an actuator configuration by axis.
    pub fn actuator(&self, axis: Axis) -> &ActuatorConfig {
        self.actuators.get(axis)
    }

    /// Derive the runtime settings for one axis.
    pub fn settings(&self, axis: Axis) -> ActuatorSettings {
        ActuatorSettings::from_config(self.actuators.get(axis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SystemConfig {
        let toml = r#"
[timer]
frequency_hz = 100000
acceleration_ticks_per_sec = 1000

[actuators.alpha]
name = "X"
steps_per_mm = 80.0
max_rate_mm_per_sec = 500.0

[actuators.beta]
name = "Y"
steps_per_mm = 80.0
max_rate_mm_per_sec = 500.0

[actuators.gamma]
name = "Z"
steps_per_mm = 400.0
max_rate_mm_per_sec = 30.0
minimum_rate = 10
invert_direction = true
"#;
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_axis_lookup() {
        let config = test_config();

        assert_eq!(config.actuator(Axis::Alpha).name.as_str(), "X");
        assert_eq!(config.actuator(Axis::Gamma).name.as_str(), "Z");
        assert!(config.actuator(Axis::Gamma).invert_direction);
    }

    #[test]
    fn test_timer_defaults_apply() {
        let toml = r#"
[actuators.alpha]
name = "X"
steps_per_mm = 80.0
max_rate_mm_per_sec = 500.0

[actuators.beta]
name = "Y"
steps_per_mm = 80.0
max_rate_mm_per_sec = 500.0

[actuators.gamma]
name = "Z"
steps_per_mm = 400.0
max_rate_mm_per_sec = 30.0
"#;
        let config: SystemConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.timer.frequency_hz.value(), 100_000);
        assert_eq!(config.timer.acceleration_ticks_per_sec, 1_000);
    }

    #[test]
    fn test_derived_settings() {
        let config = test_config();
        let settings = config.settings(Axis::Gamma);

        // 30 mm/sec * 400 steps/mm = 12000 steps/sec
        assert_eq!(settings.max_rate_steps_per_sec, 12_000);
        assert_eq!(settings.minimum_rate, 10);
        assert!(settings.invert_direction);
    }
}
