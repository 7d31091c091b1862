//! Configuration validation.

use crate::axis::Axis;
use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Tick frequency is positive
/// - Acceleration tick rate is positive and divides the tick frequency
/// - Each actuator has positive steps-per-mm and max rate
/// - Each actuator's minimum rate is at least 1 and below the tick frequency
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    let frequency = config.timer.frequency_hz.value();
    let ticks = config.timer.acceleration_ticks_per_sec;

    if frequency == 0 {
        return Err(Error::Config(ConfigError::InvalidFrequency(frequency)));
    }

    if ticks == 0 || ticks > frequency || frequency % ticks != 0 {
        return Err(Error::Config(ConfigError::InvalidAccelerationTicks {
            frequency,
            ticks,
        }));
    }

    for axis in Axis::ALL {
        validate_actuator(config, axis)?;
    }

    Ok(())
}

fn validate_actuator(config: &SystemConfig, axis: Axis) -> Result<()> {
    let actuator = config.actuator(axis);

    if actuator.steps_per_mm <= 0.0 || !actuator.steps_per_mm.is_finite() {
        return Err(Error::Config(ConfigError::InvalidStepsPerMm(
            actuator.steps_per_mm,
        )));
    }

    if actuator.max_rate <= 0.0 || !actuator.max_rate.is_finite() {
        return Err(Error::Config(ConfigError::InvalidMaxRate(actuator.max_rate)));
    }

    let minimum = actuator.minimum_rate.value();
    if minimum == 0 || minimum >= config.timer.frequency_hz.value() {
        return Err(Error::Config(ConfigError::InvalidMinimumRate(minimum)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_toml() -> &'static str {
        r#"
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
"#
    }

    #[test]
    fn test_valid_config_passes() {
        let config: SystemConfig = toml::from_str(valid_toml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_non_dividing_acceleration_ticks_rejected() {
        let mut config: SystemConfig = toml::from_str(valid_toml()).unwrap();
        config.timer.acceleration_ticks_per_sec = 3_000;

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidAccelerationTicks { .. })
        ));
    }

    #[test]
    fn test_zero_steps_per_mm_rejected() {
        let mut config: SystemConfig = toml::from_str(valid_toml()).unwrap();
        config.actuators.beta.steps_per_mm = 0.0;

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidStepsPerMm(_))));
    }

    #[test]
    fn test_minimum_rate_above_frequency_rejected() {
        let mut config: SystemConfig = toml::from_str(valid_toml()).unwrap();
        config.actuators.gamma.minimum_rate = crate::config::units::StepsPerSec(200_000);

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidMinimumRate(_))));
    }
}
