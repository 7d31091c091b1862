//! Configuration module for step-motion.
//!
//! Provides types for loading and validating timer and actuator
//! configurations from TOML files (with `std` feature) or pre-parsed data.

mod actuator;
#[cfg(feature = "std")]
mod loader;
mod settings;
mod system;
mod timer;
pub mod units;
mod validation;

pub use actuator::ActuatorConfig;
pub use settings::ActuatorSettings;
pub use system::{AxisConfigs, SystemConfig};
pub use timer::TimerConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Hertz, Millimeters, StepsPerSec};
