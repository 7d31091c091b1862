//! # step-motion
//!
//! Tick-driven stepper motion core: converts pre-planned motion blocks
//! into precisely timed step pulses on three coordinated axes.
//!
//! ## Features
//!
//! - **Tick-driven**: the integrator calls [`MotionSystem::tick`] at a
//!   fixed frequency (a hardware timer interrupt on real targets, a
//!   plain loop in tests); pulse generation is an exact integer rate
//!   accumulator with at most one tick of jitter
//! - **Trapezoidal rate control**: accel/cruise/decel segments with a
//!   constant-acceleration square-root curve, recomputed at a
//!   configurable acceleration tick rate
//! - **Coordinated axes**: secondary axes are slaved to the main axis
//!   every acceleration tick so all axes finish a block together
//! - **Pipelined blocks**: motors keep pulsing across block boundaries
//!   when the exit speed warrants it; overshoot steps are credited to
//!   the next move
//! - **Configuration-driven**: timer and actuator parameters from TOML
//! - **embedded-hal 1.0**: `OutputPin` for STEP/DIR/EN outputs
//! - **no_std compatible**: the core works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use step_motion::{Axis, Block, MotionSystem};
//!
//! // Load configuration from TOML
//! let config = step_motion::load_config("motion.toml")?;
//!
//! // Wire the actuator pins and build the core
//! let mut system = MotionSystem::from_config(&config, pins)?;
//!
//! // Dispatch a planned block and drive the tick
//! system.begin_block(block, &mut hooks);
//! loop {
//!     system.tick(&mut hooks); // at timer.frequency_hz
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): enables TOML file loading
//! - `defmt`: derives `defmt::Format` on public data types

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod timer;

mod system;

// Re-exports for ergonomic API
pub use axis::{Axis, NUM_AXES};
pub use error::{Error, Result};
pub use motion::{Block, BlockDispatcher, MotionHooks, RateUpdate, Trapezoid};
pub use motor::{MotorState, Position, StepperMotor, TickOutcome};
pub use system::{ActuatorPins, AxisPins, MotionSystem};
pub use timer::StepTimer;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Hertz, Millimeters, StepsPerSec};
