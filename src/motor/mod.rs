//! Motor module for step-motion.
//!
//! Provides the per-axis step pulse generator with position tracking.

mod position;
mod state;
mod stepper;

pub use position::Position;
pub use state::MotorState;
pub use stepper::{StepperMotor, TickOutcome};
