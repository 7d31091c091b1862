//! Position tracking for stepper actuators.
//!
//! Maintains the signed step position alongside the last milestone the
//! outer layers committed in millimeters, so steps-per-mm changes and
//! milestone updates stay consistent with the step counter.

use libm::roundf;

use crate::config::units::Millimeters;

/// Actuator position tracker.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    /// Current position in steps (signed, from origin).
    steps: i32,
    /// Steps per millimeter for conversions.
    steps_per_mm: f32,
    /// Step position of the last committed milestone.
    last_milestone_steps: i32,
    /// Millimeter position of the last committed milestone.
    last_milestone_mm: f32,
}

impl Position {
    /// Create a new position tracker at the origin.
    #[inline]
    pub fn new(steps_per_mm: f32) -> Self {
        Self {
            steps: 0,
            steps_per_mm,
            last_milestone_steps: 0,
            last_milestone_mm: 0.0,
        }
    }

    /// Get the current position in steps.
    #[inline]
    pub fn steps(&self) -> i32 {
        self.steps
    }

    /// Get the current position in millimeters.
    #[inline]
    pub fn millimeters(&self) -> Millimeters {
        Millimeters(self.steps as f32 / self.steps_per_mm)
    }

    /// Move by a number of steps.
    #[inline]
    pub fn move_steps(&mut self, delta: i32) {
        self.steps += delta;
    }

    /// Get the steps per millimeter conversion factor.
    #[inline]
    pub fn steps_per_mm(&self) -> f32 {
        self.steps_per_mm
    }

    /// Change the steps-per-mm factor, re-deriving the step position from
    /// the last milestone so the physical position is preserved.
    pub fn change_steps_per_mm(&mut self, steps_per_mm: f32) {
        self.steps_per_mm = steps_per_mm;
        self.last_milestone_steps = roundf(self.last_milestone_mm * steps_per_mm) as i32;
        self.steps = self.last_milestone_steps;
    }

    /// Commit a new milestone position in millimeters.
    pub fn change_last_milestone(&mut self, milestone: Millimeters) {
        self.last_milestone_mm = milestone.value();
        self.last_milestone_steps = roundf(self.last_milestone_mm * self.steps_per_mm) as i32;
        self.steps = self.last_milestone_steps;
    }

    /// Get the last committed milestone.
    #[inline]
    pub fn last_milestone(&self) -> Millimeters {
        Millimeters(self.last_milestone_mm)
    }

    /// Steps needed to reach a target position, measured from the last
    /// milestone.
    #[inline]
    pub fn steps_to_target(&self, target: Millimeters) -> i32 {
        let target_steps = roundf(target.value() * self.steps_per_mm) as i32;
        target_steps - self.last_milestone_steps
    }
}
