//! Motion blocks.
//!
//! A block is one pre-planned straight-line move: per-axis step counts
//! and directions plus the trapezoidal velocity profile the rate
//! controller executes. Blocks are produced by an external planner and
//! immutable once dispatched.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::axis::{Axis, NUM_AXES};
use crate::error::BlockError;

/// One planned motion block.
#[derive(Debug)]
pub struct Block {
    /// Target step count per axis.
    pub steps: [u32; NUM_AXES],

    /// Direction per axis (false = positive).
    pub direction: [bool; NUM_AXES],

    /// Largest per-axis step count; the length of the block in main-axis
    /// steps.
    pub steps_event_count: u32,

    /// Entry rate in steps per second.
    pub initial_rate: u32,

    /// Cruise rate in steps per second.
    pub nominal_rate: u32,

    /// Exit rate in steps per second.
    pub final_rate: u32,

    /// Peak rate the acceleration ramp aims for, in steps per second.
    pub max_rate: u32,

    /// Steps per second added or removed per acceleration tick.
    pub rate_delta: u32,

    /// Main-axis position where the acceleration ramp ends.
    pub accelerate_until: u32,

    /// Main-axis position where the deceleration ramp begins.
    pub decelerate_after: u32,

    /// Geometric length of the move in millimeters. Only used to reject
    /// zero-length moves.
    pub millimeters: f32,

    /// Hold count: how many consumers still need this block. Atomic
    /// because the planner observes it from outside the stepping context.
    times_taken: AtomicU32,
}

impl Block {
    /// Create a block from per-axis step counts and directions.
    ///
    /// Rates default to zero and the profile to all-cruise; fill them in
    /// with [`with_rates`](Self::with_rates) and
    /// [`with_acceleration`](Self::with_acceleration).
    pub fn new(steps: [u32; NUM_AXES], direction: [bool; NUM_AXES], millimeters: f32) -> Self {
        let steps_event_count = steps.iter().copied().max().unwrap_or(0);
        Self {
            steps,
            direction,
            steps_event_count,
            initial_rate: 0,
            nominal_rate: 0,
            final_rate: 0,
            max_rate: 0,
            rate_delta: 0,
            accelerate_until: 0,
            decelerate_after: steps_event_count,
            millimeters,
            times_taken: AtomicU32::new(0),
        }
    }

    /// Set the entry, cruise, exit, and peak rates (steps per second).
    pub fn with_rates(mut self, initial: u32, nominal: u32, final_rate: u32, max: u32) -> Self {
        self.initial_rate = initial;
        self.nominal_rate = nominal;
        self.final_rate = final_rate;
        self.max_rate = max;
        self
    }

    /// Set the discrete acceleration and the trapezoid segment bounds
    /// (main-axis step positions).
    pub fn with_acceleration(
        mut self,
        rate_delta: u32,
        accelerate_until: u32,
        decelerate_after: u32,
    ) -> Self {
        self.rate_delta = rate_delta;
        self.accelerate_until = accelerate_until;
        self.decelerate_after = decelerate_after;
        self
    }

    /// Check the block for planner mistakes: trapezoid boundaries must be
    /// ordered within the block and step counts must fit the position
    /// range.
    pub fn validate(&self) -> Result<(), BlockError> {
        if self.accelerate_until > self.decelerate_after
            || self.decelerate_after > self.steps_event_count
        {
            return Err(BlockError::InvalidTrapezoid {
                accelerate_until: self.accelerate_until,
                decelerate_after: self.decelerate_after,
                steps_event_count: self.steps_event_count,
            });
        }

        for axis in Axis::ALL {
            let steps = self.steps[axis.index()];
            if steps > i32::MAX as u32 {
                return Err(BlockError::StepsOutOfRange { axis, steps });
            }
        }

        Ok(())
    }

    /// Whether this block produces no motion (zero length or no steps on
    /// any axis).
    pub fn is_trivial(&self) -> bool {
        self.millimeters <= 0.0 || self.steps.iter().all(|&s| s == 0)
    }

    /// Register a consumer of this block.
    pub fn take(&self) {
        self.times_taken.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop one consumer. Returns `true` when the hold count reached
    /// zero and the producer may discard the block.
    pub fn release(&self) -> bool {
        let previous = self.times_taken.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "release without matching take");
        previous <= 1
    }

    /// Current hold count.
    pub fn times_taken(&self) -> u32 {
        self.times_taken.load(Ordering::Acquire)
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps,
            direction: self.direction,
            steps_event_count: self.steps_event_count,
            initial_rate: self.initial_rate,
            nominal_rate: self.nominal_rate,
            final_rate: self.final_rate,
            max_rate: self.max_rate,
            rate_delta: self.rate_delta,
            accelerate_until: self.accelerate_until,
            decelerate_after: self.decelerate_after,
            millimeters: self.millimeters,
            // A clone is a new block with no consumers.
            times_taken: AtomicU32::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_event_count_is_max() {
        let block = Block::new([1000, 500, 100], [false; NUM_AXES], 12.5);
        assert_eq!(block.steps_event_count, 1000);
        assert_eq!(block.decelerate_after, 1000);
    }

    #[test]
    fn test_validate_rejects_misordered_trapezoid() {
        let block = Block::new([1000, 0, 0], [false; NUM_AXES], 12.5)
            .with_rates(200, 2000, 200, 2000)
            .with_acceleration(40, 600, 450);

        assert!(matches!(
            block.validate(),
            Err(BlockError::InvalidTrapezoid { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_steps() {
        let block = Block::new([10, i32::MAX as u32 + 1, 0], [false; NUM_AXES], 1.0);
        assert!(matches!(
            block.validate(),
            Err(BlockError::StepsOutOfRange {
                axis: Axis::Beta,
                ..
            })
        ));
    }

    #[test]
    fn test_trivial_blocks() {
        assert!(Block::new([0, 0, 0], [false; NUM_AXES], 1.0).is_trivial());
        assert!(Block::new([10, 0, 0], [false; NUM_AXES], 0.0).is_trivial());
        assert!(!Block::new([10, 0, 0], [false; NUM_AXES], 1.0).is_trivial());
    }

    #[test]
    fn test_take_release_hold_count() {
        let block = Block::new([10, 0, 0], [false; NUM_AXES], 1.0);

        block.take();
        block.take();
        assert_eq!(block.times_taken(), 2);
        assert!(!block.release());
        assert!(block.release());
    }
}
