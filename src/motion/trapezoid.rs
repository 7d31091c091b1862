//! Trapezoidal rate controller.
//!
//! Recomputes the main-axis step rate once per acceleration tick as a
//! function of its position within the current block, and derives the
//! rates of the other axes from it so all axes cross the finish line
//! together.

use libm::sqrtf;

use super::block::Block;

/// Result of one acceleration tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUpdate {
    /// The block continues at this main-axis rate.
    Running(u32),
    /// A flush decelerated the block down to its rate floor; the caller
    /// must stop all motors and release the block.
    Stopped,
}

/// Per-block rate controller state.
#[derive(Debug, Clone)]
pub struct Trapezoid {
    /// Main-axis rate computed on the previous acceleration tick.
    previous_main_rate: u32,

    /// Main-axis `stepped` snapshot from the previous acceleration tick.
    /// Secondary-axis rates are derived against this position so rate and
    /// position come from the same instant.
    previous_main_pos: u32,

    /// Acceleration ticks per second, for the deceleration look-ahead.
    acceleration_ticks_per_sec: u32,
}

impl Trapezoid {
    /// Create a rate controller.
    pub fn new(acceleration_ticks_per_sec: u32) -> Self {
        Self {
            previous_main_rate: 0,
            previous_main_pos: 0,
            acceleration_ticks_per_sec,
        }
    }

    /// Bind to a new block: start from its entry rate at position zero.
    pub fn reset(&mut self, block: &Block) {
        self.previous_main_rate = block.initial_rate;
        self.previous_main_pos = 0;
    }

    /// Main-axis rate from the previous acceleration tick.
    #[inline]
    pub fn current_rate(&self) -> u32 {
        self.previous_main_rate
    }

    /// Ratio of the current main rate to the block's cruise rate.
    ///
    /// Outer layers use this to scale rate-dependent behavior (an
    /// extruder following actual speed, for example).
    pub fn speed_factor(&self, block: &Block) -> f32 {
        self.previous_main_rate as f32 / block.nominal_rate as f32
    }

    /// Compute the main-axis rate for this acceleration tick.
    ///
    /// `main_pos` is the main motor's current `stepped` count. With
    /// `flushing` set the block decelerates by `rate_delta` per tick
    /// regardless of position and reports [`RateUpdate::Stopped`] once it
    /// reaches the rate floor.
    pub fn tick(&mut self, block: &Block, main_pos: u32, flushing: bool) -> RateUpdate {
        let mut main_rate = self.previous_main_rate;

        // Never decelerate fully to zero: the acceleration tick runs
        // separately from stepping, so a few steps may remain when the
        // profile bottoms out. Stopping straight from min_rate is safe.
        let min_rate = block.rate_delta / 2;

        if flushing {
            // Abort in progress: slow down and stop.
            if main_rate > min_rate {
                main_rate = main_rate.saturating_sub(block.rate_delta);
            } else {
                return RateUpdate::Stopped;
            }
        } else if main_pos >= block.steps_event_count {
            // Block is changing now; coast down until the next move
            // activates.
            main_rate = main_rate.saturating_sub(block.rate_delta);
        } else if main_pos < block.accelerate_until {
            // Beginning of the move, accelerate.
            let initial_rate = block.initial_rate.max(min_rate);
            main_rate = quadratic_interpolate(
                main_pos as f32,
                0.0,
                initial_rate as f32,
                block.accelerate_until as f32,
                block.max_rate as f32,
            );
        } else if main_pos >= block.decelerate_after {
            // End of the move, decelerate. Aim for the speed we should
            // have at the end of this acceleration interval, not at the
            // current position, so the ramp is not one interval late.
            let end_pos = main_pos + main_rate / self.acceleration_ticks_per_sec;
            let final_rate = block.final_rate.max(min_rate);
            main_rate = quadratic_interpolate(
                end_pos as f32,
                block.decelerate_after as f32,
                block.max_rate as f32,
                block.steps_event_count as f32,
                final_rate as f32,
            );
        } else {
            // Middle of the move, cruise.
            main_rate = block.nominal_rate;
        }

        if main_rate < min_rate {
            main_rate = min_rate;
        }

        self.previous_main_rate = main_rate;
        self.previous_main_pos = main_pos;

        RateUpdate::Running(main_rate)
    }

    /// Derive a secondary axis rate from the main axis.
    ///
    /// The axis should finish its remaining steps in the same time the
    /// main axis finishes its own at the current rate:
    ///
    /// ```text
    /// rate = remaining_other * previous_main_rate / remaining_main
    /// ```
    ///
    /// Recomputed every acceleration tick, not only on speed changes, so
    /// integer rounding errors cannot accumulate into a late or early
    /// finish. Once either side has finished the rate is left untouched.
    pub fn secondary_rate(
        &self,
        main_steps_to_move: u32,
        stepped: u32,
        steps_to_move: u32,
        current_rate: u32,
    ) -> u32 {
        if self.previous_main_pos >= main_steps_to_move || stepped >= steps_to_move {
            // One of the two already finished; keep the current rate to
            // avoid jerking whatever is left.
            return current_rate;
        }

        let remaining_main = (main_steps_to_move - self.previous_main_pos) as u64;
        let numerator = (steps_to_move - stepped) as u64 * self.previous_main_rate as u64;
        ((numerator + remaining_main / 2) / remaining_main) as u32
    }
}

/// Step rate at position `x` when it should be `v1` at `x1` and `v2` at
/// `x2`. Under constant acceleration v² is linear in position, so the
/// squares are interpolated linearly and the root taken.
fn quadratic_interpolate(x: f32, x1: f32, v1: f32, x2: f32, v2: f32) -> u32 {
    if x <= x1 {
        return v1 as u32;
    }
    if x >= x2 {
        return v2 as u32;
    }

    let y1 = v1 * v1;
    let y2 = v2 * v2;
    let y = (y2 - y1) * (x - x1) / (x2 - x1) + y1;
    sqrtf(y) as u32
}
