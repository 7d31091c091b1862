//! Block dispatcher.
//!
//! Owns the block currently being executed: programs the motors when a
//! block begins, selects the main axis, runs the rate controller on each
//! acceleration tick, and releases the block once every axis has
//! finished.

use embedded_hal::digital::OutputPin;

use crate::axis::{Axis, NUM_AXES};
use crate::motor::StepperMotor;
use crate::timer::StepTimer;

use super::block::Block;
use super::hooks::MotionHooks;
use super::trapezoid::{RateUpdate, Trapezoid};

/// Block lifecycle and motor programming.
#[derive(Debug)]
pub struct BlockDispatcher {
    /// The block being executed, if any.
    current_block: Option<Block>,

    /// Axis with the largest step count in the current block; all other
    /// axes are slaved to it.
    main_axis: Axis,

    /// Whether the enable outputs are currently driven.
    enable_pins_on: bool,

    /// Motion is paused; the rate controller idles and all motors are
    /// out of the active set.
    paused: bool,

    /// Drivers are disabled and new blocks are not accepted.
    halted: bool,
}

impl BlockDispatcher {
    /// Create an idle dispatcher. Steppers start off disabled.
    pub fn new() -> Self {
        Self {
            current_block: None,
            main_axis: Axis::Alpha,
            enable_pins_on: false,
            paused: false,
            halted: false,
        }
    }

    /// The block currently being executed.
    #[inline]
    pub fn current_block(&self) -> Option<&Block> {
        self.current_block.as_ref()
    }

    /// Main axis of the current block.
    #[inline]
    pub fn main_axis(&self) -> Axis {
        self.main_axis
    }

    /// Whether motion is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the dispatcher is halted.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether the enable outputs are driven.
    #[inline]
    pub fn enable_pins_on(&self) -> bool {
        self.enable_pins_on
    }

    /// Begin executing a block.
    ///
    /// Blocks with zero length or no steps on any axis advance trivially:
    /// every motor gets a zero-step move and the block is released
    /// immediately. The same happens while halted, so a conveyor that
    /// keeps feeding blocks into a halted core drains instead of
    /// wedging.
    pub(crate) fn begin<P: OutputPin, H: MotionHooks>(
        &mut self,
        block: Block,
        motors: &mut [StepperMotor<P>; NUM_AXES],
        timer: &mut StepTimer,
        trapezoid: &mut Trapezoid,
        hooks: &mut H,
    ) {
        debug_assert!(block.validate().is_ok(), "planner produced an invalid block");

        if self.halted || block.is_trivial() {
            for axis in Axis::ALL {
                Self::command_move(motors, timer, axis, false, 0);
            }
            hooks.on_block_released();
            return;
        }

        block.take();

        // If the block's exit speed is above one acceleration step, keep
        // the motors pulsing between blocks to avoid a jerk; the extra
        // steps are credited to the next move.
        let keep_moving = block.final_rate > block.rate_delta;

        // We can't move with the enable pins off.
        if !self.enable_pins_on {
            self.enable_all(motors);
        }

        // Program every motor and find the one with the most steps; the
        // rate calculations will follow it. Ties keep the earlier axis.
        let mut main_axis = Axis::Alpha;
        let mut main_steps = 0;
        for axis in Axis::ALL {
            let steps = block.steps[axis.index()];
            if steps > 0 {
                Self::command_move(motors, timer, axis, block.direction[axis.index()], steps);
                let motor = &mut motors[axis.index()];
                motor.set_keep_moving(keep_moving);

                // Compare after overshoot crediting, which may have
                // shrunk or flipped the programmed move.
                if motor.steps_to_move() > main_steps {
                    main_steps = motor.steps_to_move();
                    main_axis = axis;
                }
            } else {
                Self::command_move(motors, timer, axis, false, 0);
            }
        }

        self.main_axis = main_axis;
        trapezoid.reset(&block);
        self.current_block = Some(block);

        // Install the entry rate on all axes right away.
        self.acceleration_tick(motors, timer, trapezoid, hooks);

        // Re-phase the acceleration tick to the block start so it does
        // not drift and fire at a random point within the block.
        timer.synchronize_acceleration(false);

        // Fire an acceleration tick on the first step into the
        // deceleration ramp, which starts only once the position is past
        // decelerate_after.
        if let Some(block) = &self.current_block {
            let main = &mut motors[self.main_axis.index()];
            if block.decelerate_after > 0 && block.decelerate_after + 1 < main.steps_to_move() {
                main.set_signal_step(block.decelerate_after + 1);
            }
        }
    }

    /// Run the rate controller for one acceleration tick.
    pub(crate) fn acceleration_tick<P: OutputPin, H: MotionHooks>(
        &mut self,
        motors: &mut [StepperMotor<P>; NUM_AXES],
        timer: &mut StepTimer,
        trapezoid: &mut Trapezoid,
        hooks: &mut H,
    ) {
        let main = self.main_axis.index();

        let update = match &self.current_block {
            Some(block) if !self.paused && motors[main].is_moving() => {
                trapezoid.tick(block, motors[main].stepped(), hooks.is_flushing())
            }
            _ => return,
        };

        match update {
            RateUpdate::Stopped => {
                // Flush bottomed out: stop every motor where it stands
                // and hand the block back.
                for axis in Axis::ALL {
                    let direction = motors[axis.index()].direction();
                    Self::command_move(motors, timer, axis, direction, 0);
                }
                if let Some(block) = self.current_block.take() {
                    block.release();
                    hooks.on_block_released();
                }
                hooks.on_speed_change(0);
            }
            RateUpdate::Running(main_rate) => {
                motors[main].set_rate(main_rate);

                // Secondary rates are re-derived every tick even when the
                // main rate did not change, so rounding errors cannot
                // accumulate across the block.
                for axis in Axis::ALL {
                    let i = axis.index();
                    if i != main && motors[i].is_moving() {
                        let rate = trapezoid.secondary_rate(
                            motors[main].steps_to_move(),
                            motors[i].stepped(),
                            motors[i].steps_to_move(),
                            motors[i].rate(),
                        );
                        motors[i].set_rate(rate);
                    }
                }

                hooks.on_speed_change(main_rate);
            }
        }
    }

    /// Handle the end-of-move signal: once every motor reports finished,
    /// release the block.
    ///
    /// With pipelining the next block may already have re-armed the
    /// motors before this runs; the finished check then fails and the
    /// signal is a no-op.
    pub(crate) fn on_motors_finished<P: OutputPin, H: MotionHooks>(
        &mut self,
        motors: &[StepperMotor<P>; NUM_AXES],
        hooks: &mut H,
    ) {
        if !motors.iter().all(|m| m.is_move_finished()) {
            return;
        }

        if let Some(block) = self.current_block.take() {
            block.release();
            hooks.on_block_released();
        }
    }

    /// Pause all motors. Every motor keeps its progress and rate.
    pub(crate) fn pause<P: OutputPin>(
        &mut self,
        motors: &mut [StepperMotor<P>; NUM_AXES],
        timer: &mut StepTimer,
    ) {
        self.paused = true;
        for axis in Axis::ALL {
            motors[axis.index()].pause();
            timer.set_active(axis.index(), false);
        }
    }

    /// Resume paused motors exactly where they stopped.
    pub(crate) fn resume<P: OutputPin>(
        &mut self,
        motors: &mut [StepperMotor<P>; NUM_AXES],
        timer: &mut StepTimer,
    ) {
        self.paused = false;
        for axis in Axis::ALL {
            let motor = &mut motors[axis.index()];
            motor.unpause();
            timer.set_active(axis.index(), motor.is_active());
        }
    }

    /// Disable the drivers and stop accepting blocks. Anything already
    /// in flight quiesces on its own.
    pub(crate) fn halt<P: OutputPin>(&mut self, motors: &mut [StepperMotor<P>; NUM_AXES]) {
        self.disable_all(motors);
        self.halted = true;
    }

    /// Re-enable block acceptance after a halt.
    pub(crate) fn clear_halt(&mut self) {
        self.halted = false;
    }

    /// Drive all enable outputs on.
    pub(crate) fn enable_all<P: OutputPin>(&mut self, motors: &mut [StepperMotor<P>; NUM_AXES]) {
        for motor in motors.iter_mut() {
            motor.enable(true);
        }
        self.enable_pins_on = true;
    }

    /// Drive all enable outputs off.
    pub(crate) fn disable_all<P: OutputPin>(&mut self, motors: &mut [StepperMotor<P>; NUM_AXES]) {
        for motor in motors.iter_mut() {
            motor.enable(false);
        }
        self.enable_pins_on = false;
    }

    /// Program one motor and keep the timer's bookkeeping in step: a
    /// trivial move raises the finished signal, and active-set
    /// membership always reflects the motor's new state.
    fn command_move<P: OutputPin>(
        motors: &mut [StepperMotor<P>; NUM_AXES],
        timer: &mut StepTimer,
        axis: Axis,
        direction: bool,
        steps: u32,
    ) {
        let motor = &mut motors[axis.index()];
        if !motor.start_move(direction, steps, 0) {
            timer.note_move_finished();
        }
        timer.set_active(axis.index(), motor.is_active());
    }
}

impl Default for BlockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
