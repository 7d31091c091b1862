//! Motion system facade.
//!
//! Owns the step timer, the three motors, the rate controller, and the
//! block dispatcher, and wires them together. External collaborators
//! appear twice: the integrator drives time by calling [`tick`] at the
//! timer frequency, and the conveyor/event bus are reached through
//! [`MotionHooks`].
//!
//! [`tick`]: MotionSystem::tick
//!
//! # Concurrency
//!
//! All state is reached through `&mut self`, so a hosted harness is
//! race-free by construction. On embedded targets where `tick` runs in
//! the step interrupt, wrap every other call (`begin_block`, `pause`,
//! `start_move`, ...) in the platform's critical section so it cannot
//! interleave with a tick.

use embedded_hal::digital::OutputPin;

use crate::axis::{Axis, NUM_AXES};
use crate::config::units::Millimeters;
use crate::config::SystemConfig;
use crate::error::Result;
use crate::motion::{Block, BlockDispatcher, MotionHooks, Trapezoid};
use crate::motor::StepperMotor;
use crate::timer::StepTimer;

/// STEP/DIR/EN outputs for one actuator.
pub struct ActuatorPins<P: OutputPin> {
    /// STEP pin.
    pub step: P,
    /// DIR pin.
    pub dir: P,
    /// Enable pin.
    pub enable: P,
}

/// Pin sets for all three axes.
pub struct AxisPins<P: OutputPin> {
    /// Alpha (X) actuator pins.
    pub alpha: ActuatorPins<P>,
    /// Beta (Y) actuator pins.
    pub beta: ActuatorPins<P>,
    /// Gamma (Z) actuator pins.
    pub gamma: ActuatorPins<P>,
}

/// The motion core: coordinated step generation for three axes.
pub struct MotionSystem<P: OutputPin> {
    timer: StepTimer,
    motors: [StepperMotor<P>; NUM_AXES],
    trapezoid: Trapezoid,
    dispatcher: BlockDispatcher,
}

impl<P: OutputPin> MotionSystem<P> {
    /// Build the system from a validated configuration and the pin sets
    /// for all axes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if validation fails.
    pub fn from_config(config: &SystemConfig, pins: AxisPins<P>) -> Result<Self> {
        crate::config::validate_config(config)?;

        let mut timer = StepTimer::from_config(&config.timer);
        let frequency = timer.frequency();

        let AxisPins { alpha, beta, gamma } = pins;
        let motors = [
            Self::build_motor(config, Axis::Alpha, alpha, frequency, &mut timer),
            Self::build_motor(config, Axis::Beta, beta, frequency, &mut timer),
            Self::build_motor(config, Axis::Gamma, gamma, frequency, &mut timer),
        ];

        let trapezoid = Trapezoid::new(timer.acceleration_ticks_per_sec());

        Ok(Self {
            timer,
            motors,
            trapezoid,
            dispatcher: BlockDispatcher::new(),
        })
    }

    fn build_motor(
        config: &SystemConfig,
        axis: Axis,
        pins: ActuatorPins<P>,
        frequency: u32,
        timer: &mut StepTimer,
    ) -> StepperMotor<P> {
        let settings = config.settings(axis);
        let index = timer.register_motor();
        StepperMotor::new(
            pins.step,
            pins.dir,
            pins.enable,
            &settings,
            config.actuator(axis).name.clone(),
            frequency,
            index,
        )
    }

    /// Advance the core by one tick of the step clock.
    ///
    /// Call at the configured frequency. Each tick advances every active
    /// motor, lowers the pulse lines raised during the tick, runs the
    /// rate controller when its divider fires, and delivers end-of-move
    /// signals.
    pub fn tick<H: MotionHooks>(&mut self, hooks: &mut H) {
        let frequency = self.timer.frequency();
        let mask = self.timer.active_mask();
        let mut stepped_mask: u32 = 0;

        for i in 0..NUM_AXES {
            if mask & (1 << i) == 0 {
                continue;
            }

            let outcome = self.motors[i].tick(frequency);
            if outcome.stepped {
                stepped_mask |= 1 << i;
            }
            if outcome.synchronize_acceleration {
                self.timer.synchronize_acceleration(true);
            }
            if outcome.move_finished {
                self.timer.note_move_finished();
                let active = self.motors[i].is_active();
                self.timer.set_active(i, active);
            }
        }

        // Two-phase stepping: pulses stay high until every motor has
        // ticked, so the pulse width is never shorter than the tick
        // processing itself.
        for i in 0..NUM_AXES {
            if stepped_mask & (1 << i) != 0 {
                self.motors[i].unstep();
            }
        }

        if self.timer.acceleration_tick_due() {
            self.dispatcher.acceleration_tick(
                &mut self.motors,
                &mut self.timer,
                &mut self.trapezoid,
                hooks,
            );
        }

        if self.timer.take_move_finished() {
            self.dispatcher.on_motors_finished(&self.motors, hooks);
        }
    }

    /// Begin executing a block.
    ///
    /// May be called from the `on_block_released` notification of the
    /// previous block (after the tick returns); motors still pulsing
    /// under `keep_moving` credit their extra steps to the new block.
    pub fn begin_block<H: MotionHooks>(&mut self, block: Block, hooks: &mut H) {
        self.dispatcher.begin(
            block,
            &mut self.motors,
            &mut self.timer,
            &mut self.trapezoid,
            hooks,
        );
    }

    /// Program a single-axis move directly, outside of block execution.
    ///
    /// Thin wrapper over [`StepperMotor::start_move`] that keeps the
    /// timer's active set and finished signal in step.
    pub fn start_move(&mut self, axis: Axis, direction: bool, steps: u32, initial_rate: u32) {
        let i = axis.index();
        if !self.motors[i].start_move(direction, steps, initial_rate) {
            self.timer.note_move_finished();
        }
        self.timer.set_active(i, self.motors[i].is_active());
    }

    /// Pause all motion. Progress and rates are retained.
    pub fn pause(&mut self) {
        self.dispatcher.pause(&mut self.motors, &mut self.timer);
    }

    /// Resume paused motion with no transient.
    pub fn resume(&mut self) {
        self.dispatcher.resume(&mut self.motors, &mut self.timer);
    }

    /// Disable the drivers and stop accepting blocks.
    pub fn halt(&mut self) {
        self.dispatcher.halt(&mut self.motors);
    }

    /// Re-enable block acceptance after a halt.
    pub fn clear_halt(&mut self) {
        self.dispatcher.clear_halt();
    }

    /// Drive all enable outputs on.
    pub fn enable_all(&mut self) {
        self.dispatcher.enable_all(&mut self.motors);
    }

    /// Drive all enable outputs off.
    pub fn disable_all(&mut self) {
        self.dispatcher.disable_all(&mut self.motors);
    }

    /// Whether every motor is idle and no block is in flight.
    pub fn is_idle(&self) -> bool {
        self.dispatcher.current_block().is_none() && self.motors.iter().all(|m| !m.is_moving())
    }

    /// Ratio of the current main-axis rate to the running block's cruise
    /// rate, if a block is in flight.
    pub fn speed_factor(&self) -> Option<f32> {
        self.dispatcher
            .current_block()
            .map(|block| self.trapezoid.speed_factor(block))
    }

    /// Current position of one axis.
    pub fn position(&self, axis: Axis) -> Millimeters {
        self.motors[axis.index()].current_position()
    }

    /// Access a motor.
    #[inline]
    pub fn motor(&self, axis: Axis) -> &StepperMotor<P> {
        &self.motors[axis.index()]
    }

    /// Mutable access to a motor.
    ///
    /// Active-set membership is the caller's responsibility when using
    /// this to program moves directly; prefer [`start_move`].
    ///
    /// [`start_move`]: MotionSystem::start_move
    #[inline]
    pub fn motor_mut(&mut self, axis: Axis) -> &mut StepperMotor<P> {
        &mut self.motors[axis.index()]
    }

    /// Access the step timer.
    #[inline]
    pub fn timer(&self) -> &StepTimer {
        &self.timer
    }

    /// Access the dispatcher.
    #[inline]
    pub fn dispatcher(&self) -> &BlockDispatcher {
        &self.dispatcher
    }
}
