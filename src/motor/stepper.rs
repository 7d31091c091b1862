//! Per-axis step pulse generator.
//!
//! One `StepperMotor` per axis, advanced from the step tick. Pulse
//! generation is a Bresenham-style rate accumulator: every tick the
//! current rate is added to an accumulator, and a pulse is emitted each
//! time the accumulator crosses the tick frequency. This produces `rate`
//! pulses per second on average with at most one tick of jitter, and
//! stays numerically exact over arbitrarily long moves.
//!
//! All mutation flows through `&mut` from a single call tree. On targets
//! where the step tick runs in an interrupt, wrap calls made outside the
//! tick (`start_move`, `set_rate`, `pause`, ...) in the platform's
//! critical section so they cannot interleave with a tick.

use embedded_hal::digital::OutputPin;

use crate::config::units::Millimeters;
use crate::config::ActuatorSettings;

use super::position::Position;
use super::state::MotorState;

/// What a single tick of one motor produced.
///
/// The tick source applies these signals after the motor returns; the
/// hot path stays free of indirect calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickOutcome {
    /// A step pulse line was raised; it must be lowered after all motors
    /// have ticked.
    pub stepped: bool,
    /// The motor crossed its signal step; re-phase the acceleration tick
    /// to fire immediately.
    pub synchronize_acceleration: bool,
    /// The motor reached its target step count on this tick.
    pub move_finished: bool,
}

/// Stepper motor driver for one axis.
///
/// Generic over `P`, the pin type for STEP/DIR/EN outputs (must
/// implement `OutputPin`).
pub struct StepperMotor<P: OutputPin> {
    /// STEP pin (pulse to move one step).
    step_pin: P,

    /// DIR pin.
    dir_pin: P,

    /// Enable pin.
    en_pin: P,

    /// Current step rate in steps per second. The accumulator only
    /// advances for motors in the active set, so an idle motor's rate is
    /// simply left behind.
    rate: u32,

    /// Rate accumulator driving pulse generation.
    tick_accumulator: u32,

    /// Target step count of the current move.
    steps_to_move: u32,

    /// Steps emitted since the move started. Keeps counting past
    /// `steps_to_move` while the motor is overshooting into the next
    /// block; the surplus is credited by the next `start_move`.
    stepped: u32,

    /// When `stepped` reaches this value, request an immediate
    /// acceleration tick. Zero disables the signal.
    signal_step: u32,

    /// Current direction (false = positive).
    direction: bool,

    /// A move is in progress (or the motor is overshooting).
    moving: bool,

    /// Motor is paused; it keeps all state but leaves the active set.
    paused: bool,

    /// The current move reached its target.
    is_move_finished: bool,

    /// Keep pulsing at the current rate after the move finishes, so the
    /// step stream does not stall between pipelined blocks.
    keep_moving: bool,

    /// Step rate floor in steps per second.
    minimum_rate: u32,

    /// Step rate ceiling; one pulse per tick is the physical limit.
    maximum_rate: u32,

    /// Maximum feed rate in mm/sec, used by outer layers for planning.
    max_rate: f32,

    /// Signed position and millimeter milestones.
    position: Position,

    /// Whether the direction pin logic is inverted.
    invert_direction: bool,

    /// Actuator name from configuration, for diagnostics.
    name: heapless::String<32>,

    /// Index assigned by the step timer at registration.
    index: usize,
}

impl<P: OutputPin> StepperMotor<P> {
    /// Create a motor from its pins and derived settings.
    ///
    /// `tick_frequency` is the step tick rate in Hz; requested step rates
    /// are clamped to it. `index` is the slot returned by
    /// [`crate::StepTimer::register_motor`].
    pub fn new(
        step_pin: P,
        dir_pin: P,
        en_pin: P,
        settings: &ActuatorSettings,
        name: heapless::String<32>,
        tick_frequency: u32,
        index: usize,
    ) -> Self {
        let mut motor = Self {
            step_pin,
            dir_pin,
            en_pin,
            rate: 0,
            tick_accumulator: 0,
            steps_to_move: 0,
            stepped: 0,
            signal_step: 0,
            direction: false,
            moving: false,
            paused: false,
            // No move yet is the same as a finished move
            is_move_finished: true,
            keep_moving: false,
            minimum_rate: settings.minimum_rate,
            maximum_rate: tick_frequency,
            max_rate: settings.max_rate,
            position: Position::new(settings.steps_per_mm),
            invert_direction: settings.invert_direction,
            name,
            index,
        };
        motor.enable(false);
        motor
    }

    /// Advance the motor by one tick of the step clock.
    ///
    /// Called at `frequency` Hz for every motor in the active set. Emits
    /// at most one pulse per tick; if the rate exceeds the frequency the
    /// motor is pulse-per-tick limited.
    #[inline]
    pub fn tick(&mut self, frequency: u32) -> TickOutcome {
        self.tick_accumulator += self.rate;
        if self.tick_accumulator > frequency {
            self.tick_accumulator -= frequency;
            self.step()
        } else {
            TickOutcome::default()
        }
    }

    /// Emit one step pulse and account for it.
    fn step(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome {
            stepped: true,
            ..TickOutcome::default()
        };

        let _ = self.step_pin.set_high();

        self.stepped += 1;
        self.position.move_steps(if self.direction { -1 } else { 1 });

        if !self.is_move_finished {
            // Re-phase the acceleration tick on the requested step,
            // normally the first step of the deceleration ramp.
            if self.signal_step != 0 && self.stepped == self.signal_step {
                outcome.synchronize_acceleration = true;
                self.signal_step = 0;
            }

            if self.stepped >= self.steps_to_move {
                // Mark the move finished but let the tick source deliver
                // the signal after the whole tick completes. With
                // keep_moving set the motor stays active and the extra
                // steps accumulate in `stepped` for the next move.
                self.is_move_finished = true;
                outcome.move_finished = true;

                if !self.keep_moving {
                    self.moving = false;
                }
            }
        }

        outcome
    }

    /// Lower the step pulse line.
    ///
    /// Called by the tick source once all motors have ticked, so every
    /// pulse stays high for the remainder of the tick.
    #[inline]
    pub fn unstep(&mut self) {
        let _ = self.step_pin.set_low();
    }

    /// Program a new move.
    ///
    /// Pulses emitted after the previous move finished (while the motor
    /// was overshooting) are credited against this one:
    /// - if the direction reverses, they are added to the target (they
    ///   must be undone first);
    /// - if they already exceed the new target, the move reverses to
    ///   step back the difference;
    /// - otherwise they count as progress already made.
    ///
    /// A zero-step request (after crediting) completes immediately and
    /// leaves the motor idle; the return value is `false` and the caller
    /// raises the timer's finished flag. Step counts above `i32::MAX`
    /// are rejected the same way.
    ///
    /// `initial_rate` of zero keeps the current rate.
    ///
    /// Returns `true` when the motor is now moving.
    pub fn start_move(&mut self, direction: bool, steps: u32, initial_rate: u32) -> bool {
        let mut direction = direction;
        let mut steps = if steps > i32::MAX as u32 { 0 } else { steps };

        if self.is_move_finished && self.moving && self.stepped > self.steps_to_move {
            // Overshoot credit from the previous move.
            let extra = self.stepped - self.steps_to_move;

            if direction != self.direction {
                // Reversing: the extra steps moved away from the new
                // target and must be retraced on top of the request.
                steps = steps.saturating_add(extra);
                self.stepped = 0;
            } else if steps < extra {
                // Overshot past the whole new move; step back the rest.
                direction = !direction;
                steps = extra - steps;
                self.stepped = 0;
            } else {
                // Normal pipelined case: count the extra as progress.
                self.stepped = extra;
            }
        } else {
            // Starting from rest: fresh cadence for the new move. A
            // pipelined continuation above keeps the accumulator so the
            // step stream stays smooth across the block boundary.
            self.stepped = 0;
            self.tick_accumulator = 0;
        }

        self.set_direction(direction);
        self.steps_to_move = steps;
        self.keep_moving = false;
        self.signal_step = 0;

        if steps > self.stepped {
            if initial_rate > 0 {
                self.set_rate(initial_rate);
            }
            self.moving = true;
            self.is_move_finished = false;
        } else {
            // Trivial move: complete immediately.
            self.moving = false;
            self.is_move_finished = true;
        }

        self.moving
    }

    /// Set the step rate in steps per second.
    ///
    /// Clamped to the configured floor (progress tracking must never
    /// stall) and to the tick frequency (one pulse per tick is the
    /// physical ceiling).
    pub fn set_rate(&mut self, rate: u32) -> &mut Self {
        self.rate = rate.clamp(self.minimum_rate, self.maximum_rate);
        self
    }

    /// Pause the motor. All state is retained; the motor just leaves the
    /// active set, so resuming continues exactly where it stopped.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume a paused motor.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Drive the enable output.
    pub fn enable(&mut self, state: bool) {
        let _ = if state {
            self.en_pin.set_high()
        } else {
            self.en_pin.set_low()
        };
    }

    /// Keep pulsing at the current rate after the move finishes.
    #[inline]
    pub fn set_keep_moving(&mut self, keep_moving: bool) {
        self.keep_moving = keep_moving;
    }

    /// Request an acceleration re-phase when `stepped` reaches `step`.
    #[inline]
    pub fn set_signal_step(&mut self, step: u32) {
        self.signal_step = step;
    }

    /// Whether this motor should be in the step tick's active set.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.moving && !self.paused && self.steps_to_move > 0
    }

    fn set_direction(&mut self, direction: bool) {
        let _ = if direction != self.invert_direction {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };
        self.direction = direction;
    }

    // Accessors

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Index assigned by the step timer.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current step rate in steps per second.
    #[inline]
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Steps emitted in the current move (including overshoot).
    #[inline]
    pub fn stepped(&self) -> u32 {
        self.stepped
    }

    /// Target step count of the current move.
    #[inline]
    pub fn steps_to_move(&self) -> u32 {
        self.steps_to_move
    }

    /// Current direction (false = positive).
    #[inline]
    pub fn direction(&self) -> bool {
        self.direction
    }

    /// Whether a move is in progress (including overshooting).
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether the motor is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the current move reached its target.
    #[inline]
    pub fn is_move_finished(&self) -> bool {
        self.is_move_finished
    }

    /// Observable motor state.
    pub fn state(&self) -> MotorState {
        if !self.moving {
            MotorState::Idle
        } else if !self.is_move_finished {
            MotorState::Running
        } else if self.keep_moving {
            MotorState::Overshooting
        } else {
            MotorState::Finished
        }
    }

    /// Current position in steps (signed).
    #[inline]
    pub fn position_steps(&self) -> i32 {
        self.position.steps()
    }

    /// Current position in millimeters.
    #[inline]
    pub fn current_position(&self) -> Millimeters {
        self.position.millimeters()
    }

    /// Steps needed to reach a target position.
    #[inline]
    pub fn steps_to_target(&self, target: Millimeters) -> i32 {
        self.position.steps_to_target(target)
    }

    /// Steps per millimeter.
    #[inline]
    pub fn steps_per_mm(&self) -> f32 {
        self.position.steps_per_mm()
    }

    /// Change the steps-per-mm factor, preserving the physical position.
    pub fn change_steps_per_mm(&mut self, steps_per_mm: f32) {
        self.position.change_steps_per_mm(steps_per_mm);
    }

    /// Commit a new milestone position.
    pub fn change_last_milestone(&mut self, milestone: Millimeters) {
        self.position.change_last_milestone(milestone);
    }

    /// Last committed milestone.
    #[inline]
    pub fn last_milestone(&self) -> Millimeters {
        self.position.last_milestone()
    }

    /// Maximum feed rate in mm/sec.
    #[inline]
    pub fn max_rate(&self) -> f32 {
        self.max_rate
    }

    /// Set the maximum feed rate in mm/sec.
    pub fn set_max_rate(&mut self, max_rate: f32) {
        self.max_rate = max_rate;
    }

    /// Configured step rate floor.
    #[inline]
    pub fn minimum_rate(&self) -> u32 {
        self.minimum_rate
    }
}
