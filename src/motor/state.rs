//! Runtime motor states.

/// Observable state of a stepper actuator, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    /// No move in progress; not in the step tick's active set.
    Idle,
    /// Executing a move; pulses are being produced.
    Running,
    /// The assigned step count is done but the motor keeps pulsing at its
    /// current rate so the step stream does not stall while the next
    /// block is programmed. Extra pulses are credited to the next move.
    Overshooting,
    /// The move just finished and the end-of-move signal has not been
    /// consumed yet. Transient.
    Finished,
}

impl MotorState {
    /// State name for display/debugging.
    pub const fn name(self) -> &'static str {
        match self {
            MotorState::Idle => "Idle",
            MotorState::Running => "Running",
            MotorState::Overshooting => "Overshooting",
            MotorState::Finished => "Finished",
        }
    }
}
