//! External collaborator hooks.

/// Callbacks into the surrounding firmware.
///
/// The conveyor's flush flag and the event bus are reached through this
/// trait; every method has a default so integrations implement only what
/// they observe. Calls are made synchronously from the tick path and
/// must not block.
pub trait MotionHooks {
    /// Whether the external queue is being aborted. While true the rate
    /// controller decelerates the current block and then stops it.
    fn is_flushing(&self) -> bool {
        false
    }

    /// The main-axis rate changed (fired every acceleration tick while a
    /// block runs; a flush stop reports rate zero).
    fn on_speed_change(&mut self, _rate: u32) {}

    /// The current block is done and the core is ready for the next
    /// `begin_block`.
    fn on_block_released(&mut self) {}
}

/// No-op hooks for integrations without a conveyor or event bus.
impl MotionHooks for () {}
