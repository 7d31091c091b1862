//! Error types for step-motion.
//!
//! Configuration and block-construction errors only: the tick path is
//! infallible by design and never returns a `Result`.

use core::fmt;

use crate::axis::Axis;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all step-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motion block construction or validation error
    Block(BlockError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Tick frequency must be > 0
    InvalidFrequency(u32),
    /// Acceleration tick rate must be > 0, at most the tick frequency,
    /// and divide it exactly
    InvalidAccelerationTicks {
        /// Configured tick frequency in Hz
        frequency: u32,
        /// Configured acceleration ticks per second
        ticks: u32,
    },
    /// Steps-per-millimeter must be a positive finite number
    InvalidStepsPerMm(f32),
    /// Maximum feed rate must be > 0
    InvalidMaxRate(f32),
    /// Minimum step rate must be at least 1 and below the tick frequency
    InvalidMinimumRate(u32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion block errors, reported by [`crate::Block::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlockError {
    /// Trapezoid boundaries out of order
    InvalidTrapezoid {
        /// End of the acceleration segment (main-axis steps)
        accelerate_until: u32,
        /// Start of the deceleration segment (main-axis steps)
        decelerate_after: u32,
        /// Total main-axis step count
        steps_event_count: u32,
    },
    /// Per-axis step count exceeds the representable position range
    StepsOutOfRange {
        /// Offending axis
        axis: Axis,
        /// Requested step count
        steps: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Block(e) => write!(f, "Block error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidFrequency(v) => {
                write!(f, "Invalid tick frequency: {}. Must be > 0", v)
            }
            ConfigError::InvalidAccelerationTicks { frequency, ticks } => {
                write!(
                    f,
                    "Invalid acceleration tick rate: {}. Must be > 0 and divide the tick frequency {}",
                    ticks, frequency
                )
            }
            ConfigError::InvalidStepsPerMm(v) => {
                write!(f, "Invalid steps per mm: {}. Must be > 0", v)
            }
            ConfigError::InvalidMaxRate(v) => write!(f, "Invalid max rate: {}. Must be > 0", v),
            ConfigError::InvalidMinimumRate(v) => {
                write!(
                    f,
                    "Invalid minimum rate: {}. Must be >= 1 and below the tick frequency",
                    v
                )
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::InvalidTrapezoid {
                accelerate_until,
                decelerate_after,
                steps_event_count,
            } => {
                write!(
                    f,
                    "Trapezoid boundaries out of order: require accelerate_until {} <= decelerate_after {} <= steps {}",
                    accelerate_until, decelerate_after, steps_event_count
                )
            }
            BlockError::StepsOutOfRange { axis, steps } => {
                write!(f, "Step count {} on {} axis exceeds the position range", steps, axis.name())
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<BlockError> for Error {
    fn from(e: BlockError) -> Self {
        Error::Block(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for BlockError {}
