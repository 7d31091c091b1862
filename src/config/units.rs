//! Unit types for physical quantities.
//!
//! Provides type-safe representations of distances, frequencies, and step
//! rates to prevent unit confusion at compile time.

use core::ops::{Add, Sub};

use serde::Deserialize;

/// Linear position in millimeters.
///
/// Used for configuration and the user-facing API. Internally the core
/// works in steps.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f32);

impl Millimeters {
    /// Create a new Millimeters value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Add for Millimeters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Millimeters {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Tick frequency in Hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Hertz(pub u32);

impl Hertz {
    /// Create a new Hertz value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Step rate in steps per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct StepsPerSec(pub u32);

impl StepsPerSec {
    /// Create a new StepsPerSec value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millimeters_arithmetic() {
        let a = Millimeters::new(12.5);
        let b = Millimeters::new(2.5);
        assert!(((a + b).value() - 15.0).abs() < 1e-6);
        assert!(((a - b).value() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_raw_values() {
        assert_eq!(Hertz::new(100_000).value(), 100_000);
        assert_eq!(StepsPerSec::new(20).value(), 20);
    }
}
