//! Simulation time management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Discrete simulation tick
///
/// The simulator advances in whole ticks. A `Tick` is a point in simulation
/// time counted from the start of the run; it supports the few arithmetic
/// operations the tick loop needs and converts to `f64` for comparisons
/// against fractional attempt times.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(u64);

impl Tick {
    /// The first tick of every run
    pub const fn zero() -> Self {
        Tick(0)
    }

    pub const fn new(tick: u64) -> Self {
        Tick(tick)
    }

    /// Get the raw tick index
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Tick index as a real, used when comparing against attempt times
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// The tick immediately after this one
    pub const fn next(&self) -> Self {
        Tick(self.0.saturating_add(1))
    }

    /// Whether this tick starts a new update period.
    ///
    /// A zero period never has boundaries.
    pub fn is_period_boundary(&self, period: u64) -> bool {
        period != 0 && self.0 % period == 0
    }

    /// Index of the update period this tick falls into
    pub fn period_index(&self, period: u64) -> u64 {
        if period == 0 {
            0
        } else {
            self.0 / period
        }
    }

    /// Number of ticks elapsed since `earlier` (zero if `earlier` is later)
    pub fn ticks_since(&self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;

    fn add(self, rhs: u64) -> Self::Output {
        Tick(self.0.saturating_add(rhs))
    }
}

impl Sub<u64> for Tick {
    type Output = Tick;

    fn sub(self, rhs: u64) -> Self::Output {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl Sub<Tick> for Tick {
    type Output = u64;

    fn sub(self, rhs: Tick) -> Self::Output {
        self.ticks_since(rhs)
    }
}

impl From<u64> for Tick {
    fn from(tick: u64) -> Self {
        Tick(tick)
    }
}

impl From<Tick> for u64 {
    fn from(tick: Tick) -> Self {
        tick.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
