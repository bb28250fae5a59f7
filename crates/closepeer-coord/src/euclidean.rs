//! Two-dimensional Euclidean coordinates.
//!
//! The plain Euclidean plane is the simplest space a latency embedding can
//! use. Distance is the L2 norm of the difference vector.

use std::ops::{Add, Mul, Neg, Sub};

use crate::Coordinate;

/// A position in the Euclidean plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EuclideanCoord {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl EuclideanCoord {
    /// Origin of the plane.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new coordinate.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Length of this coordinate viewed as a vector.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Move a fraction `t` of the way toward `target`.
    ///
    /// `t = 0.0` stays put, `t = 1.0` lands on `target`.
    pub fn step_toward(&self, target: &Self, t: f64) -> Self {
        *self + (*target - *self) * t
    }

    /// True if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Coordinate for EuclideanCoord {
    fn distance(&self, other: &Self) -> f64 {
        (*self - *other).magnitude()
    }

    /// Adopt the fresher snapshot wholesale.
    ///
    /// A snapshot from the coordinate service is authoritative for its node,
    /// so the cached copy simply takes its value. Non-finite snapshots are
    /// ignored and the copy keeps its last good position.
    fn update(&mut self, other: &Self) {
        if other.is_finite() {
            *self = *other;
        }
    }
}

impl Add for EuclideanCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for EuclideanCoord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for EuclideanCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for EuclideanCoord {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl std::fmt::Display for EuclideanCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
