//! Extensions to glam's `Vec3` used throughout the tracer.

use glam::Vec3;
use thiserror::Error;

/// Threshold below which every component counts as zero.
pub const NEAR_ZERO: f32 = 1e-8;

/// Errors raised by vector arithmetic.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("cannot divide vector {0} by zero")]
    DivideByZero(Vec3),
}

/// Operations the tracer needs on top of glam's `Vec3`.
pub trait VecExt: Sized {
    /// Component-wise (Hadamard) product.
    fn hadamard(self, other: Self) -> Self;

    /// Divide by a scalar, failing only when `factor` is exactly zero.
    fn checked_div(self, factor: f32) -> Result<Self, MathError>;

    /// Scale to unit length. Vectors that already have length exactly 1 are
    /// returned unchanged.
    fn unit_vector(self) -> Self;

    /// True if every component is within [`NEAR_ZERO`] of zero.
    fn is_near_zero(self) -> bool;
}

impl VecExt for Vec3 {
    #[inline]
    fn hadamard(self, other: Vec3) -> Vec3 {
        self * other
    }

    #[inline]
    fn checked_div(self, factor: f32) -> Result<Vec3, MathError> {
        if factor == 0.0 {
            return Err(MathError::DivideByZero(self));
        }
        Ok(self / factor)
    }

    #[inline]
    fn unit_vector(self) -> Vec3 {
        let length = self.length();
        if length == 1.0 {
            return self;
        }
        self / length
    }

    #[inline]
    fn is_near_zero(self) -> bool {
        self.abs().cmplt(Vec3::splat(NEAR_ZERO)).all()
    }
}
