//! Lumen math - vector algebra and sampling primitives.
//!
//! Colors, points and directions all share glam's `Vec3`. The pieces glam
//! does not provide (checked division, the near-zero test, random sampling
//! on balls and disks) live here so every crate agrees on them.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
mod sampling;
mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use sampling::{
    gen_f32, random_in_unit_cube, random_in_unit_disk, random_in_unit_sphere,
    random_unit_vector, random_vec, random_vec_range,
};
pub use vector::{MathError, VecExt, NEAR_ZERO};

/// RGB color, linear space. Channels are nominally in [0, 1].
pub type Color = Vec3;
