//! Random sampling helpers.
//!
//! Every function takes the generator explicitly so each render worker can
//! own its own stream. Nothing here touches a process-wide RNG.

use crate::Vec3;
use rand::{Rng, RngCore};

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform vector in [0, 1)^3.
pub fn random_vec(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng), gen_f32(rng), gen_f32(rng))
}

/// Uniform vector in [min, max)^3.
pub fn random_vec_range(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::splat(min) + (max - min) * random_vec(rng)
}

/// Uniform vector in the cube [-1, 1)^3.
#[inline]
pub fn random_in_unit_cube(rng: &mut dyn RngCore) -> Vec3 {
    random_vec_range(rng, -1.0, 1.0)
}

/// Uniform point strictly inside the unit ball.
///
/// Rejection sampling from the enclosing cube; only the squared length is
/// compared so no square root is taken.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_in_unit_cube(rng);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_in_unit_sphere(rng);
        let len_sq = p.length_squared();
        // Points this close to the origin lose too much precision to normalize
        if len_sq > 1e-6 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform point inside the unit disk on the XY plane (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
