//! Hittable trait, HitRecord and the World aggregate.

use crate::Material;
use lumen_math::{Interval, Ray, Vec3};

/// How far a surface normal may drift from unit length before it is treated
/// as a geometry bug.
pub const NORMAL_LENGTH_TOLERANCE: f32 = 0.02;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// The ray that produced this hit
    pub ray: Ray,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Build a hit record, orienting the normal against the ray.
    ///
    /// `outward_normal` must point out of the geometry and be unit length.
    ///
    /// # Panics
    ///
    /// Panics if the normal's length is off by more than
    /// [`NORMAL_LENGTH_TOLERANCE`]. That only happens when the geometry code
    /// producing it is wrong.
    pub fn new(
        ray: &Ray,
        t: f32,
        p: Vec3,
        outward_normal: Vec3,
        material: &'a dyn Material,
    ) -> Self {
        // An obtuse angle between ray and outward normal means the ray came
        // from outside
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        let length = normal.length();
        assert!(
            (length - 1.0).abs() <= NORMAL_LENGTH_TOLERANCE,
            "normal {normal} must be a unit vector, but has length {length} \
             (acceptable delta is +-{NORMAL_LENGTH_TOLERANCE})"
        );

        Self {
            ray: *ray,
            t,
            p,
            normal,
            front_face,
            material,
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` strictly inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;
}

/// An ordered collection of hittable objects.
///
/// Hitting the world hits every member and keeps the closest result.
#[derive(Default)]
pub struct World {
    objects: Vec<Box<dyn Hittable>>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the world.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Builder-style [`World::add`].
    pub fn with(mut self, object: impl Hittable + 'static) -> Self {
        self.add(Box::new(object));
        self
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the world is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<Box<dyn Hittable>> for World {
    fn from_iter<I: IntoIterator<Item = Box<dyn Hittable>>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl Hittable for World {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            // Later objects only have to beat the best hit so far
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max)) {
                closest = Some(rec);
            }
        }

        closest
    }
}
