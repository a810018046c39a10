//! Sphere primitive for ray tracing.

use crate::{ConfigError, ConfigResult, HitRecord, Hittable, Material};
use lumen_math::{Interval, Ray, VecExt, Vec3};
use std::sync::Arc;

/// A sphere primitive.
///
/// The material is shared: many spheres may point at the same instance.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// A negative radius is rejected. A zero radius is allowed but the sphere
    /// has no surface and never reports a hit.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> ConfigResult<Self> {
        if !center.is_finite() {
            return Err(ConfigError::NonFinite("sphere center"));
        }
        if !radius.is_finite() {
            return Err(ConfigError::NonFinite("sphere radius"));
        }
        if radius < 0.0 {
            return Err(ConfigError::NegativeRadius(radius));
        }

        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        // |P(t) - C|^2 = r^2 expands to
        //   (d.d) t^2 - 2 (d.Z) t + (Z.Z - r^2) = 0,   Z = C - Q
        // solved below with h = d.Z standing in for -b/2. The discriminant
        // h^2 - a (Z.Z - r^2) equals a (r^2 - |l|^2), where l is the offset
        // from the center to the ray's closest approach. That form keeps r^2
        // when the sphere is small and far away.
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let closest = oc - (h / a) * ray.direction();

        let discriminant = a * (self.radius * self.radius - closest.length_squared());
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearer root first; the far one only counts when the near one is
        // out of range (e.g. the ray starts inside the sphere)
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - self.center).checked_div(self.radius).ok()?;
        Some(HitRecord::new(ray, root, p, outward_normal, &*self.material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;

    fn unit_sphere_at(center: Vec3, radius: f32) -> Sphere {
        Sphere::new(center, radius, Arc::new(Lambertian::new(Vec3::splat(0.5)))).unwrap()
    }

    fn forward() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_sphere_hit_through_center() {
        let center = Vec3::new(0.0, 0.0, -1.0);
        let sphere = unit_sphere_at(center, 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere.hit(&ray, forward()).unwrap();
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!((rec.p - (center - 0.5 * ray.direction())).length() < 1e-5);
        assert!(rec.front_face);

        // Normal parallel to (p - center)
        let radial = (rec.p - center).normalize();
        assert!(rec.normal.cross(radial).length() < 1e-5);
        assert!(rec.normal.dot(radial) > 0.0);
    }

    #[test]
    fn test_sphere_far_root_is_positive() {
        let center = Vec3::new(0.0, 0.0, -1.0);
        let sphere = unit_sphere_at(center, 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // Skip past the near root to reach the exit point
        let rec = sphere.hit(&ray, Interval::new(0.6, f32::INFINITY)).unwrap();
        assert!((rec.t - 1.5).abs() < 0.001);
        assert!((rec.p - (center + 0.5 * ray.direction())).length() < 1e-5);
        assert!(!rec.front_face);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = unit_sphere_at(Vec3::ZERO, 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let rec = sphere.hit(&ray, forward()).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal - (-Vec3::X)).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss_offset_ray() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -1.0), 0.5);

        // Parallel to the axis but offset by more than the radius
        let ray = Ray::new(Vec3::new(0.0, 0.6, 0.0), Vec3::new(0.0, 0.0, -1.0));
        for (t_min, t_max) in [(0.001, f32::INFINITY), (-100.0, 100.0), (0.0, 1.0)] {
            assert!(sphere.hit(&ray, Interval::new(t_min, t_max)).is_none());
        }
    }

    #[test]
    fn test_sphere_miss_pointing_away() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(sphere.hit(&ray, forward()).is_none());
    }

    #[test]
    fn test_sphere_unnormalized_direction() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -4.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));

        let rec = sphere.hit(&ray, forward()).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-5);
        assert!((rec.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_small_distant_sphere_head_on() {
        let center = Vec3::new(0.0, 0.0, -50.0);
        let sphere = unit_sphere_at(center, 0.01);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let rec = sphere.hit(&ray, forward()).unwrap();
        assert!((rec.t - 49.99).abs() < 1e-3);
        assert!((rec.normal - Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn test_small_distant_sphere_across_diameter() {
        let center = Vec3::new(0.0, 0.0, -100.0);
        let radius = 0.05;
        let sphere = unit_sphere_at(center, radius);

        for i in 0..50 {
            let offset = radius * (-0.98 + 1.96 * i as f32 / 49.0);
            let ray = Ray::new(Vec3::new(offset, 0.0, 0.0), -Vec3::Z);

            let rec = sphere.hit(&ray, forward()).unwrap();
            assert!((rec.normal.length() - 1.0).abs() < 1e-3, "ray {i}");
            assert!(((rec.p - center).length() - radius).abs() < 0.01 * radius, "ray {i}");
        }

        // Just outside the silhouette
        let ray = Ray::new(Vec3::new(1.02 * radius, 0.0, 0.0), -Vec3::Z);
        assert!(sphere.hit(&ray, forward()).is_none());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let result = Sphere::new(Vec3::ZERO, -1.0, Arc::new(Lambertian::new(Vec3::ONE)));
        assert_eq!(result.err(), Some(ConfigError::NegativeRadius(-1.0)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let material: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::ONE));
        assert!(Sphere::new(Vec3::ZERO, f32::NAN, material.clone()).is_err());
        assert!(Sphere::new(Vec3::splat(f32::INFINITY), 1.0, material).is_err());
    }

    #[test]
    fn test_zero_radius_never_hits() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -1.0), 0.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, forward()).is_none());
    }

    #[test]
    fn test_shared_material() {
        let material: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::ONE));
        let a = Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, material.clone()).unwrap();
        let b = Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, material.clone()).unwrap();
        assert_eq!(Arc::strong_count(&material), 3);
        assert_eq!(a.radius(), b.radius());
    }
}
