//! Camera for ray generation.
//!
//! [`CameraConfig`] holds what the user asks for; [`Camera`] is the validated,
//! immutable result with its basis and viewport worked out once.

use crate::{ConfigError, ConfigResult};
use lumen_math::{gen_f32, random_in_unit_disk, Ray, Vec3};
use rand::RngCore;

/// User-facing camera settings.
///
/// Start from [`CameraConfig::default`] and override with the `with_*`
/// builders. Nothing is checked until [`Camera::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    // Image settings
    pub image_width: u32,
    pub aspect_ratio: f32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    /// Up hint; only its component perpendicular to the view direction matters
    pub vup: Vec3,

    // Lens settings
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Variation angle of rays through each pixel, in degrees. 0 is a pinhole.
    pub defocus_angle: f32,
    /// Distance from camera to plane of perfect focus. 0 means the look-at
    /// distance.
    pub focus_dist: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 16.0 / 9.0,
            samples_per_pixel: 100,
            max_depth: 50,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 0.0,
        }
    }
}

impl CameraConfig {
    /// Set image width and aspect ratio (width / height).
    pub fn with_resolution(mut self, width: u32, aspect_ratio: f32) -> Self {
        self.image_width = width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Image height in pixels implied by width and aspect ratio.
    fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio).round() as u32).max(1)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.image_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(ConfigError::InvalidAspectRatio(self.aspect_ratio));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::InvalidFov(self.vfov));
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if !self.look_from.is_finite() {
            return Err(ConfigError::NonFinite("camera position"));
        }
        if !self.look_at.is_finite() {
            return Err(ConfigError::NonFinite("look-at target"));
        }
        if !self.vup.is_finite() {
            return Err(ConfigError::NonFinite("up vector"));
        }
        if self.look_from == self.look_at {
            return Err(ConfigError::CoincidentLookAt(self.look_from));
        }
        if !(self.defocus_angle >= 0.0 && self.defocus_angle < 180.0) {
            return Err(ConfigError::InvalidDefocusAngle(self.defocus_angle));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist >= 0.0) {
            return Err(ConfigError::InvalidFocusDistance(self.focus_dist));
        }
        Ok(())
    }
}

/// The image plane in world space.
///
/// Pixel x grows along `pixel_delta_u` (right), pixel y along
/// `pixel_delta_v` (down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
    /// Vector across the full width, left to right
    pub width_vector: Vec3,
    /// Vector across the full height, top to bottom
    pub height_vector: Vec3,
    pub pixel_delta_u: Vec3,
    pub pixel_delta_v: Vec3,
    pub upper_left: Vec3,
    /// Center of pixel (0, 0)
    pub pixel00_loc: Vec3,
}

impl Viewport {
    /// Lay out the image plane `focus_dist` in front of `center`.
    ///
    /// `u`, `v`, `w` are the camera's right, up and back unit vectors.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        center: Vec3,
        u: Vec3,
        v: Vec3,
        w: Vec3,
        vfov: f32,
        focus_dist: f32,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let h = (vfov.to_radians() / 2.0).tan();
        let height = 2.0 * h * focus_dist;
        let width = height * (image_width as f32 / image_height as f32);

        let width_vector = width * u;
        let height_vector = -height * v;

        let pixel_delta_u = width_vector / image_width as f32;
        let pixel_delta_v = height_vector / image_height as f32;

        let upper_left = center - focus_dist * w - width_vector / 2.0 - height_vector / 2.0;
        let pixel00_loc = upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        Self {
            width,
            height,
            width_vector,
            height_vector,
            pixel_delta_u,
            pixel_delta_v,
            upper_left,
            pixel00_loc,
        }
    }

    /// World-space position of a (possibly fractional) pixel coordinate,
    /// where integer coordinates are pixel centers.
    #[inline]
    pub fn pixel_position(&self, x: f32, y: f32) -> Vec3 {
        self.pixel00_loc + x * self.pixel_delta_u + y * self.pixel_delta_v
    }
}

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,

    center: Vec3,
    focus_dist: f32,
    defocus_angle: f32,

    // Orthonormal basis: right, up, back
    u: Vec3,
    v: Vec3,
    w: Vec3,

    viewport: Viewport,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Validate `config` and derive the camera basis and viewport.
    pub fn new(config: &CameraConfig) -> ConfigResult<Self> {
        config.validate()?;

        let image_height = config.image_height();
        let center = config.look_from;
        let focus_dist = if config.focus_dist == 0.0 {
            (config.look_at - config.look_from).length()
        } else {
            config.focus_dist
        };

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize();
        let right = config.vup.cross(w);
        // Up hints (anti)parallel to the view direction leave `right` undefined
        if right.length_squared() <= 1e-12 * config.vup.length_squared() {
            return Err(ConfigError::DegenerateUp {
                up: config.vup,
                forward: -w,
            });
        }
        let u = right.normalize();
        let v = w.cross(u);

        let viewport = Viewport::new(
            center,
            u,
            v,
            w,
            config.vfov,
            focus_dist,
            config.image_width,
            image_height,
        );

        // Calculate defocus disk basis vectors
        let defocus_radius = focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        log::debug!(
            "Camera {}x{} at {} looking at {}, focus {:.3}, defocus radius {:.4}",
            config.image_width,
            image_height,
            center,
            config.look_at,
            focus_dist,
            defocus_radius
        );

        Ok(Self {
            image_width: config.image_width,
            image_height,
            samples_per_pixel: config.samples_per_pixel,
            max_depth: config.max_depth,
            center,
            focus_dist,
            defocus_angle: config.defocus_angle,
            u,
            v,
            w,
            viewport,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        })
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The origin is jittered over the defocus disk (unless the defocus angle
    /// is 0) and the target over the pixel's footprint.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let offset_x = gen_f32(rng) - 0.5;
        let offset_y = gen_f32(rng) - 0.5;
        let pixel_sample = self
            .viewport
            .pixel_position(i as f32 + offset_x, j as f32 + offset_y);

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn focus_dist(&self) -> f32 {
        self.focus_dist
    }

    /// Right, up and back unit vectors.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Radius of the lens aperture (0 for a pinhole camera).
    pub fn defocus_radius(&self) -> f32 {
        self.defocus_disk_u.length()
    }
}
