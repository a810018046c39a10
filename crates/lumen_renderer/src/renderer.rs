//! Core path tracing integrator.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing cut off at a fixed bounce depth
//! - A white-to-blue sky when rays escape the scene
//! - Anti-aliasing via multi-sampling

use crate::{Camera, Hittable, RenderError, RenderResult};
use lumen_math::{Color, Interval, Ray, VecExt};
use rand::RngCore;

/// Smallest ray parameter accepted for a hit. Keeps scattered rays from
/// re-hitting the surface they start on ("shadow acne").
pub const T_MIN: f32 = 0.001;

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through the
/// scene, multiplying in each surface's attenuation, until the ray escapes,
/// is absorbed, or `depth` bounces have been spent.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    ray_t: Interval,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // Bounce budget exhausted, no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, ray_t) else {
        return sky_gradient(ray);
    };

    match rec.material.scatter(&rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, ray_t, depth - 1, rng);
            scattered_color.hadamard(result.attenuation)
        }
        // Ray was absorbed
        None => Color::ZERO,
    }
}

/// Background seen by rays that escape the scene.
///
/// Blends white (looking down) to light blue (looking up).
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().unit_vector();
    // y in [-1, 1] remapped to [0, 1]
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let ray_t = Interval::new(T_MIN, f32::INFINITY);
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel() {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, ray_t, camera.max_depth(), rng);
    }

    // Average the samples
    pixel_color / camera.samples_per_pixel() as f32
}

/// Consumer of rendered pixels.
///
/// The scheduler calls `begin` once, then `write_pixel` for every pixel in
/// raster order (rows top to bottom, left to right within a row), then
/// `finish`.
pub trait PixelSink {
    /// Called before the first pixel with the final image size.
    fn begin(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Accept the next pixel's linear RGB color.
    fn write_pixel(&mut self, color: Color) -> RenderResult<()>;

    /// Called after the last pixel.
    fn finish(&mut self) -> RenderResult<()> {
        Ok(())
    }
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Linear colors in raster order
    pub pixels: Vec<Color>,
    cursor: usize,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
            cursor: 0,
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Replay the stored pixels, in raster order, into another sink.
    pub fn write_to(&self, sink: &mut dyn PixelSink) -> RenderResult<()> {
        sink.begin(self.width, self.height)?;
        for color in &self.pixels {
            sink.write_pixel(*color)?;
        }
        sink.finish()
    }

    /// Mean color over the whole image.
    pub fn average(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }
}

impl PixelSink for ImageBuffer {
    fn begin(&mut self, width: u32, height: u32) -> RenderResult<()> {
        *self = ImageBuffer::new(width, height);
        Ok(())
    }

    fn write_pixel(&mut self, color: Color) -> RenderResult<()> {
        if self.cursor >= self.pixels.len() {
            return Err(RenderError::SizeMismatch {
                expected: self.pixels.len(),
                actual: self.cursor + 1,
            });
        }
        self.pixels[self.cursor] = color;
        self.cursor += 1;
        Ok(())
    }

    fn finish(&mut self) -> RenderResult<()> {
        if self.cursor != self.pixels.len() {
            return Err(RenderError::SizeMismatch {
                expected: self.pixels.len(),
                actual: self.cursor,
            });
        }
        Ok(())
    }
}
