//! Lumen renderer - CPU path tracing.
//!
//! A Monte Carlo path tracer over spheres with diffuse, metal and glass
//! materials. Samples are gathered either on the calling thread or on a
//! fixed worker pool, and pixels always come out in raster order.

mod camera;
mod error;
mod hittable;
mod material;
mod ppm;
mod renderer;
mod scheduler;
mod sphere;

pub use camera::{Camera, CameraConfig, Viewport};
pub use error::{ConfigError, ConfigResult, RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, World};
pub use material::{reflect, refract, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use ppm::{color_to_rgb8, linear_to_gamma, PpmEncoder};
pub use renderer::{ray_color, render_pixel, sky_gradient, ImageBuffer, PixelSink, T_MIN};
pub use scheduler::{render, render_to_image, RenderConfig, RenderStrategy};
pub use sphere::Sphere;

/// Re-export the math types the public API is written in
pub use lumen_math::{Color, Interval, Ray, Vec3};
