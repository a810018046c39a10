//! Built-in scene presets.
//!
//! Each preset returns the world together with the camera it was framed
//! for. Command line overrides are applied on top of that camera.

use crate::cli::SceneKind;
use lumen_math::{gen_f32, random_vec, random_vec_range, VecExt};
use lumen_renderer::{
    CameraConfig, Color, ConfigResult, Dielectric, Lambertian, Material, Metal, Sphere, Vec3,
    World,
};
use rand::RngCore;
use std::sync::Arc;

pub struct Scene {
    pub world: World,
    pub camera: CameraConfig,
}

/// Build the scene selected on the command line.
pub fn build(kind: SceneKind, rng: &mut dyn RngCore) -> ConfigResult<Scene> {
    match kind {
        SceneKind::Simple => simple(),
        SceneKind::Random => random(rng),
    }
}

/// Diffuse ball between a hollow glass ball and a rough metal one.
pub fn simple() -> ConfigResult<Scene> {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0)));
    let center: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5)));
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5)?);
    // Air bubble inside the glass ball
    let bubble: Arc<dyn Material> = Arc::new(Dielectric::new(1.0 / 1.5)?);
    let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 1.0)?);

    let world = World::new()
        .with(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, ground)?)
        .with(Sphere::new(Vec3::new(0.0, 0.0, -1.2), 0.5, center)?)
        .with(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass)?)
        .with(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.4, bubble)?)
        .with(Sphere::new(Vec3::new(1.0, 0.0, -1.0), 0.5, metal)?);

    let camera = CameraConfig::default()
        .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(20.0, 10.0, 3.4);

    Ok(Scene { world, camera })
}

/// A 22x22 grid of small jittered spheres around three large ones.
pub fn random(rng: &mut dyn RngCore) -> ConfigResult<Scene> {
    let mut world = World::new();
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5)?);
    // Small spheres keep clear of the big metal ball
    let clearing = Vec3::new(4.0, 0.2, 0.0);

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - clearing).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                let albedo = random_vec(rng).hadamard(random_vec(rng));
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                let albedo = random_vec_range(rng, 0.5, 1.0);
                // [0.25, 0.5)
                let fuzz = (gen_f32(rng) + 1.0) / 4.0;
                Arc::new(Metal::new(albedo, fuzz)?)
            } else {
                Arc::clone(&glass)
            };
            world.add(Box::new(Sphere::new(center, 0.2, material)?));
        }
    }

    let world = world
        .with(Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )?)
        .with(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)?)
        .with(Sphere::new(
            Vec3::new(-4.0, 1.0, 0.0),
            1.0,
            Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
        )?)
        .with(Sphere::new(
            Vec3::new(4.0, 1.0, 0.0),
            1.0,
            Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)?),
        )?);

    let camera = CameraConfig::default()
        .with_resolution(300, 16.0 / 9.0)
        .with_quality(100, 50)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    Ok(Scene { world, camera })
}
