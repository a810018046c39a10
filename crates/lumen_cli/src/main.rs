mod cli;
mod output;
mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use lumen_renderer::Camera;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Lumen ({:?} scene)", args.scene);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let scene = scenes::build(args.scene, &mut rng).context("Invalid scene")?;
    log::info!("Scene has {} objects", scene.world.len());

    let camera = Camera::new(&args.camera_config(scene.camera))
        .context("Invalid camera configuration")?;

    output::render_and_write(
        &camera,
        &scene.world,
        &args.render_config(),
        args.output.as_deref(),
    )
}
