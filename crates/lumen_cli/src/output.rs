//! Image output: streamed PPM or a PNG written after the render.

use anyhow::{Context, Result};
use image::RgbImage;
use lumen_renderer::{render, render_to_image, Camera, Hittable, PpmEncoder, RenderConfig};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ppm,
    Png,
}

impl OutputFormat {
    /// PNG for a `.png` extension (any case), PPM otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => OutputFormat::Png,
            _ => OutputFormat::Ppm,
        }
    }
}

/// Render the scene and write it to `path`, or as PPM to stdout.
pub fn render_and_write(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    path: Option<&Path>,
) -> Result<()> {
    let Some(path) = path else {
        let mut encoder = PpmEncoder::new(BufWriter::new(io::stdout().lock()));
        render(camera, world, config, &mut encoder)?;
        return Ok(());
    };

    match OutputFormat::from_path(path) {
        OutputFormat::Ppm => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut encoder = PpmEncoder::new(BufWriter::new(file));
            render(camera, world, config, &mut encoder)?;
        }
        OutputFormat::Png => {
            let image = render_to_image(camera, world, config)?;
            let png = RgbImage::from_raw(image.width, image.height, image.to_rgb8()?)
                .context("Rendered image does not match its dimensions")?;
            png.save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}
