use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::{CameraConfig, RenderConfig, RenderStrategy};
use std::path::PathBuf;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Three spheres (glass, diffuse, metal) on a large ground sphere
    Simple,
    /// The classic field of small random spheres around three large ones
    Random,
}

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "A stochastic path tracer for spheres")]
pub struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value = "simple")]
    pub scene: SceneKind,

    /// Output file; `.png` writes PNG, anything else PPM. Defaults to PPM on stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render with a pool of worker threads
    #[arg(long)]
    pub parallel: bool,

    /// Worker count for --parallel, 0 = one per CPU
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Random seed for scene generation and sampling
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Override the scene's image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the scene's samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Override the scene's maximum bounce depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply the width/samples/depth overrides to a scene's camera.
    pub fn camera_config(&self, mut config: CameraConfig) -> CameraConfig {
        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        config
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            strategy: if self.parallel {
                RenderStrategy::Parallel
            } else {
                RenderStrategy::Sequential
            },
            seed: self.seed,
            threads: self.threads,
        }
    }
}
