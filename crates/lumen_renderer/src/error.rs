//! Error types for scene configuration and rendering.

use lumen_math::Vec3;
use thiserror::Error;

/// Invalid scene or camera configuration, detected at construction time.
///
/// Nothing is ever clamped into range: constructors refuse the value and
/// report which one was wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("image width must be > 0")]
    ZeroWidth,

    #[error("aspect ratio must be a finite number > 0, got {0}")]
    InvalidAspectRatio(f32),

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),

    #[error("samples per pixel must be > 0")]
    ZeroSamples,

    #[error("max bounce depth must be > 0")]
    ZeroDepth,

    #[error("camera position {0} cannot be the same as the look-at target")]
    CoincidentLookAt(Vec3),

    #[error("up vector {up} is zero or parallel to the view direction {forward}")]
    DegenerateUp { up: Vec3, forward: Vec3 },

    #[error("defocus angle must be in [0, 180) degrees, got {0}")]
    InvalidDefocusAngle(f32),

    #[error("focus distance must be a finite number >= 0, got {0}")]
    InvalidFocusDistance(f32),

    #[error("sphere radius cannot be negative, got {0}")]
    NegativeRadius(f32),

    #[error("{0} must be finite")]
    NonFinite(&'static str),

    #[error("metal fuzz must be in [0, 1], got {0}")]
    FuzzOutOfRange(f32),

    #[error("refraction index must be a finite number > 0, got {0}")]
    InvalidRefractionIndex(f32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while producing or emitting an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("color {color} has invalid {channel} value {value}, it must be between 0 and 1")]
    ColorOutOfRange {
        color: Vec3,
        channel: &'static str,
        value: f32,
    },

    #[error("failed to start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("render workers stopped before all samples were delivered")]
    WorkerDisconnected,

    #[error("expected {expected} pixels, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type RenderResult<T> = Result<T, RenderError>;
