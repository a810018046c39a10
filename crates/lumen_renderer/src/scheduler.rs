//! Render scheduling.
//!
//! Two strategies produce the same image: a sequential loop on the calling
//! thread, and a fixed pool of workers fed through a pair of bounded queues.
//! Either way pixels reach the [`PixelSink`] strictly in raster order.

use crate::renderer::{ray_color, render_pixel, PixelSink, T_MIN};
use crate::{Camera, Hittable, ImageBuffer, RenderError, RenderResult};
use lumen_math::{Color, Interval};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Mutex;
use std::time::Instant;

/// How samples are distributed over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStrategy {
    /// Every pixel and sample on the calling thread
    #[default]
    Sequential,
    /// A fixed worker pool; the calling thread only coordinates
    Parallel,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub strategy: RenderStrategy,
    /// Master seed. The sequential path uses it directly, each parallel
    /// worker derives its own stream from it.
    pub seed: u64,
    /// Worker count for the parallel strategy, 0 = one per hardware thread
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strategy: RenderStrategy::Sequential,
            seed: 0,
            threads: 0,
        }
    }
}

impl RenderConfig {
    pub fn sequential(seed: u64) -> Self {
        Self {
            strategy: RenderStrategy::Sequential,
            seed,
            threads: 0,
        }
    }

    pub fn parallel(seed: u64, threads: usize) -> Self {
        Self {
            strategy: RenderStrategy::Parallel,
            seed,
            threads,
        }
    }
}

/// A request for one sample of pixel (x, y).
#[derive(Debug, Clone, Copy)]
struct PixelRequest {
    x: u32,
    y: u32,
}

/// One sample's color, or the panic that prevented it.
type SampleMessage = std::thread::Result<Color>;

/// Render the scene into `sink`.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    sink: &mut dyn PixelSink,
) -> RenderResult<()> {
    log::info!(
        "Rendering {}x{} @ {} spp, max depth {} ({:?})",
        camera.image_width(),
        camera.image_height(),
        camera.samples_per_pixel(),
        camera.max_depth(),
        config.strategy
    );
    let start = Instant::now();

    sink.begin(camera.image_width(), camera.image_height())?;
    match config.strategy {
        RenderStrategy::Sequential => render_sequential(camera, world, config.seed, sink)?,
        RenderStrategy::Parallel => render_parallel(camera, world, config, sink)?,
    }
    sink.finish()?;

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(())
}

/// Render the scene into a fresh [`ImageBuffer`].
pub fn render_to_image(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> RenderResult<ImageBuffer> {
    let mut image = ImageBuffer::new(camera.image_width(), camera.image_height());
    render(camera, world, config, &mut image)?;
    Ok(image)
}

fn render_sequential(
    camera: &Camera,
    world: &dyn Hittable,
    seed: u64,
    sink: &mut dyn PixelSink,
) -> RenderResult<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let height = camera.image_height();

    for y in 0..height {
        log::info!("Scanlines remaining: {}", height - y);
        for x in 0..camera.image_width() {
            sink.write_pixel(render_pixel(camera, world, x, y, &mut rng))?;
        }
    }
    Ok(())
}

fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    sink: &mut dyn PixelSink,
) -> RenderResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|index| format!("lumen-worker-{index}"))
        .build()?;
    let workers = pool.current_num_threads();
    log::debug!("Started {} render workers", workers);

    // Both queues hold one pixel's whole batch so the coordinator can queue
    // every request before it starts collecting results
    let batch = camera.samples_per_pixel() as usize;
    let (request_tx, request_rx) = mpsc::sync_channel::<PixelRequest>(batch);
    let (sample_tx, sample_rx) = mpsc::sync_channel::<SampleMessage>(batch);
    let request_rx = Mutex::new(request_rx);

    pool.in_place_scope(|scope| {
        for index in 0..workers {
            let requests = &request_rx;
            let samples = sample_tx.clone();
            let rng = StdRng::seed_from_u64(worker_seed(config.seed, index));
            scope.spawn(move |_| sample_worker(camera, world, requests, samples, rng));
        }
        drop(sample_tx);

        // Returning drops both channel ends, which lets the workers exit
        coordinate(camera, request_tx, sample_rx, sink)
    })
}

/// Seed for worker `index`, derived from the master seed.
fn worker_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Worker loop: take a pixel request, trace one sample, send its color.
fn sample_worker(
    camera: &Camera,
    world: &dyn Hittable,
    requests: &Mutex<Receiver<PixelRequest>>,
    samples: SyncSender<SampleMessage>,
    mut rng: StdRng,
) {
    let ray_t = Interval::new(T_MIN, f32::INFINITY);

    loop {
        // Hold the lock only while waiting for the next request
        let request = match requests.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => return,
        };
        let Ok(PixelRequest { x, y }) = request else {
            return;
        };

        let sample = panic::catch_unwind(AssertUnwindSafe(|| {
            let ray = camera.get_ray(x, y, &mut rng);
            ray_color(&ray, world, ray_t, camera.max_depth(), &mut rng)
        }));
        let failed = sample.is_err();
        if samples.send(sample).is_err() || failed {
            return;
        }
    }
}

/// Feed requests pixel by pixel and emit each averaged pixel in raster order.
fn coordinate(
    camera: &Camera,
    requests: SyncSender<PixelRequest>,
    samples: Receiver<SampleMessage>,
    sink: &mut dyn PixelSink,
) -> RenderResult<()> {
    let spp = camera.samples_per_pixel();
    let height = camera.image_height();

    for y in 0..height {
        log::info!("Scanlines remaining: {}", height - y);
        for x in 0..camera.image_width() {
            for _ in 0..spp {
                requests
                    .send(PixelRequest { x, y })
                    .map_err(|_| RenderError::WorkerDisconnected)?;
            }

            let mut pixel = Color::ZERO;
            for _ in 0..spp {
                match samples.recv() {
                    Ok(Ok(color)) => pixel += color,
                    // A worker hit a bug; fail as loudly as it did
                    Ok(Err(payload)) => panic::resume_unwind(payload),
                    Err(_) => return Err(RenderError::WorkerDisconnected),
                }
            }
            sink.write_pixel(pixel / spp as f32)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraConfig, Dielectric, Lambertian, Metal, PpmEncoder, Sphere, Vec3, World};
    use crate::renderer::sky_gradient;
    use std::sync::Arc;

    fn test_world() -> World {
        World::new()
            .with(
                Sphere::new(
                    Vec3::new(0.0, -100.5, -1.0),
                    100.0,
                    Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0))),
                )
                .unwrap(),
            )
            .with(
                Sphere::new(
                    Vec3::new(0.0, 0.0, -1.0),
                    0.5,
                    Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5))),
                )
                .unwrap(),
            )
            .with(
                Sphere::new(
                    Vec3::new(-1.0, 0.0, -1.0),
                    0.5,
                    Arc::new(Dielectric::new(1.5).unwrap()),
                )
                .unwrap(),
            )
            .with(
                Sphere::new(
                    Vec3::new(1.0, 0.0, -1.0),
                    0.5,
                    Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.3).unwrap()),
                )
                .unwrap(),
            )
    }

    fn small_camera(width: u32, samples: u32, depth: u32) -> Camera {
        let config = CameraConfig::default()
            .with_resolution(width, 1.0)
            .with_quality(samples, depth)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        Camera::new(&config).unwrap()
    }

    fn center_sphere() -> World {
        World::new().with(
            Sphere::new(
                Vec3::new(0.0, 0.0, -1.0),
                0.5,
                Arc::new(Lambertian::new(Color::splat(0.5))),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_narrow_view_all_pixels_hit() {
        let config = CameraConfig::default()
            .with_resolution(2, 1.0)
            .with_quality(1, 1)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(20.0, 0.0, 0.0);
        let camera = Camera::new(&config).unwrap();

        let image = render_to_image(&camera, &center_sphere(), &RenderConfig::default()).unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        // One bounce of budget: every hit comes back black, never sky
        for color in &image.pixels {
            assert_eq!(*color, Color::ZERO);
        }
    }

    #[test]
    fn test_wide_view_center_hits_corners_miss() {
        let camera = small_camera(5, 1, 1);
        let image = render_to_image(&camera, &center_sphere(), &RenderConfig::default()).unwrap();

        assert_eq!(image.get(2, 2), Color::ZERO);
        for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
            let color = image.get(x, y);
            assert!(color.min_element() > 0.4, "corner ({x}, {y}) = {color}");
        }
    }

    #[test]
    fn test_sequential_is_reproducible() {
        let camera = small_camera(6, 8, 10);
        let world = test_world();
        let config = RenderConfig::sequential(1234);

        let run = || {
            let mut encoder = PpmEncoder::new(Vec::new());
            render(&camera, &world, &config, &mut encoder).unwrap();
            encoder.into_inner()
        };
        let first = run();
        let second = run();
        assert!(first.starts_with(b"P3\n6 6\n255\n"));
        assert_eq!(first, second);

        // A different seed gives a different image
        let mut other = PpmEncoder::new(Vec::new());
        render(&camera, &world, &RenderConfig::sequential(99), &mut other).unwrap();
        assert_ne!(first, other.into_inner());
    }

    #[test]
    fn test_parallel_preserves_raster_order() {
        // Only sky: each pixel's color depends on where it is, so any
        // reordering would show up
        let camera = small_camera(8, 32, 4);
        let world = World::new();

        let sequential = render_to_image(&camera, &world, &RenderConfig::sequential(7)).unwrap();
        let parallel = render_to_image(&camera, &world, &RenderConfig::parallel(7, 4)).unwrap();

        assert_eq!((parallel.width, parallel.height), (sequential.width, sequential.height));
        assert_eq!(parallel.pixels.len(), sequential.pixels.len());
        for (a, b) in sequential.pixels.iter().zip(&parallel.pixels) {
            assert!((*a - *b).length() < 0.05, "{a} vs {b}");
        }

        // Top row is bluer than the bottom row
        assert!(parallel.get(0, 0).x < parallel.get(0, 7).x);
    }

    #[test]
    fn test_parallel_close_to_sequential() {
        let camera = small_camera(8, 64, 8);
        let world = test_world();

        let sequential = render_to_image(&camera, &world, &RenderConfig::sequential(3)).unwrap();
        let parallel = render_to_image(&camera, &world, &RenderConfig::parallel(3, 0)).unwrap();

        assert_eq!(parallel.pixels.len(), 64);
        let difference = (sequential.average() - parallel.average()).abs();
        assert!(difference.max_element() < 0.05, "averages differ by {difference}");
    }

    #[test]
    fn test_parallel_single_worker_and_sample() {
        let camera = small_camera(3, 1, 3);
        let image =
            render_to_image(&camera, &center_sphere(), &RenderConfig::parallel(11, 1)).unwrap();
        assert_eq!(image.pixels.len(), 9);
        // The sphere halves whatever light reaches it
        assert!(image.get(1, 1).max_element() <= 0.5);
        for color in &image.pixels {
            assert!(Interval::UNIT.contains(color.max_element()));
        }
    }

    #[test]
    fn test_parallel_streams_valid_ppm() {
        let camera = small_camera(4, 8, 5);
        let mut encoder = PpmEncoder::new(Vec::new());
        render(&camera, &test_world(), &RenderConfig::parallel(5, 2), &mut encoder).unwrap();

        let text = String::from_utf8(encoder.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(&lines[..3], ["P3", "4 4", "255"]);
        assert_eq!(lines.len(), 3 + 16);
        for line in &lines[3..] {
            let channels: Vec<u8> = line.split(' ').map(|c| c.parse().unwrap()).collect();
            assert_eq!(channels.len(), 3);
        }
    }

    #[test]
    fn test_sky_only_matches_gradient() {
        let camera = small_camera(3, 64, 2);
        let image = render_to_image(&camera, &World::new(), &RenderConfig::sequential(0)).unwrap();
        let center = lumen_math::Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!((image.get(1, 1) - sky_gradient(&center)).length() < 0.05);
    }

    #[test]
    fn test_worker_seeds_differ() {
        let seeds: Vec<u64> = (0..8).map(|i| worker_seed(42, i)).collect();
        for (i, a) in seeds.iter().enumerate() {
            assert_ne!(*a, 42);
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    static CAPTURED: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());

    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut captured) = CAPTURED.lock() {
                captured.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    #[test]
    fn test_progress_logged_at_info() {
        // Another test may have installed it already
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);

        let camera = small_camera(3, 1, 1);
        render_to_image(&camera, &World::new(), &RenderConfig::sequential(0)).unwrap();

        let captured = CAPTURED.lock().unwrap();
        for remaining in 1..=3 {
            let line = format!("Scanlines remaining: {remaining}");
            assert!(
                captured
                    .iter()
                    .any(|(level, message)| *level == log::Level::Info && *message == line),
                "missing {line:?} at info"
            );
        }
    }

    struct ExplodingMaterial;

    impl crate::Material for ExplodingMaterial {
        fn scatter(
            &self,
            _rec: &crate::HitRecord,
            _rng: &mut dyn rand::RngCore,
        ) -> Option<crate::ScatterResult> {
            panic!("scatter exploded");
        }
    }

    #[test]
    #[should_panic(expected = "scatter exploded")]
    fn test_worker_panic_reaches_caller() {
        let camera = small_camera(2, 2, 3);
        // Large enough to fill every pixel of the 90 degree view
        let world = World::new()
            .with(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.9, Arc::new(ExplodingMaterial)).unwrap());
        let _ = render_to_image(&camera, &world, &RenderConfig::parallel(0, 2));
    }

    struct FailingSink {
        accepted: usize,
    }

    impl PixelSink for FailingSink {
        fn begin(&mut self, _width: u32, _height: u32) -> RenderResult<()> {
            Ok(())
        }

        fn write_pixel(&mut self, _color: Color) -> RenderResult<()> {
            if self.accepted == 3 {
                return Err(RenderError::Io(std::io::Error::other("disk full")));
            }
            self.accepted += 1;
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_stops_parallel_render() {
        let camera = small_camera(4, 4, 3);
        let mut sink = FailingSink { accepted: 0 };
        let result = render(&camera, &center_sphere(), &RenderConfig::parallel(0, 2), &mut sink);
        assert!(matches!(result, Err(RenderError::Io(_))));
        assert_eq!(sink.accepted, 3);
    }
}
