//! Multi-threaded image rendering.
//!
//! The image is cut into row bands ([`WorkOrder`]s). `threads - 1` scoped
//! workers plus the calling thread drain the shared [`WorkQueue`]; each band
//! is traced with its own seeded generator and written straight into its
//! slice of the output buffer.

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wisp_core::{Camera, Color, World};
use wisp_math::Ray;

use crate::image::{pack_rgba, ImageBuffer, ToneMap};
use crate::integrator::trace_path;
use crate::intersect::Intersector;
use crate::rng::XorShift32;
use crate::work_queue::{generate_orders, run_worker, WorkOrder, WorkQueue, DEFAULT_ROWS_PER_ORDER};

/// Errors from loading or checking a [`RenderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("samples_per_pixel must be at least 1")]
    NoSamples,

    #[error("rows_per_order must be at least 1")]
    NoRowsPerOrder,

    #[error("threads must be at least 1")]
    NoThreads,

    #[error("image is {actual_width}x{actual_height} but the config asks for {width}x{height}")]
    ImageSizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Render configuration.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Camera samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Rows in each work order
    pub rows_per_order: u32,
    /// Total threads including the caller; `None` uses every core
    pub threads: Option<usize>,
    pub tone_map: ToneMap,
    pub intersector: Intersector,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            samples_per_pixel: 32,
            rows_per_order: DEFAULT_ROWS_PER_ORDER,
            threads: None,
            tone_map: ToneMap::default(),
            intersector: Intersector::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.rows_per_order == 0 {
            return Err(ConfigError::NoRowsPerOrder);
        }
        if self.threads == Some(0) {
            return Err(ConfigError::NoThreads);
        }
        Ok(())
    }

    /// Threads to render with, the calling thread included.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Counters gathered over one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub orders: usize,
    pub total_bounces: u64,
    pub elapsed: Duration,
    pub threads: usize,
}

impl RenderStats {
    /// Path segments traced per second of wall time.
    pub fn rays_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.total_bounces as f64 / seconds
        } else {
            0.0
        }
    }

    /// Wall time per path segment, in milliseconds.
    pub fn ms_per_bounce(&self) -> f64 {
        if self.total_bounces > 0 {
            self.elapsed.as_secs_f64() * 1000.0 / self.total_bounces as f64
        } else {
            0.0
        }
    }
}

/// Jittered primary ray through pixel `(x, y)`.
///
/// The jitter is uniform over the pixel's footprint. Row 0 is the top of the
/// image.
pub fn primary_ray(camera: &Camera, x: u32, y: u32, width: u32, height: u32, rng: &mut XorShift32) -> Ray {
    let jitter_x = 0.5 * rng.bilateral();
    let jitter_y = 0.5 * rng.bilateral();
    let film_x = -1.0 + 2.0 * (x as f32 + 0.5 + jitter_x) / width as f32;
    let film_y = 1.0 - 2.0 * (y as f32 + 0.5 + jitter_y) / height as f32;
    camera.ray_through(film_x, film_y, width as f32 / height as f32)
}

/// Average of `samples` camera paths through pixel `(x, y)`, in linear
/// radiance, and the bounces they traced.
pub fn render_pixel(
    world: &World,
    config: &RenderConfig,
    x: u32,
    y: u32,
    samples: u32,
    rng: &mut XorShift32,
) -> (Color, u64) {
    let mut color = Color::ZERO;
    let mut bounces = 0u64;

    for _ in 0..samples {
        let ray = primary_ray(world.camera(), x, y, config.width, config.height, rng);
        let sample = trace_path(world, ray, config.intersector, rng);
        color += sample.radiance;
        bounces += sample.bounces as u64;
    }

    (color / samples.max(1) as f32, bounces)
}

/// Render one band of rows into `pixels`, which holds exactly the band's
/// rows. Returns the bounces traced.
pub fn render_order(world: &World, config: &RenderConfig, order: &WorkOrder, pixels: &mut [u32]) -> u64 {
    let width = config.width as usize;
    let mut rng = XorShift32::new(order.seed());
    let mut bounces = 0;

    for (row, y) in (order.start_row..order.end_row).enumerate() {
        let line = &mut pixels[row * width..(row + 1) * width];
        for (x, pixel) in line.iter_mut().enumerate() {
            let (color, traced) = render_pixel(world, config, x as u32, y, order.sample_count, &mut rng);
            *pixel = pack_rgba(color, config.tone_map);
            bounces += traced;
        }
    }

    bounces
}

/// Render `world` into `image` using every configured thread.
///
/// The config is validated first and `image` must be `config.width` x
/// `config.height`; nothing is rendered otherwise.
///
/// # Panics
///
/// If a worker thread panics.
pub fn render(
    world: &World,
    config: &RenderConfig,
    image: &mut ImageBuffer,
) -> Result<RenderStats, ConfigError> {
    config.validate()?;
    if (image.width(), image.height()) != (config.width, config.height) {
        return Err(ConfigError::ImageSizeMismatch {
            width: config.width,
            height: config.height,
            actual_width: image.width(),
            actual_height: image.height(),
        });
    }

    let start = Instant::now();
    let threads = config.thread_count();
    let rows_per_order = config.rows_per_order;
    let queue = WorkQueue::new(generate_orders(
        config.height,
        rows_per_order,
        config.samples_per_pixel,
    ));

    if threads > queue.order_count() {
        log::warn!(
            "{} threads for only {} orders; lower rows_per_order to keep them busy",
            threads,
            queue.order_count()
        );
    }

    // One slot per order, in order. A slot is only ever locked by the worker
    // that claimed its order, so the mutexes are never contended.
    let band_len = config.width as usize * rows_per_order as usize;
    let slots: Vec<Mutex<&mut [u32]>> = image
        .pixels_mut()
        .chunks_mut(band_len)
        .map(Mutex::new)
        .collect();

    log::info!(
        "Rendering {}x{} at {} spp: {} orders on {} threads ({:?} intersector)",
        config.width,
        config.height,
        config.samples_per_pixel,
        queue.order_count(),
        threads,
        config.intersector,
    );

    let render_claimed = |index: usize, order: &WorkOrder| -> u64 {
        let mut pixels = slots[index].lock().unwrap_or_else(PoisonError::into_inner);
        render_order(world, config, order, &mut pixels)
    };

    thread::scope(|scope| {
        let queue = &queue;
        let render_claimed = &render_claimed;
        let mut workers = Vec::with_capacity(threads - 1);
        for worker in 1..threads {
            let spawned = thread::Builder::new()
                .name(format!("wisp-worker-{worker}"))
                .spawn_scoped(scope, move || run_worker(queue, render_claimed));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => log::warn!("Failed to spawn worker {}: {}", worker, e),
            }
        }

        let done_here = run_worker(queue, render_claimed);
        log::debug!("Calling thread rendered {} orders", done_here);

        // Report progress while other threads finish their last orders.
        let mut last_reported = queue.finished_count();
        while !queue.is_finished() && workers.iter().any(|w| !w.is_finished()) {
            let finished = queue.finished_count();
            if finished != last_reported {
                log::debug!("Progress: {:.0}%", queue.progress() * 100.0);
                last_reported = finished;
            }
            thread::yield_now();
        }

        for worker in workers {
            match worker.join() {
                Ok(done) => log::trace!("Worker rendered {} orders", done),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });

    let stats = RenderStats {
        orders: queue.order_count(),
        total_bounces: queue.total_bounces(),
        elapsed: start.elapsed(),
        threads,
    };

    log::info!(
        "Render complete in {:.2}s: {} bounces, {:.0} rays/s, {:.6} ms/bounce",
        stats.elapsed.as_secs_f64(),
        stats.total_bounces,
        stats.rays_per_second(),
        stats.ms_per_bounce(),
    );

    Ok(stats)
}
