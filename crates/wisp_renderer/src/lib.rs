//! Wisp Renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over the scenes built by `wisp_core`:
//!
//! - **Intersection**: a scalar reference engine and a lane-parallel engine
//!   that return the same closest hit
//! - **Integrator**: iterative paths with diffuse/mirror blending and
//!   Fresnel-weighted refraction, capped at [`MAX_BOUNCES`]
//! - **Scheduling**: row-band work orders drained lock-free by a pool of
//!   scoped threads
//! - **Output**: tone-mapped RGBA8 pixels

mod image;
mod integrator;
mod intersect;
mod intersect_wide;
mod renderer;
mod rng;
mod work_queue;

pub use image::{pack_rgba, unpack_rgba, ImageBuffer, ToneMap};
pub use integrator::{
    reflect, refract, scatter, schlick, trace_path, PathSample, Refraction, MAX_BOUNCES,
};
pub use intersect::{
    hit_plane, hit_rectangle, hit_sphere, intersect_world, HitRecord, Intersector, HIT_TOLERANCE,
    MIN_HIT_DISTANCE,
};
pub use intersect_wide::intersect_world_wide;
pub use renderer::{
    primary_ray, render, render_order, render_pixel, ConfigError, RenderConfig, RenderStats,
};
pub use rng::XorShift32;
pub use work_queue::{generate_orders, run_worker, WorkOrder, WorkQueue, DEFAULT_ROWS_PER_ORDER};

/// Re-export the scene and math types renderer users need
pub use wisp_core::{Color, ScenePreset, World};
pub use wisp_math::{Ray, Vec3};
