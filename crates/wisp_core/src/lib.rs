//! Wisp Core - scene data model for the path tracer.
//!
//! This crate provides:
//!
//! - **Surface description**: `Material`
//! - **Primitives**: `Sphere`, `Plane`, `Rectangle`
//! - **Lane batches**: `SphereLane`, `RectangleLane` (structure-of-arrays copies
//!   of the primitives, one lane-width batch at a time)
//! - **Scene container**: `World`, assembled and validated by `WorldBuilder`
//! - **Presets**: hardcoded scenes selectable by name
//!
//! # Example
//!
//! ```ignore
//! use wisp_core::{Material, Sphere, WorldBuilder, Camera};
//! use wisp_math::Vec3;
//!
//! let mut builder = WorldBuilder::new(Material::emissive(Vec3::splat(0.5)));
//! let red = builder.add_material(Material::diffuse(Vec3::new(0.8, 0.2, 0.2)));
//! builder.add_sphere(Sphere::new(Vec3::ZERO, 1.0, red));
//! builder.set_camera(Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO));
//! let world = builder.build()?;
//! ```

pub mod camera;
pub mod material;
pub mod presets;
pub mod primitive;
pub mod soa;
pub mod world;

// Re-export commonly used types
pub use camera::Camera;
pub use material::{Color, Material};
pub use presets::ScenePreset;
pub use primitive::{Plane, Rectangle, Sphere};
pub use soa::{RectangleLane, SphereLane};
pub use world::{SceneError, World, WorldBuilder};
