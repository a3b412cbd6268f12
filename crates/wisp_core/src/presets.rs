//! Hardcoded scenes.
//!
//! Scene description files are out of scope; these builders stand in for a
//! scene loader and are selectable by name from the command line or a
//! config file.

use serde::{Deserialize, Serialize};
use wisp_math::Vec3;

use crate::{Camera, Color, Material, Plane, Rectangle, SceneError, Sphere, World, WorldBuilder};

/// A named built-in scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenePreset {
    /// Ground plane with a row of diffuse, mirror and glass spheres under a sky.
    #[default]
    DemoSpheres,
    /// Closed box lit by one rectangle light.
    CornellBox,
}

impl ScenePreset {
    pub const ALL: [ScenePreset; 2] = [ScenePreset::DemoSpheres, ScenePreset::CornellBox];

    pub fn name(&self) -> &'static str {
        match self {
            ScenePreset::DemoSpheres => "demo-spheres",
            ScenePreset::CornellBox => "cornell-box",
        }
    }

    /// Build the preset's world.
    pub fn build(&self) -> Result<World, SceneError> {
        match self {
            ScenePreset::DemoSpheres => demo_spheres(),
            ScenePreset::CornellBox => cornell_box(),
        }
    }
}

/// Ground plane, three spheres of increasing glossiness, a glass sphere and a
/// soft blue sky as the only light.
pub fn demo_spheres() -> Result<World, SceneError> {
    let mut builder = WorldBuilder::new(Material::emissive(Color::new(0.3, 0.4, 0.5)));

    let ground = builder.add_material(Material::diffuse(Color::new(0.8, 0.8, 0.0)));
    let red = builder.add_material(Material::diffuse(Color::new(0.8, 0.3, 0.3)));
    let chrome = builder.add_material(Material::mirror(Color::new(0.9, 0.9, 0.9), 1.0));
    let gold = builder.add_material(Material::mirror(Color::new(0.8, 0.6, 0.2), 0.9));
    let glass = builder.add_material(Material::dielectric(Color::ONE, 1.5));

    builder
        .add_plane(Plane::new(Vec3::Y, 0.0, ground))
        .add_sphere(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, red))
        .add_sphere(Sphere::new(Vec3::new(-2.0, 1.0, 0.0), 1.0, chrome))
        .add_sphere(Sphere::new(Vec3::new(-4.0, 2.0, 1.0), 1.0, gold))
        .add_sphere(Sphere::new(Vec3::new(2.0, 1.0, 1.0), 1.0, glass))
        .set_camera(Camera::look_at(Vec3::new(0.0, 1.0, 10.0), Vec3::ZERO));

    builder.build()
}

/// Two-unit box open towards the camera, white floor/ceiling/back, red left
/// wall, green right wall, a ceiling light, a mirror ball and a glass ball.
pub fn cornell_box() -> Result<World, SceneError> {
    let mut builder = WorldBuilder::new(Material::emissive(Color::ZERO));

    let white = builder.add_material(Material::diffuse(Color::splat(0.73)));
    let red = builder.add_material(Material::diffuse(Color::new(0.65, 0.05, 0.05)));
    let green = builder.add_material(Material::diffuse(Color::new(0.12, 0.45, 0.15)));
    let light = builder.add_material(Material::emissive(Color::splat(15.0)));
    let mirror = builder.add_material(Material::mirror(Color::splat(0.9), 1.0));
    let glass = builder.add_material(Material::dielectric(Color::ONE, 1.5));

    let x2 = Vec3::new(2.0, 0.0, 0.0);
    let y2 = Vec3::new(0.0, 2.0, 0.0);
    let z2 = Vec3::new(0.0, 0.0, 2.0);

    builder
        // floor, ceiling, back
        .add_rectangle(Rectangle::from_edges(Vec3::new(0.0, 0.0, 0.0), x2, z2, white))
        .add_rectangle(Rectangle::from_edges(Vec3::new(0.0, 2.0, 0.0), x2, z2, white))
        .add_rectangle(Rectangle::from_edges(Vec3::new(0.0, 1.0, -1.0), x2, y2, white))
        // left, right
        .add_rectangle(Rectangle::from_edges(Vec3::new(-1.0, 1.0, 0.0), z2, y2, red))
        .add_rectangle(Rectangle::from_edges(Vec3::new(1.0, 1.0, 0.0), z2, y2, green))
        // light, just below the ceiling
        .add_rectangle(Rectangle::from_edges(
            Vec3::new(0.0, 1.98, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.5),
            light,
        ))
        .add_sphere(Sphere::new(Vec3::new(-0.4, 0.35, -0.3), 0.35, mirror))
        .add_sphere(Sphere::new(Vec3::new(0.45, 0.35, 0.2), 0.35, glass))
        .set_camera(Camera::look_at(Vec3::new(0.0, 1.0, 2.0), Vec3::new(0.0, 1.0, 0.0)));

    builder.build()
}
