//! The scene container handed to the renderer.

use thiserror::Error;
use wisp_math::Mat4Ext;

use crate::camera::Camera;
use crate::material::Material;
use crate::primitive::{Plane, Rectangle, Sphere};
use crate::soa::{RectangleLane, SphereLane, MAX_LANE_INDEX};

/// Determinant magnitude below which a rectangle transform counts as singular.
const SINGULAR_EPSILON: f32 = 1e-8;

/// Errors that can occur while assembling a world.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("{kind} {index} references material {material}, but only {count} materials exist")]
    MaterialIndexOutOfRange {
        kind: &'static str,
        index: usize,
        material: u32,
        count: usize,
    },

    #[error("rectangle {0} has a non-invertible transform")]
    SingularTransform(usize),

    #[error("sphere {index} has invalid radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },

    #[error("plane {0} has a zero-length normal")]
    DegeneratePlane(usize),

    #[error("no camera was set")]
    MissingCamera,

    #[error("camera basis is degenerate (looking along the up vector?)")]
    DegenerateCamera,

    #[error("too many primitives or materials for lane storage: {0}")]
    TooLarge(usize),
}

/// Everything the renderer reads: materials, primitives in both layouts, and
/// the camera.
///
/// A `World` owns all of its arrays. It is immutable once built and can be
/// shared by reference across render threads; dropping it frees the scene.
///
/// Material slot 0 is the environment: its emission is what a ray sees when
/// it escapes the scene.
#[derive(Debug, Clone)]
pub struct World {
    materials: Vec<Material>,
    planes: Vec<Plane>,
    spheres: Vec<Sphere>,
    rectangles: Vec<Rectangle>,
    sphere_lanes: Vec<SphereLane>,
    rectangle_lanes: Vec<RectangleLane>,
    camera: Camera,
}

impl World {
    /// Material by index. Indices were validated when the world was built.
    #[inline]
    pub fn material(&self, index: u32) -> &Material {
        &self.materials[index as usize]
    }

    /// The material seen by rays that hit nothing.
    #[inline]
    pub fn environment(&self) -> &Material {
        &self.materials[0]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    pub fn sphere_lanes(&self) -> &[SphereLane] {
        &self.sphere_lanes
    }

    pub fn rectangle_lanes(&self) -> &[RectangleLane] {
        &self.rectangle_lanes
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Total number of primitives of every kind.
    pub fn primitive_count(&self) -> usize {
        self.planes.len() + self.spheres.len() + self.rectangles.len()
    }
}

/// Collects materials and primitives, then validates them into a [`World`].
#[derive(Debug, Clone)]
pub struct WorldBuilder {
    materials: Vec<Material>,
    planes: Vec<Plane>,
    spheres: Vec<Sphere>,
    rectangles: Vec<Rectangle>,
    camera: Option<Camera>,
}

impl WorldBuilder {
    /// Start a world whose environment (material 0) is `environment`.
    pub fn new(environment: Material) -> Self {
        Self {
            materials: vec![environment],
            planes: Vec::new(),
            spheres: Vec::new(),
            rectangles: Vec::new(),
            camera: None,
        }
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    pub fn add_plane(&mut self, plane: Plane) -> &mut Self {
        self.planes.push(plane);
        self
    }

    pub fn add_sphere(&mut self, sphere: Sphere) -> &mut Self {
        self.spheres.push(sphere);
        self
    }

    pub fn add_rectangle(&mut self, rectangle: Rectangle) -> &mut Self {
        self.rectangles.push(rectangle);
        self
    }

    pub fn set_camera(&mut self, camera: Camera) -> &mut Self {
        self.camera = Some(camera);
        self
    }

    /// Check every precondition the render core relies on and pack the
    /// lane batches.
    pub fn build(self) -> Result<World, SceneError> {
        let count = self.materials.len();
        if count > MAX_LANE_INDEX {
            return Err(SceneError::TooLarge(count));
        }
        let check_material = |kind: &'static str, index: usize, material: u32| {
            if material as usize >= count {
                Err(SceneError::MaterialIndexOutOfRange {
                    kind,
                    index,
                    material,
                    count,
                })
            } else {
                Ok(())
            }
        };

        for (index, plane) in self.planes.iter().enumerate() {
            check_material("plane", index, plane.material_index)?;
            if !plane.normal.is_finite() || plane.normal.length_squared() == 0.0 {
                return Err(SceneError::DegeneratePlane(index));
            }
        }

        if self.spheres.len() > MAX_LANE_INDEX {
            return Err(SceneError::TooLarge(self.spheres.len()));
        }
        for (index, sphere) in self.spheres.iter().enumerate() {
            check_material("sphere", index, sphere.material_index)?;
            if !(sphere.radius > 0.0 && sphere.radius.is_finite()) {
                return Err(SceneError::InvalidRadius {
                    index,
                    radius: sphere.radius,
                });
            }
        }

        if self.rectangles.len() > MAX_LANE_INDEX {
            return Err(SceneError::TooLarge(self.rectangles.len()));
        }
        for (index, rectangle) in self.rectangles.iter().enumerate() {
            check_material("rectangle", index, rectangle.material_index)?;
            if !rectangle.transform.is_invertible(SINGULAR_EPSILON) {
                return Err(SceneError::SingularTransform(index));
            }
        }

        let camera = self.camera.ok_or(SceneError::MissingCamera)?;
        if !camera.is_valid() {
            return Err(SceneError::DegenerateCamera);
        }

        let sphere_lanes = SphereLane::pack(&self.spheres);
        let rectangle_lanes = RectangleLane::pack(&self.rectangles);

        log::debug!(
            "World built: {} materials, {} planes, {} spheres ({} lanes), {} rectangles ({} lanes)",
            count,
            self.planes.len(),
            self.spheres.len(),
            sphere_lanes.len(),
            self.rectangles.len(),
            rectangle_lanes.len()
        );

        Ok(World {
            materials: self.materials,
            planes: self.planes,
            spheres: self.spheres,
            rectangles: self.rectangles,
            sphere_lanes,
            rectangle_lanes,
            camera,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_math::{Mat4, Vec3};

    fn builder() -> WorldBuilder {
        let mut builder = WorldBuilder::new(Material::emissive(Vec3::splat(0.5)));
        builder.set_camera(Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO));
        builder
    }

    #[test]
    fn test_build_minimal_world() {
        let world = builder().build().unwrap();

        assert_eq!(world.materials().len(), 1);
        assert_eq!(world.primitive_count(), 0);
        assert!(world.sphere_lanes().is_empty());
        assert_eq!(world.environment().emit_color, Vec3::splat(0.5));
    }

    #[test]
    fn test_build_packs_lanes() {
        let mut builder = builder();
        let red = builder.add_material(Material::diffuse(Vec3::X));
        assert_eq!(red, 1);
        builder
            .add_sphere(Sphere::new(Vec3::ZERO, 1.0, red))
            .add_sphere(Sphere::new(Vec3::X, 0.5, red))
            .add_rectangle(Rectangle::new(Mat4::IDENTITY, red));

        let world = builder.build().unwrap();
        assert_eq!(world.sphere_lanes().len(), 1);
        assert_eq!(world.sphere_lanes()[0].live_count(), 2);
        assert_eq!(world.rectangle_lanes().len(), 1);
        assert_eq!(world.material(red).color, Vec3::X);
    }

    #[test]
    fn test_rejects_out_of_range_material() {
        let mut builder = builder();
        builder.add_sphere(Sphere::new(Vec3::ZERO, 1.0, 7));

        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::MaterialIndexOutOfRange {
                kind: "sphere",
                index: 0,
                material: 7,
                count: 1,
            }
        );
    }

    #[test]
    fn test_rejects_singular_rectangle() {
        let mut builder = builder();
        builder.add_rectangle(Rectangle::new(Mat4::ZERO, 0));

        assert_eq!(builder.build().unwrap_err(), SceneError::SingularTransform(0));
    }

    #[test]
    fn test_rejects_bad_radius_and_plane() {
        let mut spheres = builder();
        spheres.add_sphere(Sphere::new(Vec3::ZERO, 1.0, 0));
        spheres.add_sphere(Sphere::new(Vec3::ZERO, -2.0, 0));
        assert_eq!(
            spheres.build().unwrap_err(),
            SceneError::InvalidRadius {
                index: 1,
                radius: -2.0
            }
        );

        let mut planes = builder();
        planes.add_plane(Plane::new(Vec3::ZERO, 0.0, 0));
        assert_eq!(planes.build().unwrap_err(), SceneError::DegeneratePlane(0));
    }

    #[test]
    fn test_rejects_missing_or_degenerate_camera() {
        let missing = WorldBuilder::new(Material::default());
        assert_eq!(missing.build().unwrap_err(), SceneError::MissingCamera);

        let mut degenerate = WorldBuilder::new(Material::default());
        degenerate.set_camera(Camera::look_at(Vec3::ZERO, Vec3::Y));
        assert_eq!(degenerate.build().unwrap_err(), SceneError::DegenerateCamera);
    }

    #[test]
    fn test_error_messages() {
        let err = SceneError::SingularTransform(3);
        assert_eq!(err.to_string(), "rectangle 3 has a non-invertible transform");
    }
}
