//! Geometric primitives.
//!
//! Primitives reference their material by index into the world's material
//! array. The index is checked once by `WorldBuilder::build` and never again.

use wisp_math::{Mat4, Mat4Ext, Vec3, Vec4};

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    pub material_index: u32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(position: Vec3, radius: f32, material_index: u32) -> Self {
        Self {
            position,
            radius,
            material_index,
        }
    }
}

/// An infinite plane in implicit form: `normal · P + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
    pub material_index: u32,
}

impl Plane {
    /// Create a plane from its implicit coefficients.
    pub fn new(normal: Vec3, d: f32, material_index: u32) -> Self {
        Self {
            normal,
            d,
            material_index,
        }
    }

    /// Create the plane through `point` with the given normal.
    pub fn through(point: Vec3, normal: Vec3, material_index: u32) -> Self {
        let normal = normal.normalize();
        Self::new(normal, -normal.dot(point), material_index)
    }
}

/// A unit square `[-0.5, 0.5]²` on the local `z = 0` plane, placed in the
/// world by an affine `transform`.
///
/// The inverse transform and the world-space normal are computed once at
/// construction; intersection only ever uses those.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub transform: Mat4,
    pub inverse: Mat4,
    pub normal: Vec3,
    pub material_index: u32,
}

impl Rectangle {
    /// Create a rectangle from its local-to-world transform.
    ///
    /// The transform must be invertible; `WorldBuilder::build` rejects the
    /// rectangle otherwise.
    pub fn new(transform: Mat4, material_index: u32) -> Self {
        Self {
            transform,
            inverse: transform.inverse(),
            normal: transform.transform_normal(Vec3::Z),
            material_index,
        }
    }

    /// Create a rectangle centered at `center` whose edges are `u` and `v`.
    ///
    /// The edges span the full side lengths, so `u = (2, 0, 0)` makes the
    /// rectangle two units wide.
    pub fn from_edges(center: Vec3, u: Vec3, v: Vec3, material_index: u32) -> Self {
        let w = u.cross(v).normalize_or_zero();
        let transform = Mat4::from_cols(
            u.extend(0.0),
            v.extend(0.0),
            w.extend(0.0),
            Vec4::new(center.x, center.y, center.z, 1.0),
        );
        Self::new(transform, material_index)
    }

    /// Whether a local-space point lies on the unit square.
    #[inline]
    pub fn contains_local(x: f32, y: f32) -> bool {
        x.abs() <= HALF_EXTENT && y.abs() <= HALF_EXTENT
    }
}

/// Half side length of the local unit square.
pub const HALF_EXTENT: f32 = 0.5;
