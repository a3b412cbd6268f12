//! Lane-wide counterparts of `Vec3`, `Vec4` and `Mat4`.
//!
//! Each component holds one value per slot, so a `LaneVec3<f32x8>` is eight
//! independent 3D vectors laid out structure-of-arrays.

use super::{LaneF32, MAX_LANE_WIDTH};
use glam::{Mat4, Vec3, Vec4};
use std::ops::{Add, Mul, Neg, Sub};

/// `L::WIDTH` 3D vectors.
#[derive(Debug, Clone, Copy)]
pub struct LaneVec3<L> {
    pub x: L,
    pub y: L,
    pub z: L,
}

impl<L: LaneF32> LaneVec3<L> {
    #[inline]
    pub fn new(x: L, y: L, z: L) -> Self {
        Self { x, y, z }
    }

    /// The same vector in every slot.
    #[inline]
    pub fn splat(v: Vec3) -> Self {
        Self::new(L::splat(v.x), L::splat(v.y), L::splat(v.z))
    }

    /// Load from three structure-of-arrays component slices.
    #[inline]
    pub fn load(x: &[f32], y: &[f32], z: &[f32]) -> Self {
        Self::new(L::load(x), L::load(y), L::load(z))
    }

    /// Evaluated in the same order as glam's `Vec3::dot`, so a lane result
    /// matches the scalar one bit for bit.
    #[inline]
    pub fn dot(self, rhs: Self) -> L {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[inline]
    pub fn length_squared(self) -> L {
        self.dot(self)
    }

    /// Exact normalization: multiply by `1 / sqrt(length_squared)`, as glam does.
    #[inline]
    pub fn normalize(self) -> Self {
        self * (L::splat(1.0) / self.length_squared().sqrt())
    }

    /// Normalization through the backend's reciprocal square root.
    ///
    /// Cheaper, but hardware `rsqrt` is only accurate to about 12 bits.
    #[inline]
    pub fn normalize_fast(self) -> Self {
        self * self.length_squared().rsqrt()
    }

    /// `self * mul + add` per component.
    #[inline]
    pub fn mul_add(self, mul: L, add: Self) -> Self {
        Self::new(
            self.x.mul_add(mul, add.x),
            self.y.mul_add(mul, add.y),
            self.z.mul_add(mul, add.z),
        )
    }

    /// Branchless per-slot choice between two vectors.
    #[inline]
    pub fn select(mask: L, if_true: Self, if_false: Self) -> Self {
        Self::new(
            L::select(mask, if_true.x, if_false.x),
            L::select(mask, if_true.y, if_false.y),
            L::select(mask, if_true.z, if_false.z),
        )
    }

    /// Extract the vector in slot `index`.
    pub fn extract(self, index: usize) -> Vec3 {
        let mut xs = [0.0f32; MAX_LANE_WIDTH];
        let mut ys = [0.0f32; MAX_LANE_WIDTH];
        let mut zs = [0.0f32; MAX_LANE_WIDTH];
        self.x.store(&mut xs);
        self.y.store(&mut ys);
        self.z.store(&mut zs);
        Vec3::new(xs[index], ys[index], zs[index])
    }
}

impl<L: LaneF32> Add for LaneVec3<L> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<L: LaneF32> Sub for LaneVec3<L> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<L: LaneF32> Mul<L> for LaneVec3<L> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: L) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<L: LaneF32> Neg for LaneVec3<L> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// `L::WIDTH` 4D vectors.
#[derive(Debug, Clone, Copy)]
pub struct LaneVec4<L> {
    pub x: L,
    pub y: L,
    pub z: L,
    pub w: L,
}

impl<L: LaneF32> LaneVec4<L> {
    #[inline]
    pub fn new(x: L, y: L, z: L, w: L) -> Self {
        Self { x, y, z, w }
    }

    #[inline]
    pub fn splat(v: Vec4) -> Self {
        Self::new(L::splat(v.x), L::splat(v.y), L::splat(v.z), L::splat(v.w))
    }

    #[inline]
    pub fn dot(self, rhs: Self) -> L {
        self.x
            .mul_add(rhs.x, self.y.mul_add(rhs.y, self.z.mul_add(rhs.z, self.w * rhs.w)))
    }

    /// Dot product against `(v, 1)`: the row of an affine transform applied to a point.
    ///
    /// Summed left to right like glam's column-major `transform_point3`.
    #[inline]
    fn dot_point(self, v: LaneVec3<L>) -> L {
        self.x * v.x + self.y * v.y + self.z * v.z + self.w
    }

    /// Dot product against `(v, 0)`: translation is ignored.
    #[inline]
    fn dot_vector(self, v: LaneVec3<L>) -> L {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    #[inline]
    pub fn select(mask: L, if_true: Self, if_false: Self) -> Self {
        Self::new(
            L::select(mask, if_true.x, if_false.x),
            L::select(mask, if_true.y, if_false.y),
            L::select(mask, if_true.z, if_false.z),
            L::select(mask, if_true.w, if_false.w),
        )
    }
}

impl<L: LaneF32> Add for LaneVec4<L> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl<L: LaneF32> Sub for LaneVec4<L> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl<L: LaneF32> Mul<L> for LaneVec4<L> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: L) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

/// `L::WIDTH` 4x4 matrices, stored as rows.
#[derive(Debug, Clone, Copy)]
pub struct LaneMat4<L> {
    pub rows: [LaneVec4<L>; 4],
}

impl<L: LaneF32> LaneMat4<L> {
    /// Build from a per-element constructor taking `(row, column)`.
    pub fn from_fn(mut element: impl FnMut(usize, usize) -> L) -> Self {
        Self {
            rows: std::array::from_fn(|row| {
                LaneVec4::new(
                    element(row, 0),
                    element(row, 1),
                    element(row, 2),
                    element(row, 3),
                )
            }),
        }
    }

    /// The same matrix in every slot.
    pub fn splat(m: Mat4) -> Self {
        Self::from_fn(|row, column| L::splat(m.row(row)[column]))
    }

    /// Transform points (w = 1). The bottom row is assumed to be `(0, 0, 0, 1)`.
    #[inline]
    pub fn transform_point3(&self, p: LaneVec3<L>) -> LaneVec3<L> {
        LaneVec3::new(
            self.rows[0].dot_point(p),
            self.rows[1].dot_point(p),
            self.rows[2].dot_point(p),
        )
    }

    /// Transform directions (w = 0).
    #[inline]
    pub fn transform_vector3(&self, v: LaneVec3<L>) -> LaneVec3<L> {
        LaneVec3::new(
            self.rows[0].dot_vector(v),
            self.rows[1].dot_vector(v),
            self.rows[2].dot_vector(v),
        )
    }

    /// Full matrix-vector product.
    #[inline]
    pub fn mul_vec4(&self, v: LaneVec4<L>) -> LaneVec4<L> {
        LaneVec4::new(
            self.rows[0].dot(v),
            self.rows[1].dot(v),
            self.rows[2].dot(v),
            self.rows[3].dot(v),
        )
    }
}
