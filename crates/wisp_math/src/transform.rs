// Transform utilities for Mat4
//
// Extends glam::Mat4 with the helpers the scene builder needs for placing
// rectangles. glam already provides transform_point3(), transform_vector3()
// and inverse() (cofactor expansion, no pivoting).

use glam::{Mat3, Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Multiply the diagonal scale entries by `factors`.
    ///
    /// Unlike `Mat4::from_scale(..) * m` this leaves the translation column
    /// untouched, which is what you want when sizing a primitive in place.
    fn scaled(self, factors: Vec3) -> Mat4;

    /// Add `offset` to the translation column.
    fn translated(self, offset: Vec3) -> Mat4;

    /// Inverse-transpose of the upper 3x3, for transforming normals.
    fn normal_matrix(&self) -> Mat3;

    /// Transform a surface normal and renormalize it.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Whether the determinant is far enough from zero to invert safely.
    fn is_invertible(&self, epsilon: f32) -> bool;
}

impl Mat4Ext for Mat4 {
    fn scaled(mut self, factors: Vec3) -> Mat4 {
        self.x_axis.x *= factors.x;
        self.y_axis.y *= factors.y;
        self.z_axis.z *= factors.z;
        self
    }

    fn translated(mut self, offset: Vec3) -> Mat4 {
        self.w_axis.x += offset.x;
        self.w_axis.y += offset.y;
        self.w_axis.z += offset.z;
        self
    }

    fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(*self).inverse().transpose()
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        (self.normal_matrix() * normal).normalize()
    }

    fn is_invertible(&self, epsilon: f32) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > epsilon
    }
}
