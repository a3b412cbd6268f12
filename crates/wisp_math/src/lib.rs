//! Wisp math - vector, matrix and SIMD lane types for the path tracer.
//!
//! `Vec3`, `Vec4` and `Mat4` come straight from glam. On top of them this
//! crate adds the ray type, the hit-distance interval, a few transform
//! helpers and the lane abstraction used by the wide intersection engine.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
pub mod simd;
mod transform;

pub use interval::Interval;
pub use ray::Ray;
pub use simd::{Lane, LaneF32, LaneMat4, LaneVec3, LaneVec4, LANE_WIDTH};
pub use transform::Mat4Ext;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn test_vec4_dot() {
        let a = Vec4::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(a.dot(Vec4::ONE), 10.0);
    }
}
