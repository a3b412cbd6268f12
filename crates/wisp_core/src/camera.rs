//! Pinhole camera.

use wisp_math::{Ray, Vec3};

/// World up direction. Y is up.
pub const GLOBAL_UP: Vec3 = Vec3::Y;

/// Pinhole camera with a film plane one unit in front of the eye.
///
/// The film is one unit tall; its width follows the image aspect ratio,
/// which is only known at render time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Right
    pub x: Vec3,
    /// Up
    pub y: Vec3,
    /// Backwards (the camera looks down -z)
    pub z: Vec3,
    pub film_distance: f32,
    pub film_height: f32,
}

impl Camera {
    /// Build the camera basis from a look-at target and the global up vector.
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let z = (position - target).normalize();
        let x = GLOBAL_UP.cross(z).normalize();
        let y = z.cross(x).normalize();

        Self {
            position,
            x,
            y,
            z,
            film_distance: 1.0,
            film_height: 1.0,
        }
    }

    /// Whether the basis is usable (finite and non-degenerate).
    ///
    /// Looking straight along the up vector leaves `x` undefined.
    pub fn is_valid(&self) -> bool {
        [self.position, self.x, self.y, self.z]
            .iter()
            .all(|v| v.is_finite())
            && (self.x.length_squared() - 1.0).abs() < 1e-3
            && self.film_distance > 0.0
            && self.film_height > 0.0
    }

    /// Center of the film plane.
    #[inline]
    pub fn film_center(&self) -> Vec3 {
        self.position - self.z * self.film_distance
    }

    /// Primary ray through a film coordinate.
    ///
    /// `film_x` and `film_y` run from -1 to 1, left to right and bottom to top.
    pub fn ray_through(&self, film_x: f32, film_y: f32, aspect_ratio: f32) -> Ray {
        let half_height = self.film_height * 0.5;
        let half_width = half_height * aspect_ratio;
        let film_position =
            self.film_center() + self.x * (film_x * half_width) + self.y * (film_y * half_height);

        Ray::new(self.position, (film_position - self.position).normalize())
    }
}
