//! Scalar ray/primitive intersection.
//!
//! This is the reference engine: the lane engine in [`crate::intersect_wide`]
//! must agree with it on every query. Both engines evaluate the same
//! expressions in the same order.

use serde::{Deserialize, Serialize};
use wisp_core::{Plane, Rectangle, Sphere, World};
use wisp_math::{Interval, Mat4, Ray, Vec3};

use crate::intersect_wide;

/// Hits closer than this are ignored so bounced rays do not re-hit their
/// own surface.
pub const MIN_HIT_DISTANCE: f32 = 1e-3;

/// Rays whose direction is this close to parallel with a plane are misses.
pub const HIT_TOLERANCE: f32 = 1e-3;

/// Closest intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Ray parameter of the hit.
    pub t: f32,
    /// Unit surface normal. Rectangles flip theirs to face the ray; spheres
    /// and planes do not.
    pub normal: Vec3,
    /// Material slot of the surface that was hit.
    pub material_index: u32,
}

/// Which engine answers closest-hit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intersector {
    /// One primitive at a time.
    Scalar,
    /// Lane-parallel over spheres and rectangles.
    #[default]
    Wide,
}

impl Intersector {
    /// Closest hit in `world` along `ray`, if any.
    #[inline]
    pub fn intersect(self, world: &World, ray: &Ray) -> Option<HitRecord> {
        match self {
            Intersector::Scalar => intersect_world(world, ray),
            Intersector::Wide => intersect_wide::intersect_world_wide(world, ray),
        }
    }
}

/// Ray parameter where `ray` crosses `plane`, if it lies inside `ray_t`.
pub fn hit_plane(plane: &Plane, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let denom = plane.normal.dot(ray.direction);
    if denom.abs() <= HIT_TOLERANCE {
        return None;
    }
    let t = -(plane.d + plane.normal.dot(ray.origin)) / denom;
    ray_t.surrounds(t).then_some(t)
}

/// Ray parameter and outward normal of the nearest valid sphere crossing.
///
/// The near root is taken when it is past [`MIN_HIT_DISTANCE`], otherwise the
/// far root, so rays leaving a sphere from inside still hit it.
pub fn hit_sphere(sphere: &Sphere, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
    let oc = ray.origin - sphere.position;
    let a = ray.direction.dot(ray.direction);
    let b = 2.0 * ray.direction.dot(oc);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let denom = 2.0 * a;
    let t_far = (-b + root) / denom;
    let t_near = (-b - root) / denom;
    let t = if t_near > MIN_HIT_DISTANCE && t_near < t_far {
        t_near
    } else {
        t_far
    };

    if !ray_t.surrounds(t) {
        return None;
    }

    let normal = (ray.at(t) - sphere.position).normalize();
    Some((t, normal))
}

/// Ray parameter and ray-facing normal where `ray` crosses `rectangle`.
pub fn hit_rectangle(rectangle: &Rectangle, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
    let t = hit_unit_square(&rectangle.inverse, ray, ray_t)?;
    let normal = if rectangle.normal.dot(ray.direction) > 0.0 {
        -rectangle.normal
    } else {
        rectangle.normal
    };
    Some((t, normal))
}

/// Intersect the unit square on the local z = 0 plane, given the
/// world-to-local transform.
fn hit_unit_square(inverse: &Mat4, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);
    if direction.z.abs() <= HIT_TOLERANCE {
        return None;
    }

    let t = -origin.z / direction.z;
    if !ray_t.surrounds(t) {
        return None;
    }

    let x = origin.x + direction.x * t;
    let y = origin.y + direction.y * t;
    Rectangle::contains_local(x, y).then_some(t)
}

/// Closest hit over every primitive in `world`.
///
/// Primitives are scanned planes, spheres, then rectangles. A later
/// primitive only wins when strictly closer, so ties go to the earlier one.
pub fn intersect_world(world: &World, ray: &Ray) -> Option<HitRecord> {
    let mut closest = Interval::new(MIN_HIT_DISTANCE, f32::MAX);
    let mut hit = None;

    for plane in world.planes() {
        if let Some(t) = hit_plane(plane, ray, closest) {
            closest = closest.with_max(t);
            hit = Some(HitRecord {
                t,
                normal: plane.normal,
                material_index: plane.material_index,
            });
        }
    }

    for sphere in world.spheres() {
        if let Some((t, normal)) = hit_sphere(sphere, ray, closest) {
            closest = closest.with_max(t);
            hit = Some(HitRecord {
                t,
                normal,
                material_index: sphere.material_index,
            });
        }
    }

    for rectangle in world.rectangles() {
        if let Some((t, normal)) = hit_rectangle(rectangle, ray, closest) {
            closest = closest.with_max(t);
            hit = Some(HitRecord {
                t,
                normal,
                material_index: rectangle.material_index,
            });
        }
    }

    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wisp_core::{Camera, Material, WorldBuilder};

    fn world_with(build: impl FnOnce(&mut WorldBuilder, u32)) -> World {
        let mut builder = WorldBuilder::new(Material::emissive(Vec3::splat(0.5)));
        let material = builder.add_material(Material::diffuse(Vec3::new(0.8, 0.2, 0.2)));
        builder.set_camera(Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO));
        build(&mut builder, material);
        builder.build().expect("valid test world")
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let world = world_with(|b, m| {
            b.add_sphere(Sphere::new(Vec3::ZERO, 1.0, m));
        });
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));

        let hit = intersect_world(&world, &ray).expect("should hit");
        assert_relative_eq!(hit.t, 9.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-5);
        assert_eq!(hit.material_index, 1);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let (t, normal) =
            hit_sphere(&sphere, &ray, Interval::new(MIN_HIT_DISTANCE, f32::MAX)).unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-5);
        // Outward normal, not flipped toward the ray.
        assert_relative_eq!(normal.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_sphere_behind_ray_misses() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(hit_sphere(&sphere, &ray, Interval::new(MIN_HIT_DISTANCE, f32::MAX)).is_none());
    }

    #[test]
    fn test_tangent_ray_misses() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, 1);
        let ray = Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(hit_sphere(&sphere, &ray, Interval::new(MIN_HIT_DISTANCE, f32::MAX)).is_none());
    }

    #[test]
    fn test_parallel_plane_misses() {
        let plane = Plane::new(Vec3::Y, 0.0, 1);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(hit_plane(&plane, &ray, Interval::new(MIN_HIT_DISTANCE, f32::MAX)).is_none());

        let world = world_with(|b, m| {
            b.add_plane(Plane::new(Vec3::Y, 0.0, m));
        });
        assert!(intersect_world(&world, &ray).is_none());
    }

    #[test]
    fn test_plane_hit() {
        // Plane y = -2, written as normal . p + d = 0.
        let plane = Plane::new(Vec3::Y, 2.0, 1);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        let t = hit_plane(&plane, &ray, Interval::new(MIN_HIT_DISTANCE, f32::MAX)).unwrap();
        assert_relative_eq!(t, 2.0);
    }

    #[test]
    fn test_rectangle_hit_and_edges() {
        let rectangle = Rectangle::from_edges(Vec3::ZERO, Vec3::X * 2.0, Vec3::Y * 2.0, 1);
        let range = Interval::new(MIN_HIT_DISTANCE, f32::MAX);

        let center = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let (t, normal) = hit_rectangle(&rectangle, &center, range).unwrap();
        assert_relative_eq!(t, 5.0, epsilon = 1e-5);
        assert!(normal.dot(center.direction) < 0.0);

        let inside_edge = Ray::new(Vec3::new(0.99, 0.99, 5.0), Vec3::NEG_Z);
        assert!(hit_rectangle(&rectangle, &inside_edge, range).is_some());

        let outside = Ray::new(Vec3::new(1.01, 0.0, 5.0), Vec3::NEG_Z);
        assert!(hit_rectangle(&rectangle, &outside, range).is_none());
    }

    #[test]
    fn test_rectangle_normal_faces_ray_from_both_sides() {
        let rectangle = Rectangle::from_edges(Vec3::ZERO, Vec3::X, Vec3::Y, 1);
        let range = Interval::new(MIN_HIT_DISTANCE, f32::MAX);

        let front = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let (_, n_front) = hit_rectangle(&rectangle, &front, range).unwrap();
        let (_, n_back) = hit_rectangle(&rectangle, &back, range).unwrap();
        assert!(n_front.dot(front.direction) < 0.0);
        assert!(n_back.dot(back.direction) < 0.0);
    }

    #[test]
    fn test_rectangle_edge_on_misses() {
        let rectangle = Rectangle::from_edges(Vec3::ZERO, Vec3::X, Vec3::Y, 1);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(
            hit_rectangle(&rectangle, &ray, Interval::new(MIN_HIT_DISTANCE, f32::MAX)).is_none()
        );
    }

    #[test]
    fn test_closest_wins_and_ties_keep_first() {
        let world = {
            let mut builder = WorldBuilder::new(Material::emissive(Vec3::ZERO));
            let first = builder.add_material(Material::diffuse(Vec3::X));
            let second = builder.add_material(Material::diffuse(Vec3::Y));
            let far = builder.add_material(Material::diffuse(Vec3::Z));
            builder
                .set_camera(Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
                .add_sphere(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, far))
                .add_sphere(Sphere::new(Vec3::ZERO, 1.0, first))
                .add_sphere(Sphere::new(Vec3::ZERO, 1.0, second));
            builder.build().unwrap()
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = intersect_world(&world, &ray).unwrap();
        assert_eq!(hit.material_index, 1);
        assert_relative_eq!(hit.t, 9.0, epsilon = 1e-5);
    }

    #[test]
    fn test_empty_world_misses() {
        let world = world_with(|_, _| {});
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(intersect_world(&world, &ray).is_none());
        assert!(Intersector::Wide.intersect(&world, &ray).is_none());
    }
}
