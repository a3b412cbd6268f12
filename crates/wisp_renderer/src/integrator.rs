//! Iterative path tracing with mirror/diffuse blending and Fresnel-weighted
//! refraction.

use wisp_core::{Color, Material, World};
use wisp_math::{Ray, Vec3};

use crate::intersect::Intersector;
use crate::rng::XorShift32;

/// Upper bound on path segments per camera sample.
pub const MAX_BOUNCES: u32 = 8;

/// Radiance carried back along one camera path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Color,
    /// Path segments traced, including the final miss.
    pub bounces: u32,
}

/// Result of bending a ray through an interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refraction {
    pub direction: Vec3,
    /// Cosine of the incidence angle, measured against the normal facing the
    /// incoming ray. Always non-negative.
    pub cos_incident: f32,
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - normal * (2.0 * normal.dot(direction))
}

/// Snell refraction of a unit `incident` direction.
///
/// `normal` is the outward surface normal. A ray travelling against it is
/// entering the medium (ratio `1 / refractive_index`); otherwise it is leaving
/// and the normal is flipped. Returns `None` on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, refractive_index: f32) -> Option<Refraction> {
    let cos = incident.dot(normal).clamp(-1.0, 1.0);
    let (cos, normal, eta) = if cos < 0.0 {
        (-cos, normal, 1.0 / refractive_index)
    } else {
        (cos, -normal, refractive_index)
    };

    let discriminant = 1.0 - eta * eta * (1.0 - cos * cos);
    if discriminant < 0.0 {
        return None;
    }

    Some(Refraction {
        direction: incident * eta + normal * (eta * cos - discriminant.sqrt()),
        cos_incident: cos,
    })
}

/// Schlick's approximation of the Fresnel reflectance.
#[inline]
pub fn schlick(cos: f32, refractive_index: f32) -> f32 {
    let r0 = (1.0 - refractive_index) / (1.0 + refractive_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cos).powi(5)
}

/// Pick the outgoing direction at a surface hit.
///
/// The candidate reflection blends a random direction around `normal` with
/// the mirror direction by `material.reflection`. Transmissive materials
/// then keep it with probability given by the Fresnel term and refract
/// otherwise; when refraction is impossible the reflection is always kept.
pub fn scatter(direction: Vec3, normal: Vec3, material: &Material, rng: &mut XorShift32) -> Vec3 {
    let mirror = reflect(direction, normal);
    let random = normal + rng.bilateral_vec3();
    let reflected = random.lerp(mirror, material.reflection).normalize_or_zero();

    if material.refractive_index == 0.0 {
        return reflected;
    }

    let refraction = refract(direction, normal, material.refractive_index);
    let fresnel = refraction
        .map(|r| schlick(r.cos_incident, material.refractive_index))
        .unwrap_or(1.0);
    match refraction {
        Some(r) if rng.unilateral() > fresnel => r.direction,
        _ => reflected,
    }
}

/// Trace one camera path through `world`.
///
/// Every iteration counts as a bounce. A miss adds the environment's
/// emission and ends the path; a hit adds the surface emission, tints the
/// throughput by the surface color and continues in the direction chosen by
/// [`scatter`].
pub fn trace_path(
    world: &World,
    ray: Ray,
    intersector: Intersector,
    rng: &mut XorShift32,
) -> PathSample {
    let mut radiance = Color::ZERO;
    let mut attenuation = Color::ONE;
    let mut ray = ray;
    let mut bounces = 0;

    while bounces < MAX_BOUNCES {
        bounces += 1;

        let Some(hit) = intersector.intersect(world, &ray) else {
            radiance += attenuation * world.environment().emit_color;
            break;
        };

        let material = world.material(hit.material_index);
        radiance += attenuation * material.emit_color;
        attenuation *= material.color;

        let origin = ray.at(hit.t);
        let direction = scatter(ray.direction, hit.normal, material, rng);
        ray = Ray::new(origin, direction);
    }

    PathSample { radiance, bounces }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wisp_core::{Camera, Material, Sphere, WorldBuilder};

    #[test]
    fn test_reflect() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, Vec3::Y);
        assert_relative_eq!(r.x, d.x);
        assert_relative_eq!(r.y, -d.y);
    }

    #[test]
    fn test_refract_head_on_passes_straight() {
        let r = refract(Vec3::NEG_Z, Vec3::Z, 1.5).unwrap();
        assert_relative_eq!(r.direction.z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(r.cos_incident, 1.0);
    }

    #[test]
    fn test_refract_entering_bends_toward_normal() {
        let incident = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = refract(incident, Vec3::Y, 1.5).unwrap();
        let sin_in = incident.x;
        let sin_out = r.direction.x / r.direction.length();
        assert_relative_eq!(sin_in / sin_out, 1.5, epsilon = 1e-4);
        assert_relative_eq!(r.direction.length(), 1.0, epsilon = 1e-5);
        assert!(r.direction.y < 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass (ior 1.5) beyond the ~41.8 degree critical angle.
        let angle = 60f32.to_radians();
        let incident = Vec3::new(angle.sin(), angle.cos(), 0.0);
        assert!(refract(incident, Vec3::Y, 1.5).is_none());

        // Just inside the critical angle it still refracts.
        let angle = 40f32.to_radians();
        let incident = Vec3::new(angle.sin(), angle.cos(), 0.0);
        assert!(refract(incident, Vec3::Y, 1.5).is_some());
    }

    #[test]
    fn test_schlick_limits() {
        assert_relative_eq!(schlick(1.0, 1.5), 0.04, epsilon = 1e-6);
        assert_relative_eq!(schlick(0.0, 1.5), 1.0, epsilon = 1e-6);
        assert_relative_eq!(schlick(1.0, 1.0), 0.0);
    }

    fn emitting_environment(emit: Color) -> WorldBuilder {
        let mut builder = WorldBuilder::new(Material::emissive(emit));
        builder.set_camera(Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO));
        builder
    }

    #[test]
    fn test_scatter_always_reflects_under_total_internal_reflection() {
        // Inside glass, meeting the wall 60 degrees off the outward normal,
        // past the ~41.8 degree critical angle.
        let glass = Material::dielectric(Color::ONE, 1.5);
        let angle = 60f32.to_radians();
        let incident = Vec3::new(angle.sin(), angle.cos(), 0.0);
        let mirror = reflect(incident, Vec3::Y);

        for seed in 1..=1000 {
            let mut rng = XorShift32::new(seed);
            let out = scatter(incident, Vec3::Y, &glass, &mut rng);
            assert!((out - mirror).length() < 1e-5, "seed {seed}: {out:?}");
            assert!(out.y < 0.0);
        }
    }

    #[test]
    fn test_scatter_refracts_some_of_the_time_below_critical_angle() {
        // Same wall at 20 degrees: mostly transmitted, sometimes reflected.
        let glass = Material::dielectric(Color::ONE, 1.5);
        let angle = 20f32.to_radians();
        let incident = Vec3::new(angle.sin(), angle.cos(), 0.0);
        let refracted = refract(incident, Vec3::Y, 1.5).unwrap().direction;

        let mut transmitted = 0;
        for seed in 1..=1000 {
            let out = scatter(incident, Vec3::Y, &glass, &mut XorShift32::new(seed));
            if (out - refracted).length() < 1e-5 {
                transmitted += 1;
            } else {
                assert!(out.y < 0.0);
            }
        }
        assert!(transmitted > 800 && transmitted < 1000, "transmitted {transmitted}");
    }

    #[test]
    fn test_path_inside_glass_stays_trapped_past_critical_angle() {
        // A ray inside a glass sphere hitting the wall beyond the critical
        // angle reflects on every bounce, so it never reaches the bright
        // environment.
        let mut builder = emitting_environment(Vec3::ONE);
        let glass = builder.add_material(Material::dielectric(Color::ONE, 1.5));
        builder.add_sphere(Sphere::new(Vec3::ZERO, 1.0, glass));
        let world = builder.build().unwrap();

        // Chord at distance 0.9 from the center meets the wall at about 64
        // degrees to the normal; every reflection keeps that angle.
        let ray = Ray::new(Vec3::new(0.0, 0.9, 0.0), Vec3::X);
        for seed in 1..=200 {
            let sample = trace_path(&world, ray, Intersector::Scalar, &mut XorShift32::new(seed));
            assert_eq!(sample.bounces, MAX_BOUNCES, "seed {seed}");
            assert_eq!(sample.radiance, Vec3::ZERO, "seed {seed}");
        }
    }

    #[test]
    fn test_miss_returns_environment() {
        let world = emitting_environment(Vec3::new(0.3, 0.4, 0.5)).build().unwrap();
        let mut rng = XorShift32::new(1);
        for intersector in [Intersector::Scalar, Intersector::Wide] {
            let sample = trace_path(&world, Ray::new(Vec3::ZERO, Vec3::Z), intersector, &mut rng);
            assert_eq!(sample.radiance, Vec3::new(0.3, 0.4, 0.5));
            assert_eq!(sample.bounces, 1);
        }
    }

    #[test]
    fn test_emitter_hit_then_escape() {
        let mut builder = emitting_environment(Vec3::ZERO);
        let light = builder.add_material(Material::emissive(Vec3::splat(2.0)));
        builder.add_sphere(Sphere::new(Vec3::ZERO, 1.0, light));
        let world = builder.build().unwrap();

        let mut rng = XorShift32::new(5);
        let sample = trace_path(
            &world,
            Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z),
            Intersector::Scalar,
            &mut rng,
        );
        // Emissive materials are black, so nothing after the first hit counts.
        assert_eq!(sample.radiance, Vec3::splat(2.0));
        assert!(sample.bounces >= 2);
    }

    #[test]
    fn test_bounces_capped() {
        // Camera inside a closed mirror sphere never escapes.
        let mut builder = emitting_environment(Vec3::ONE);
        let mirror = builder.add_material(Material::mirror(Vec3::splat(0.9), 1.0));
        builder.add_sphere(Sphere::new(Vec3::ZERO, 10.0, mirror));
        let world = builder.build().unwrap();

        let mut rng = XorShift32::new(9);
        let sample = trace_path(&world, Ray::new(Vec3::ZERO, Vec3::X), Intersector::Wide, &mut rng);
        assert_eq!(sample.bounces, MAX_BOUNCES);
        assert_eq!(sample.radiance, Vec3::ZERO);
    }

    #[test]
    fn test_same_seed_same_path() {
        let world = wisp_core::ScenePreset::CornellBox.build().unwrap();
        let ray = world.camera().ray_through(0.1, -0.2, 1.0);
        let a = trace_path(&world, ray, Intersector::Wide, &mut XorShift32::new(77));
        let b = trace_path(&world, ray, Intersector::Wide, &mut XorShift32::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_engines_trace_identical_paths() {
        let world = wisp_core::ScenePreset::DemoSpheres.build().unwrap();
        for seed in 1..32u32 {
            let film_x = (seed as f32 / 16.0) - 1.0;
            let ray = world.camera().ray_through(film_x, 0.0, 16.0 / 9.0);
            let scalar = trace_path(&world, ray, Intersector::Scalar, &mut XorShift32::new(seed));
            let wide = trace_path(&world, ray, Intersector::Wide, &mut XorShift32::new(seed));
            assert_eq!(scalar.bounces, wide.bounces);
            assert!((scalar.radiance - wide.radiance).length() < 1e-3);
        }
    }
}
