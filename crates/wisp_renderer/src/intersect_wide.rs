//! Lane-parallel closest-hit search.
//!
//! Planes are few and stay scalar. Spheres and rectangles are tested a whole
//! lane batch at a time: every slot keeps its own closest hit under a mask,
//! and one horizontal pass at the end picks the winner. The result matches
//! [`crate::intersect::intersect_world`], including which primitive wins a
//! tie (the one scanned first).

use wisp_core::primitive::HALF_EXTENT;
use wisp_core::soa::PADDING_INDEX;
use wisp_core::{RectangleLane, SphereLane, World};
use wisp_math::simd::MAX_LANE_WIDTH;
use wisp_math::{Interval, Lane, LaneF32, LaneMat4, LaneVec3, Ray, Vec3, LANE_WIDTH};

use crate::intersect::{hit_plane, HitRecord, HIT_TOLERANCE, MIN_HIT_DISTANCE};

/// Per-slot closest hit of one primitive type.
struct SlotHits {
    t: Lane,
    material: Lane,
    normal: LaneVec3<Lane>,
    /// Primitive index of the slot's hit, `PADDING_INDEX` while it has none.
    index: Lane,
}

impl SlotHits {
    fn new(closest_t: f32) -> Self {
        Self {
            t: Lane::splat(closest_t),
            material: Lane::splat(0.0),
            normal: LaneVec3::splat(Vec3::ZERO),
            index: Lane::splat(PADDING_INDEX),
        }
    }

    #[inline]
    fn update(&mut self, mask: Lane, t: Lane, material: Lane, normal: LaneVec3<Lane>, index: Lane) {
        self.t = Lane::select(mask, t, self.t);
        self.material = Lane::select(mask, material, self.material);
        self.normal = LaneVec3::select(mask, normal, self.normal);
        self.index = Lane::select(mask, index, self.index);
    }

    /// Reduce the slots to the single closest hit.
    ///
    /// Equal distances go to the smaller primitive index, which is the one a
    /// sequential scan would have kept.
    fn closest(&self) -> Option<HitRecord> {
        let mut ts = [0.0f32; MAX_LANE_WIDTH];
        let mut indices = [0.0f32; MAX_LANE_WIDTH];
        self.t.store(&mut ts);
        self.index.store(&mut indices);

        let mut best: Option<usize> = None;
        for slot in 0..LANE_WIDTH {
            if indices[slot] < 0.0 {
                continue;
            }
            best = match best {
                Some(b) if ts[b] < ts[slot] => Some(b),
                Some(b) if ts[b] == ts[slot] && indices[b] < indices[slot] => Some(b),
                _ => Some(slot),
            };
        }

        let slot = best?;
        let mut materials = [0.0f32; MAX_LANE_WIDTH];
        self.material.store(&mut materials);
        Some(HitRecord {
            t: ts[slot],
            normal: self.normal.extract(slot),
            material_index: materials[slot] as u32,
        })
    }
}

/// Closest hit over every primitive in `world`, spheres and rectangles a lane
/// batch at a time.
pub fn intersect_world_wide(world: &World, ray: &Ray) -> Option<HitRecord> {
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

    let origin = LaneVec3::<Lane>::splat(ray.origin);
    let direction = LaneVec3::<Lane>::splat(ray.direction);

    if let Some(sphere_hit) = hit_sphere_lanes(world.sphere_lanes(), origin, direction, closest.max) {
        closest = closest.with_max(sphere_hit.t);
        hit = Some(sphere_hit);
    }

    if let Some(rectangle_hit) =
        hit_rectangle_lanes(world.rectangle_lanes(), origin, direction, closest.max)
    {
        hit = Some(rectangle_hit);
    }

    hit
}

/// Closest sphere hit nearer than `closest_t`.
fn hit_sphere_lanes(
    lanes: &[SphereLane],
    origin: LaneVec3<Lane>,
    direction: LaneVec3<Lane>,
    closest_t: f32,
) -> Option<HitRecord> {
    if lanes.is_empty() {
        return None;
    }

    let zero = Lane::splat(0.0);
    let two = Lane::splat(2.0);
    let four = Lane::splat(4.0);
    let min_hit = Lane::splat(MIN_HIT_DISTANCE);

    let a = direction.dot(direction);
    let denom = two * a;
    let mut hits = SlotHits::new(closest_t);

    for lane in lanes {
        let center = LaneVec3::<Lane>::load(&lane.x, &lane.y, &lane.z);
        let radius = Lane::load(&lane.radius);
        let index = Lane::load(&lane.index);

        let oc = origin - center;
        let b = two * direction.dot(oc);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - four * a * c;

        // Negative discriminants give NaN roots; the mask drops those slots.
        let root = discriminant.sqrt();
        let t_far = (-b + root) / denom;
        let t_near = (-b - root) / denom;
        let prefer_near = t_near.gt_mask(min_hit) & t_near.lt_mask(t_far);
        let t = Lane::select(prefer_near, t_near, t_far);

        let mask = discriminant.gt_mask(zero)
            & t.gt_mask(min_hit)
            & t.lt_mask(hits.t)
            & index.ge_mask(zero);
        if mask.is_zeroed() {
            continue;
        }

        let position = origin + direction * t;
        let normal = (position - center).normalize();
        hits.update(mask, t, Lane::load(&lane.material), normal, index);
    }

    hits.closest()
}

/// Closest rectangle hit nearer than `closest_t`.
fn hit_rectangle_lanes(
    lanes: &[RectangleLane],
    origin: LaneVec3<Lane>,
    direction: LaneVec3<Lane>,
    closest_t: f32,
) -> Option<HitRecord> {
    if lanes.is_empty() {
        return None;
    }

    let zero = Lane::splat(0.0);
    let min_hit = Lane::splat(MIN_HIT_DISTANCE);
    let tolerance = Lane::splat(HIT_TOLERANCE);
    let half_extent = Lane::splat(HALF_EXTENT);
    let mut hits = SlotHits::new(closest_t);

    for lane in lanes {
        let inverse = LaneMat4::<Lane>::from_fn(|row, column| Lane::load(&lane.inverse[row * 4 + column]));
        let index = Lane::load(&lane.index);

        let local_origin = inverse.transform_point3(origin);
        let local_direction = inverse.transform_vector3(direction);

        // Padding slots have a zero matrix, so their local z direction is
        // zero and they fail the tolerance test as well as the index test.
        let crosses = local_direction.z.abs().gt_mask(tolerance);
        let t = -local_origin.z / local_direction.z;
        let x = local_origin.x + local_direction.x * t;
        let y = local_origin.y + local_direction.y * t;
        let inside = x.abs().le_mask(half_extent) & y.abs().le_mask(half_extent);

        let mask = crosses
            & t.gt_mask(min_hit)
            & t.lt_mask(hits.t)
            & inside
            & index.ge_mask(zero);
        if mask.is_zeroed() {
            continue;
        }

        let normal = LaneVec3::<Lane>::load(&lane.normal_x, &lane.normal_y, &lane.normal_z);
        let faces_away = normal.dot(direction).gt_mask(zero);
        let normal = LaneVec3::select(faces_away, -normal, normal);
        hits.update(mask, t, Lane::load(&lane.material), normal, index);
    }

    hits.closest()
}
