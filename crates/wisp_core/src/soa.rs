//! Structure-of-arrays lane batches of spheres and rectangles.
//!
//! Each batch holds up to `LANE_WIDTH` primitives with every scalar field in
//! its own lane-width array, so the wide intersector loads a field of the
//! whole batch with a single vector load:
//!
//! ```text
//! x:        [x0, x1, x2, x3, x4, x5, x6, x7]
//! y:        [y0, y1, y2, y3, y4, y5, y6, y7]
//! ...
//! index:    [ 8,  9, 10, -1, -1, -1, -1, -1]   <- partial last batch
//! ```
//!
//! `ceil(count / LANE_WIDTH)` batches exist. Unused slots of the last batch
//! are padding: their `index` is `-1` and their geometry is inert (zero
//! radius, zero matrix), so they never produce a hit.
//!
//! Material and primitive indices are stored as f32 so they can flow through
//! the same masked selects as distances. They are exact below 2^24.

use crate::primitive::{Rectangle, Sphere};
use wisp_math::LANE_WIDTH;

/// `index` value of an unused slot.
pub const PADDING_INDEX: f32 = -1.0;

/// Largest index that survives the round trip through f32.
pub const MAX_LANE_INDEX: usize = 1 << 24;

/// Up to `LANE_WIDTH` spheres in structure-of-arrays form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(32))]
pub struct SphereLane {
    pub x: [f32; LANE_WIDTH],
    pub y: [f32; LANE_WIDTH],
    pub z: [f32; LANE_WIDTH],
    pub radius: [f32; LANE_WIDTH],
    pub material: [f32; LANE_WIDTH],
    /// Position in the world's sphere array, `-1` for padding
    pub index: [f32; LANE_WIDTH],
}

impl SphereLane {
    /// A batch made only of padding slots.
    pub const EMPTY: SphereLane = SphereLane {
        x: [0.0; LANE_WIDTH],
        y: [0.0; LANE_WIDTH],
        z: [0.0; LANE_WIDTH],
        radius: [0.0; LANE_WIDTH],
        material: [0.0; LANE_WIDTH],
        index: [PADDING_INDEX; LANE_WIDTH],
    };

    /// Pack spheres into lane batches, preserving storage order.
    pub fn pack(spheres: &[Sphere]) -> Vec<SphereLane> {
        spheres
            .chunks(LANE_WIDTH)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let mut lane = SphereLane::EMPTY;
                for (slot, sphere) in chunk.iter().enumerate() {
                    lane.x[slot] = sphere.position.x;
                    lane.y[slot] = sphere.position.y;
                    lane.z[slot] = sphere.position.z;
                    lane.radius[slot] = sphere.radius;
                    lane.material[slot] = sphere.material_index as f32;
                    lane.index[slot] = (chunk_index * LANE_WIDTH + slot) as f32;
                }
                lane
            })
            .collect()
    }

    /// Number of live (non-padding) slots.
    pub fn live_count(&self) -> usize {
        self.index.iter().filter(|&&i| i != PADDING_INDEX).count()
    }
}

/// Up to `LANE_WIDTH` rectangles in structure-of-arrays form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(32))]
pub struct RectangleLane {
    /// Inverse transform, row-major: element `(row, column)` is at `row * 4 + column`
    pub inverse: [[f32; LANE_WIDTH]; 16],
    pub normal_x: [f32; LANE_WIDTH],
    pub normal_y: [f32; LANE_WIDTH],
    pub normal_z: [f32; LANE_WIDTH],
    pub material: [f32; LANE_WIDTH],
    /// Position in the world's rectangle array, `-1` for padding
    pub index: [f32; LANE_WIDTH],
}

impl RectangleLane {
    /// A batch made only of padding slots.
    pub const EMPTY: RectangleLane = RectangleLane {
        inverse: [[0.0; LANE_WIDTH]; 16],
        normal_x: [0.0; LANE_WIDTH],
        normal_y: [0.0; LANE_WIDTH],
        normal_z: [0.0; LANE_WIDTH],
        material: [0.0; LANE_WIDTH],
        index: [PADDING_INDEX; LANE_WIDTH],
    };

    /// Pack rectangles into lane batches, preserving storage order.
    pub fn pack(rectangles: &[Rectangle]) -> Vec<RectangleLane> {
        rectangles
            .chunks(LANE_WIDTH)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let mut lane = RectangleLane::EMPTY;
                for (slot, rectangle) in chunk.iter().enumerate() {
                    for row in 0..4 {
                        let values = rectangle.inverse.row(row);
                        for column in 0..4 {
                            lane.inverse[row * 4 + column][slot] = values[column];
                        }
                    }
                    lane.normal_x[slot] = rectangle.normal.x;
                    lane.normal_y[slot] = rectangle.normal.y;
                    lane.normal_z[slot] = rectangle.normal.z;
                    lane.material[slot] = rectangle.material_index as f32;
                    lane.index[slot] = (chunk_index * LANE_WIDTH + slot) as f32;
                }
                lane
            })
            .collect()
    }

    /// Number of live (non-padding) slots.
    pub fn live_count(&self) -> usize {
        self.index.iter().filter(|&&i| i != PADDING_INDEX).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_math::{simd::lane_count, Mat4, Vec3};

    fn spheres(count: usize) -> Vec<Sphere> {
        (0..count)
            .map(|i| Sphere::new(Vec3::new(i as f32, 0.0, 0.0), 1.0 + i as f32, i as u32))
            .collect()
    }

    #[test]
    fn test_pack_empty() {
        assert!(SphereLane::pack(&[]).is_empty());
        assert!(RectangleLane::pack(&[]).is_empty());
    }

    #[test]
    fn test_pack_partial_last_lane() {
        let count = LANE_WIDTH + 3;
        let lanes = SphereLane::pack(&spheres(count));

        assert_eq!(lanes.len(), lane_count(count));
        assert_eq!(lanes[0].live_count(), LANE_WIDTH);
        assert_eq!(lanes[1].live_count(), 3);

        // Storage order survives packing.
        assert_eq!(lanes[1].index[0], LANE_WIDTH as f32);
        assert_eq!(lanes[1].x[2], (LANE_WIDTH + 2) as f32);
        assert_eq!(lanes[1].material[1], (LANE_WIDTH + 1) as f32);

        // Padding is inert.
        assert_eq!(lanes[1].radius[3], 0.0);
        assert_eq!(lanes[1].index[LANE_WIDTH - 1], PADDING_INDEX);
    }

    #[test]
    fn test_pack_rectangle_inverse_rows() {
        let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let rectangle = Rectangle::new(transform, 4);
        let lanes = RectangleLane::pack(&[rectangle]);

        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].live_count(), 1);
        // Row 0 of the inverse translation is (1, 0, 0, -1).
        assert_eq!(lanes[0].inverse[0][0], 1.0);
        assert_eq!(lanes[0].inverse[3][0], -1.0);
        assert_eq!(lanes[0].inverse[7][0], -2.0);
        assert_eq!(lanes[0].inverse[11][0], -3.0);
        assert_eq!(lanes[0].material[0], 4.0);
        // Padding slots carry a zero matrix.
        if LANE_WIDTH > 1 {
            assert!(lanes[0].inverse.iter().all(|element| element[1] == 0.0));
        }
    }
}
