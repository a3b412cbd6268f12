//! Fixed-width float lanes for batched intersection.
//!
//! Every backend implements [`LaneF32`]; the rest of the renderer only ever
//! names the [`Lane`] alias, which is picked at build time:
//!
//! | features                  | `Lane`           | width |
//! |---------------------------|------------------|-------|
//! | (default)                 | `wide::f32x8`    | 8     |
//! | `lane4`                   | `wide::f32x4`    | 4     |
//! | `scalar-lanes`            | `ScalarLane<8>`  | 8     |
//! | `scalar-lanes` + `lane4`  | `ScalarLane<4>`  | 4     |
//!
//! Masks use the same type as values: a lane is "true" when all of its bits
//! are set, which is what hardware compares produce.

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Sub};

mod scalar;
mod vector;
mod wide_lanes;

pub use scalar::ScalarLane;
pub use vector::{LaneMat4, LaneVec3, LaneVec4};

/// Largest lane width any backend uses. Sizes stack scratch buffers.
pub const MAX_LANE_WIDTH: usize = 16;

/// A batch of `WIDTH` f32 values processed together.
pub trait LaneF32:
    Copy
    + Send
    + Sync
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
{
    /// Number of values in one lane.
    const WIDTH: usize;

    /// Broadcast one value into every slot.
    fn splat(value: f32) -> Self;

    /// Load the first `WIDTH` values of `values`.
    ///
    /// Panics if `values` is shorter than `WIDTH`.
    fn load(values: &[f32]) -> Self;

    /// Store every slot into the first `WIDTH` entries of `out`.
    fn store(self, out: &mut [f32]);

    /// Slot-wise `self > rhs` mask.
    fn gt_mask(self, rhs: Self) -> Self;

    /// Slot-wise `self < rhs` mask.
    fn lt_mask(self, rhs: Self) -> Self;

    /// Slot-wise `self >= rhs` mask.
    fn ge_mask(self, rhs: Self) -> Self;

    /// Slot-wise `self <= rhs` mask.
    fn le_mask(self, rhs: Self) -> Self {
        rhs.ge_mask(self)
    }

    /// `self * mul + add`, fused when the backend supports it.
    fn mul_add(self, mul: Self, add: Self) -> Self;

    fn sqrt(self) -> Self;

    /// Reciprocal square root. Hardware backends return an approximation.
    fn rsqrt(self) -> Self;

    fn abs(self) -> Self;

    fn min(self, rhs: Self) -> Self;

    fn max(self, rhs: Self) -> Self;

    /// Branchless per-slot choice: `if_true` where `mask` is set, else `if_false`.
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self;

    /// True if any slot of the mask is set.
    fn any(self) -> bool;

    /// True if no slot of the mask is set.
    #[inline]
    fn is_zeroed(self) -> bool {
        !self.any()
    }
}

#[cfg(all(not(feature = "scalar-lanes"), not(feature = "lane4")))]
pub type Lane = wide::f32x8;

#[cfg(all(not(feature = "scalar-lanes"), feature = "lane4"))]
pub type Lane = wide::f32x4;

#[cfg(all(feature = "scalar-lanes", not(feature = "lane4")))]
pub type Lane = ScalarLane<8>;

#[cfg(all(feature = "scalar-lanes", feature = "lane4"))]
pub type Lane = ScalarLane<4>;

/// Width of the build-selected [`Lane`].
pub const LANE_WIDTH: usize = <Lane as LaneF32>::WIDTH;

/// Number of lanes needed to hold `count` primitives.
#[inline]
pub const fn lane_count(count: usize) -> usize {
    count.div_ceil(LANE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the same checks against any backend.
    fn exercise_backend<L: LaneF32>() {
        // A 4-wide lane sees [-1.5, -0.5, 0.5, 1.5]: both sides of every
        // threshold below, whatever the width.
        let mut values = [0.0f32; MAX_LANE_WIDTH];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f32 - 1.5;
        }
        let a = L::load(&values);
        let b = L::splat(1.0);

        let mut out = [0.0f32; MAX_LANE_WIDTH];
        (a + b).store(&mut out);
        for i in 0..L::WIDTH {
            assert_eq!(out[i], values[i] + 1.0);
        }

        // Select picks `a` where a > 1, otherwise zero.
        let mask = a.gt_mask(b);
        L::select(mask, a, L::splat(0.0)).store(&mut out);
        for i in 0..L::WIDTH {
            let expected = if values[i] > 1.0 { values[i] } else { 0.0 };
            assert_eq!(out[i], expected);
        }

        assert!(mask.any());
        assert_eq!(out[3], 1.5);
        assert!(a.gt_mask(L::splat(1000.0)).is_zeroed());
        assert!((a.lt_mask(b) & a.ge_mask(b)).is_zeroed());
        assert!(!(a.lt_mask(b) | a.ge_mask(b)).is_zeroed());

        a.mul_add(L::splat(2.0), L::splat(3.0)).store(&mut out);
        for i in 0..L::WIDTH {
            assert_eq!(out[i], values[i] * 2.0 + 3.0);
        }

        (-a).abs().store(&mut out);
        for i in 0..L::WIDTH {
            assert_eq!(out[i], values[i].abs());
        }

        L::splat(16.0).sqrt().store(&mut out);
        assert_eq!(out[0], 4.0);
        L::splat(4.0).rsqrt().store(&mut out);
        assert!((out[0] - 0.5).abs() < 1e-3);

        a.min(b).store(&mut out);
        assert_eq!(out[0], -1.5);
        a.max(b).store(&mut out);
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn test_wide_f32x8_backend() {
        exercise_backend::<wide::f32x8>();
    }

    #[test]
    fn test_wide_f32x4_backend() {
        exercise_backend::<wide::f32x4>();
    }

    #[test]
    fn test_scalar_backends() {
        exercise_backend::<ScalarLane<4>>();
        exercise_backend::<ScalarLane<8>>();
    }

    #[test]
    fn test_lane_count() {
        assert_eq!(lane_count(0), 0);
        assert_eq!(lane_count(1), 1);
        assert_eq!(lane_count(LANE_WIDTH), 1);
        assert_eq!(lane_count(LANE_WIDTH + 1), 2);
    }
}
