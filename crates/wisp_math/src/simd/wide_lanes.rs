//! Hardware backends on top of the `wide` crate.
//!
//! `wide` maps f32x4 onto SSE/NEON/simd128 and f32x8 onto AVX when the target
//! enables it, and falls back to pairs of narrower registers otherwise.

use super::LaneF32;
use wide::{f32x4, f32x8, CmpGe, CmpGt, CmpLt};

macro_rules! impl_wide_lane {
    ($ty:ident, $width:literal) => {
        impl LaneF32 for $ty {
            const WIDTH: usize = $width;

            #[inline]
            fn splat(value: f32) -> Self {
                $ty::splat(value)
            }

            #[inline]
            fn load(values: &[f32]) -> Self {
                $ty::new(std::array::from_fn(|i| values[i]))
            }

            #[inline]
            fn store(self, out: &mut [f32]) {
                out[..$width].copy_from_slice(&self.to_array());
            }

            #[inline]
            fn gt_mask(self, rhs: Self) -> Self {
                CmpGt::cmp_gt(self, rhs)
            }

            #[inline]
            fn lt_mask(self, rhs: Self) -> Self {
                CmpLt::cmp_lt(self, rhs)
            }

            #[inline]
            fn ge_mask(self, rhs: Self) -> Self {
                CmpGe::cmp_ge(self, rhs)
            }

            #[inline]
            fn mul_add(self, mul: Self, add: Self) -> Self {
                $ty::mul_add(self, mul, add)
            }

            #[inline]
            fn sqrt(self) -> Self {
                $ty::sqrt(self)
            }

            #[inline]
            fn rsqrt(self) -> Self {
                $ty::recip_sqrt(self)
            }

            #[inline]
            fn abs(self) -> Self {
                $ty::abs(self)
            }

            #[inline]
            fn min(self, rhs: Self) -> Self {
                $ty::min(self, rhs)
            }

            #[inline]
            fn max(self, rhs: Self) -> Self {
                $ty::max(self, rhs)
            }

            #[inline]
            fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
                mask.blend(if_true, if_false)
            }

            #[inline]
            fn any(self) -> bool {
                $ty::any(self)
            }
        }
    };
}

impl_wide_lane!(f32x4, 4);
impl_wide_lane!(f32x8, 8);
