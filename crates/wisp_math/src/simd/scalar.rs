//! Portable array backend.
//!
//! Used on targets without a usable vector unit, and as a reference when
//! checking the hardware backends. `rsqrt` is exact here.

use super::LaneF32;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Sub};

const TRUE_BITS: u32 = u32::MAX;

/// `N` plain f32 values behaving like one vector register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarLane<const N: usize>(pub [f32; N]);

impl<const N: usize> ScalarLane<N> {
    #[inline]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i])))
    }

    #[inline]
    fn zip(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }

    #[inline]
    fn compare(self, rhs: Self, f: impl Fn(f32, f32) -> bool) -> Self {
        self.zip(rhs, |a, b| mask_value(f(a, b)))
    }
}

#[inline]
fn mask_value(set: bool) -> f32 {
    f32::from_bits(if set { TRUE_BITS } else { 0 })
}

#[inline]
fn mask_is_set(value: f32) -> bool {
    // Same rule as blendv: only the sign bit matters.
    value.to_bits() >> 31 == 1
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<const N: usize> $trait for ScalarLane<N> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                self.zip(rhs, |a, b| a $op b)
            }
        }
    };
}

impl_binary_op!(Add, add, +);
impl_binary_op!(Sub, sub, -);
impl_binary_op!(Mul, mul, *);
impl_binary_op!(Div, div, /);

impl<const N: usize> Neg for ScalarLane<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.map(|a| -a)
    }
}

impl<const N: usize> BitAnd for ScalarLane<N> {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| f32::from_bits(a.to_bits() & b.to_bits()))
    }
}

impl<const N: usize> BitOr for ScalarLane<N> {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| f32::from_bits(a.to_bits() | b.to_bits()))
    }
}

impl<const N: usize> LaneF32 for ScalarLane<N> {
    const WIDTH: usize = N;

    #[inline]
    fn splat(value: f32) -> Self {
        Self([value; N])
    }

    #[inline]
    fn load(values: &[f32]) -> Self {
        Self(std::array::from_fn(|i| values[i]))
    }

    #[inline]
    fn store(self, out: &mut [f32]) {
        out[..N].copy_from_slice(&self.0);
    }

    #[inline]
    fn gt_mask(self, rhs: Self) -> Self {
        self.compare(rhs, |a, b| a > b)
    }

    #[inline]
    fn lt_mask(self, rhs: Self) -> Self {
        self.compare(rhs, |a, b| a < b)
    }

    #[inline]
    fn ge_mask(self, rhs: Self) -> Self {
        self.compare(rhs, |a, b| a >= b)
    }

    #[inline]
    fn le_mask(self, rhs: Self) -> Self {
        self.compare(rhs, |a, b| a <= b)
    }

    #[inline]
    fn mul_add(self, mul: Self, add: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i].mul_add(mul.0[i], add.0[i])))
    }

    #[inline]
    fn sqrt(self) -> Self {
        self.map(f32::sqrt)
    }

    #[inline]
    fn rsqrt(self) -> Self {
        self.map(|a| 1.0 / a.sqrt())
    }

    #[inline]
    fn abs(self) -> Self {
        self.map(f32::abs)
    }

    #[inline]
    fn min(self, rhs: Self) -> Self {
        self.zip(rhs, f32::min)
    }

    #[inline]
    fn max(self, rhs: Self) -> Self {
        self.zip(rhs, f32::max)
    }

    #[inline]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        Self(std::array::from_fn(|i| {
            if mask_is_set(mask.0[i]) {
                if_true.0[i]
            } else {
                if_false.0[i]
            }
        }))
    }

    #[inline]
    fn any(self) -> bool {
        self.0.iter().copied().any(mask_is_set)
    }
}
