//! 32-bit xorshift generator.
//!
//! Each work order seeds its own generator from its row range, so orders are
//! reproducible on their own and threads never share RNG state.

use rand::{Error, RngCore, SeedableRng};
use wisp_math::Vec3;

/// Substituted for a zero seed. Zero is a fixed point of xorshift.
const FALLBACK_SEED: u32 = 0x9E37_79B9;

/// Marsaglia's xorshift32 (shifts 13, 17, 5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator. A zero seed is replaced by a fixed non-zero one.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Advance and return the new state.
    #[inline]
    pub fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform float in [0, 1).
    #[inline]
    pub fn unilateral(&mut self) -> f32 {
        // Top 24 bits fit the f32 mantissa exactly.
        (self.step() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Uniform float in [-1, 1).
    #[inline]
    pub fn bilateral(&mut self) -> f32 {
        2.0 * self.unilateral() - 1.0
    }

    /// Vector with each component uniform in [-1, 1).
    #[inline]
    pub fn bilateral_vec3(&mut self) -> Vec3 {
        let x = self.bilateral();
        let y = self.bilateral();
        let z = self.bilateral();
        Vec3::new(x, y, z)
    }
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.step() as u64;
        let low = self.step() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
