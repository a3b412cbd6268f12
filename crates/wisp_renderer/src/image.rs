//! Output image buffer and tone mapping.

use serde::{Deserialize, Serialize};
use wisp_core::Color;
use wisp_math::Interval;

/// Transfer curve from linear radiance to display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneMap {
    /// Square root, a cheap gamma 2.0 approximation.
    #[default]
    Gamma2,
    /// The piecewise sRGB curve.
    Srgb,
}

impl ToneMap {
    /// Encode one channel. The input is clamped to [0, 1] first.
    pub fn encode(self, linear: f32) -> f32 {
        let linear = Interval::UNIT.clamp(linear);
        match self {
            ToneMap::Gamma2 => linear.sqrt(),
            ToneMap::Srgb => {
                if linear <= 0.003_130_8 {
                    linear * 12.92
                } else {
                    1.055 * linear.powf(1.0 / 2.4) - 0.055
                }
            }
        }
    }
}

/// Tone-map `color` and pack it as RGBA8 with opaque alpha.
///
/// Bytes are laid out R, G, B, A in memory order, so a `&[u32]` of packed
/// pixels reinterprets directly as an RGBA8 byte buffer.
pub fn pack_rgba(color: Color, tone_map: ToneMap) -> u32 {
    let channel = |c: f32| (255.0 * tone_map.encode(c)) as u8;
    u32::from_le_bytes([channel(color.x), channel(color.y), channel(color.z), 255])
}

/// Split a packed pixel back into its RGBA bytes.
#[inline]
pub fn unpack_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// A width x height grid of packed RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl ImageBuffer {
    /// A black, fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Byte copy in R, G, B, A order, ready for `image::RgbaImage::from_raw`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| unpack_rgba(p)).collect()
    }
}
