//! Surface description shared by every primitive.

use wisp_math::Vec3;

/// Color type alias (linear RGB, unbounded for emitters)
pub type Color = Vec3;

/// How a surface reflects, transmits and emits light.
///
/// Materials are immutable once the world is built and are referenced from
/// primitives by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Multiplies the path throughput on every hit
    pub color: Color,

    /// Light emitted towards the viewer
    pub emit_color: Color,

    /// 0 = pure diffuse, 1 = perfect mirror
    pub reflection: f32,

    /// Index of refraction; 0 means opaque
    pub refractive_index: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::ONE,
            emit_color: Color::ZERO,
            reflection: 0.0,
            refractive_index: 0.0,
        }
    }
}

impl Material {
    /// Opaque lambertian-like surface.
    pub fn diffuse(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Glossy surface. `reflection` is clamped to [0, 1].
    pub fn mirror(color: Color, reflection: f32) -> Self {
        Self {
            color,
            reflection: reflection.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Pure emitter. Absorbs everything it does not emit.
    pub fn emissive(emit_color: Color) -> Self {
        Self {
            color: Color::ZERO,
            emit_color,
            ..Default::default()
        }
    }

    /// Transmissive surface (glass, water, ...).
    ///
    /// Reflected rays off a dielectric are perfect mirror bounces.
    pub fn dielectric(color: Color, refractive_index: f32) -> Self {
        Self {
            color,
            reflection: 1.0,
            refractive_index,
            ..Default::default()
        }
    }

    /// Add emission to an existing material.
    pub fn with_emission(mut self, emit_color: Color) -> Self {
        self.emit_color = emit_color;
        self
    }

    /// Whether rays can pass through the surface.
    #[inline]
    pub fn is_transmissive(&self) -> bool {
        self.refractive_index != 0.0
    }

    /// Whether the surface emits light.
    pub fn is_emissive(&self) -> bool {
        self.emit_color.length_squared() > 0.0
    }
}
