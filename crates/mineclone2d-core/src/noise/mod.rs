//! Noise generation primitives.
//!
//! Pure Rust, seeded through [`DeterministicRng`](crate::rng::DeterministicRng)
//! so the same seed always produces the same terrain.

mod value;

pub use value::{ValueNoise1D, VERTEX_COUNT};

/// Trait for 1D noise generators.
pub trait Noise1D {
    /// Sample the noise at `x`.
    fn sample(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> Noise1D for F {
    fn sample(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Smooth interpolation (smoothstep).
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation, weighted form `a*(1-t) + b*t`.
///
/// Returns exactly `a` at `t = 0` and exactly `b` at `t = 1`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}
