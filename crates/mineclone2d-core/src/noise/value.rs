//! 1D value noise.
//!
//! A table of random vertices in [0, 1) interpolated with a smoothstep ease
//! curve. Used to carve the terrain height profile.

use super::{lerp, smoothstep, Noise1D};
use crate::rng::DeterministicRng;

/// Number of random vertices in the lattice table.
pub const VERTEX_COUNT: usize = 256;

/// 1D value noise generator.
#[derive(Clone, Debug)]
pub struct ValueNoise1D {
    vertices: [f64; VERTEX_COUNT],
    amplitude: f64,
    scale: f64,
}

impl ValueNoise1D {
    /// Create a new generator with the given seed.
    pub fn new(seed: u32) -> Self {
        let mut rng = DeterministicRng::new(seed);
        Self::from_rng(&mut rng)
    }

    /// Create a new generator drawing its vertices from an existing RNG.
    pub fn from_rng(rng: &mut DeterministicRng) -> Self {
        let mut vertices = [0.0; VERTEX_COUNT];
        for v in vertices.iter_mut() {
            *v = rng.gen_f64();
        }
        Self::from_vertices(vertices)
    }

    /// Create a generator over a fixed vertex table (amplitude 1, scale 1).
    pub fn from_vertices(vertices: [f64; VERTEX_COUNT]) -> Self {
        Self {
            vertices,
            amplitude: 1.0,
            scale: 1.0,
        }
    }

    /// Set the output multiplier. Any value is accepted.
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// Set the input frequency multiplier. Any value is accepted.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn vertices(&self) -> &[f64; VERTEX_COUNT] {
        &self.vertices
    }

    /// Sample the noise at `x`.
    ///
    /// Total over every input: non-finite `x`, scale or amplitude yield NaN
    /// or infinite output instead of panicking.
    pub fn value(&self, x: f64) -> f64 {
        let scaled = x * self.scale;
        let floor = scaled.floor();
        let t = scaled - floor;
        let eased = smoothstep(t);

        // Float-to-int casts saturate (NaN maps to 0) so the index is always valid.
        let idx_min = (floor as i64).rem_euclid(VERTEX_COUNT as i64) as usize;
        let idx_max = (idx_min + 1) % VERTEX_COUNT;

        lerp(self.vertices[idx_min], self.vertices[idx_max], eased) * self.amplitude
    }
}

impl Noise1D for ValueNoise1D {
    fn sample(&self, x: f64) -> f64 {
        self.value(x)
    }
}
