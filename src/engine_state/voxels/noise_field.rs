//! Seeded 2D noise sampled by the terrain generator.

use noise::{NoiseFn, OpenSimplex};

/// A deterministic, stateless 2D noise function.
///
/// Samples are in `[-1, 1]` and depend only on the seed and the coordinates,
/// so the same world regenerates identically on every run. Coordinates are
/// `f64` so that far-out or negative positions keep full precision at low
/// frequencies.
#[derive(Clone, Debug)]
pub struct NoiseField {
    seed: u32,
    source: OpenSimplex,
}

impl NoiseField {
    /// Creates a noise field for `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            source: OpenSimplex::new(seed),
        }
    }

    /// The seed this field was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the field at world position `(x, z)`.
    #[inline]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        self.source.get([x, z]).clamp(-1.0, 1.0)
    }

    /// Samples the field at `(x, z)` scaled by `frequency` cycles per block.
    #[inline]
    pub fn sample_scaled(&self, x: f64, z: f64, frequency: f64) -> f64 {
        self.sample(x * frequency, z * frequency)
    }
}
