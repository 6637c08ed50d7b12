use digest::{ExtendableOutput, Update, XofReader};
use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use sha3::Shake256;

use crate::error::{Error, Result};

/// shake-256 wrapper
pub(crate) fn shake_256(data: &[u8], len: usize) -> Vec<u8> {
    let mut hasher = Shake256::default();
    hasher.update(data);
    let mut reader = hasher.finalize_xof();

    let mut buffer = vec![0; len];
    reader.read(&mut buffer);
    buffer
}

/// Error sampler. Seeded through SHAKE-256 so that a given seed replays the
/// exact same noise.
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    rng: StdRng,
    gaussian: Normal<f64>,
}

impl NoiseSampler {
    pub fn new(seed: &[u8], sigma: f64) -> Result<Self> {
        let mut key = [0u8; 32];
        key.copy_from_slice(&shake_256(seed, 32));
        let gaussian = Normal::new(0.0, sigma).map_err(|e| Error::InvalidParameters(e.to_string()))?;
        Ok(Self {
            rng: StdRng::from_seed(key),
            gaussian,
        })
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Rounded Gaussian coefficients, packed as (c_i, c_{i + N/2}) pairs the
    /// way the encoder packs a polynomial into `slots` complex values.
    pub fn gaussian_coeffs(&mut self, slots: usize) -> Vec<Complex64> {
        (0..slots)
            .map(|_| {
                let re = self.gaussian.sample(&mut self.rng).round();
                let im = self.gaussian.sample(&mut self.rng).round();
                Complex64::new(re, im)
            })
            .collect()
    }

    /// Rounding error of a division followed by rounding, uniform in [-1/2, 1/2).
    pub fn rounding_coeffs(&mut self, slots: usize) -> Vec<Complex64> {
        (0..slots)
            .map(|_| Complex64::new(self.rng.gen_range(-0.5..0.5), self.rng.gen_range(-0.5..0.5)))
            .collect()
    }
}
