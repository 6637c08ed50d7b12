use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// CKKS parameter literal. Fixed before any kernel runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// log2 of the ring degree N; a ciphertext packs N/2 slots
    pub log_n: u32,
    /// bit size of the base prime q0
    pub log_q0: u32,
    /// bit size of the rescaling primes and of the default scale
    pub log_scale: u32,
    /// number of rescaling primes, i.e. the multiplicative depth
    pub max_level: usize,
    /// standard deviation of the error distribution
    pub sigma: f64,
}

impl Default for Parameters {
    /// Depth-7 literal: LogN 14, LogQ [55, 45 x 7], default scale 2^45.
    fn default() -> Self {
        Self {
            log_n: 14,
            log_q0: 55,
            log_scale: 45,
            max_level: 7,
            sigma: 3.2,
        }
    }
}

impl Parameters {
    /// Small ring for tests and demos; same modulus chain shape as the default.
    pub fn toy(log_n: u32, max_level: usize) -> Self {
        Self {
            log_n,
            max_level,
            ..Self::default()
        }
    }

    pub fn ring_degree(&self) -> usize {
        1 << self.log_n
    }

    pub fn slots(&self) -> usize {
        self.ring_degree() / 2
    }

    pub fn validate(&self) -> Result<()> {
        if !(2..=17).contains(&self.log_n) {
            return Err(Error::InvalidParameters(format!(
                "log_n = {} is outside 2..=17",
                self.log_n
            )));
        }
        if !(20..=60).contains(&self.log_scale) {
            return Err(Error::InvalidParameters(format!(
                "log_scale = {} is outside 20..=60",
                self.log_scale
            )));
        }
        if self.log_q0 <= self.log_scale || self.log_q0 > 61 {
            return Err(Error::InvalidParameters(format!(
                "log_q0 = {} must exceed log_scale = {} and be at most 61",
                self.log_q0, self.log_scale
            )));
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(Error::InvalidParameters(format!("sigma = {} must be positive", self.sigma)));
        }
        Ok(())
    }
}
