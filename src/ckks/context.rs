use num_bigint::BigUint;

use super::params::Parameters;
use crate::{
    error::{Error, Result},
    math::{fft::SpecialFft, prime::ntt_primes_around},
};

/// Tables derived once from a [`Parameters`] literal.
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) params: Parameters,
    /// ring dimension
    pub(crate) n: usize,
    pub(crate) slots: usize,
    /// q_0, q_1, ..., q_L, where L is the maximal level
    pub(crate) q_vec: Vec<u64>,
    /// default scale 2^log_scale
    pub(crate) scale: f64,
    pub(crate) fft: SpecialFft,
}

impl Context {
    pub fn new(params: Parameters) -> Result<Self> {
        params.validate()?;
        let n = params.ring_degree();
        let q_vec = generate_primes(&params)?;
        Ok(Self {
            n,
            slots: n / 2,
            q_vec,
            scale: (params.log_scale as f64).exp2(),
            fft: SpecialFft::new(n),
            params,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn ring_degree(&self) -> usize {
        self.n
    }

    pub fn max_level(&self) -> usize {
        self.params.max_level
    }

    /// The prime dropped when rescaling a ciphertext at `level`.
    pub(crate) fn rescale_prime(&self, level: usize) -> u64 {
        self.q_vec[level]
    }

    /// Bit size of Q_l = q_0 * ... * q_l.
    pub fn modulus_bits(&self, level: usize) -> u64 {
        let q: BigUint = self.q_vec[..=level].iter().map(|&q| BigUint::from(q)).product();
        q.bits()
    }
}

/// q_0 is the first prime = 1 mod 2N above 2^log_q0; the rescaling primes
/// alternate above and below 2^log_scale so the scale stays close to the
/// default one after every rescale.
fn generate_primes(params: &Parameters) -> Result<Vec<u64>> {
    let m = 2 * params.ring_degree() as u64;

    let q0 = ntt_primes_around(1u64 << params.log_q0, m, 1, &[])
        .and_then(|q| q.first().copied())
        .ok_or_else(|| Error::InvalidParameters("no base prime found".into()))?;

    let mut q_vec = vec![q0];
    let primes = ntt_primes_around(1u64 << params.log_scale, m, params.max_level, &q_vec)
        .ok_or_else(|| {
            Error::InvalidParameters(format!(
                "cannot find {} primes of {} bits congruent to 1 mod {m}",
                params.max_level, params.log_scale
            ))
        })?;
    q_vec.extend(primes);

    let p = params.log_scale as f64;
    if let Some(q) = q_vec[1..].iter().find(|&&q| ((q as f64).log2() - p).abs() > 0.5) {
        return Err(Error::InvalidParameters(format!(
            "too small number of precision: prime {q} drifts away from 2^{p}, try a larger scale or a smaller depth"
        )));
    }
    Ok(q_vec)
}
