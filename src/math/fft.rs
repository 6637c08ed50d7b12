use num_complex::Complex64;
use std::f64::consts::PI;

use super::bitrev::{bitrev, is_power_of_two};

/// Tables for the "special" FFT that evaluates a polynomial of Z[X]/(X^N + 1)
/// on the primitive 2N-th roots of unity indexed by the rotation group
/// <5> mod 2N. This is the canonical embedding used by CKKS: slot `j` of a
/// message is the evaluation at zeta^(5^j), so a cyclic shift of the slots is
/// the automorphism X -> X^(5^r).
#[derive(Debug, Clone)]
pub struct SpecialFft {
    /// 5^j mod 2N for j in 0..N/2
    rot_group: Vec<usize>,
    /// zeta^i for i in 0..=2N, zeta = exp(2 pi i / 2N)
    ksi_pows: Vec<Complex64>,
}

impl SpecialFft {
    /// `n` is the ring degree; the transform works on at most n/2 slots.
    pub fn new(n: usize) -> Self {
        assert!(is_power_of_two(n) && n >= 4, "ring degree must be a power of two");
        Self {
            rot_group: rot_group(n),
            ksi_pows: ksi_powers(n),
        }
    }

    pub fn slots(&self) -> usize {
        self.rot_group.len()
    }

    /// Coefficient representation -> slot values.
    pub fn forward(&self, x: &mut [Complex64]) {
        let n = x.len();
        let m = self.rot_group.len() * 4;

        bitrev(x);

        let mut len = 2;
        while len <= n {
            for i in 0..n / len {
                for j in 0..len / 2 {
                    let idx = (self.rot_group[j] % (4 * len)) * m / (4 * len);
                    let u = x[i * len + j];
                    let v = x[i * len + j + len / 2] * self.ksi_pows[idx];
                    x[i * len + j + len / 2] = u - v;
                    x[i * len + j] = u + v;
                }
            }
            len *= 2;
        }
    }

    /// Slot values -> coefficient representation. Inverse of [`Self::forward`].
    pub fn inverse(&self, x: &mut [Complex64]) {
        let n = x.len();
        let m = self.rot_group.len() * 4;

        let mut len = n;
        while len >= 1 {
            let lenq = len << 2;
            for i in 0..n / len {
                for j in 0..len / 2 {
                    let idx = (lenq - (self.rot_group[j] % lenq)) * m / lenq;
                    let u = x[i * len + j] + x[i * len + j + len / 2];
                    let v = (x[i * len + j] - x[i * len + j + len / 2]) * self.ksi_pows[idx];
                    x[i * len + j] = u;
                    x[i * len + j + len / 2] = v;
                }
            }
            len /= 2;
        }
        bitrev(x);
        let scale = n as f64;
        for v in x.iter_mut() {
            *v /= scale;
        }
    }
}

fn rot_group(n: usize) -> Vec<usize> {
    let mut five_pow = 1;
    let mut rot_group = Vec::with_capacity(n / 2);
    for _ in 0..n / 2 {
        rot_group.push(five_pow);
        five_pow = (5 * five_pow) % (2 * n);
    }
    rot_group
}

fn ksi_powers(n: usize) -> Vec<Complex64> {
    let m = 2 * n;
    let mut ksi_pows: Vec<Complex64> = (0..m)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / m as f64;
            Complex64::new(angle.cos(), angle.sin())
        })
        .collect();
    ksi_pows.push(ksi_pows[0]);
    ksi_pows
}
