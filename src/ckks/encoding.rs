//! Canonical embedding encoder.
//!
//! Encode: z in C^(N/2) -> m(X) = round(scale * sigma^-1(z))
//! Decode: m(X) -> z = sigma(m) / scale

use num_complex::Complex64;

use super::{ciphertext::Plaintext, context::Context};
use crate::error::{Error, Result};

/// Largest coefficient magnitude kept in an i128 without loss.
const COEFF_LIMIT_BITS: u64 = 120;

impl Context {
    pub fn encode(&self, values: &[Complex64], l: usize, scale: f64) -> Result<Plaintext> {
        if values.len() > self.slots {
            return Err(Error::EncodingOverflow {
                len: values.len(),
                capacity: self.slots,
            });
        }
        if l > self.max_level() {
            return Err(Error::InvalidParameters(format!(
                "level {l} is above the maximal level {}",
                self.max_level()
            )));
        }
        if let Some(i) = values.iter().position(|z| !(z.re.is_finite() && z.im.is_finite())) {
            return Err(Error::NonFinite { index: i });
        }

        let mut uvals = vec![Complex64::new(0.0, 0.0); self.slots];
        uvals[..values.len()].copy_from_slice(values);
        self.fft.inverse(&mut uvals);
        for u in uvals.iter_mut() {
            *u *= scale;
        }
        let coeffs = self.round_coeffs(&uvals, l)?;
        Ok(Plaintext { coeffs, l, scale })
    }

    pub fn decode(&self, plaintext: &Plaintext) -> Vec<Complex64> {
        let mut uvals = self.coeffs_to_slots(&plaintext.coeffs);
        for u in uvals.iter_mut() {
            *u /= plaintext.scale;
        }
        uvals
    }

    /// Evaluates integer coefficients on the slot roots, without unscaling.
    pub(crate) fn coeffs_to_slots(&self, coeffs: &[(i128, i128)]) -> Vec<Complex64> {
        self.to_slots(
            coeffs
                .iter()
                .map(|&(re, im)| Complex64::new(re as f64, im as f64))
                .collect(),
        )
    }

    /// Interpolates slot values back to rounded coefficients.
    pub(crate) fn slots_to_coeffs(&self, slots: &[Complex64], l: usize) -> Result<Vec<(i128, i128)>> {
        let mut uvals = slots.to_vec();
        self.fft.inverse(&mut uvals);
        self.round_coeffs(&uvals, l)
    }

    /// Maps real-valued coefficient pairs (typically an error term) into the slot domain.
    pub(crate) fn to_slots(&self, mut coeffs: Vec<Complex64>) -> Vec<Complex64> {
        self.fft.forward(&mut coeffs);
        coeffs
    }

    fn round_coeffs(&self, uvals: &[Complex64], l: usize) -> Result<Vec<(i128, i128)>> {
        if let Some(i) = uvals.iter().position(|u| !(u.re.is_finite() && u.im.is_finite())) {
            return Err(Error::NonFinite { index: i });
        }
        let modulus_bits = self.modulus_bits(l);
        let bound = ((modulus_bits - 1).min(COEFF_LIMIT_BITS) as f64).exp2();
        let largest = uvals
            .iter()
            .map(|u| u.re.abs().max(u.im.abs()))
            .fold(0.0, f64::max);
        if !(largest < bound) {
            return Err(Error::ScaleOverflow {
                scale_bits: largest.log2(),
                modulus_bits,
            });
        }
        Ok(uvals
            .iter()
            .map(|u| (u.re.round() as i128, u.im.round() as i128))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ckks::{params::Parameters, utils::{equal_up_to_epsilon, gen_random_complex_vector}};

    #[test]
    fn test_encode_then_decode() {
        let context = Context::new(Parameters::toy(10, 2)).unwrap();
        let v = gen_random_complex_vector(context.slots);
        let plaintext = context.encode(&v, 2, context.scale).unwrap();
        assert_eq!(plaintext.level(), 2);
        let decoded = context.decode(&plaintext);
        assert!(equal_up_to_epsilon(&v, &decoded, 1e-9));
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let context = Context::new(Parameters::toy(6, 1)).unwrap();
        let v = vec![Complex64::new(0.47, 0.97), Complex64::new(-0.45, 0.37)];
        let decoded = context.decode(&context.encode(&v, 1, context.scale).unwrap());
        assert!(equal_up_to_epsilon(&v, &decoded[..2], 1e-9));
        assert!(decoded[2..].iter().all(|c| c.norm() < 1e-9));
    }

    #[test]
    fn test_encode_overflow() {
        let context = Context::new(Parameters::toy(4, 1)).unwrap();
        let v = gen_random_complex_vector(9);
        assert_eq!(
            context.encode(&v, 1, context.scale),
            Err(Error::EncodingOverflow { len: 9, capacity: 8 })
        );
    }

    #[test]
    fn test_encode_rejects_non_finite() {
        let context = Context::new(Parameters::toy(4, 1)).unwrap();
        let mut v = vec![Complex64::new(1.0, 0.0); 4];
        v[2] = Complex64::new(f64::NAN, 0.0);
        assert_eq!(context.encode(&v, 1, context.scale), Err(Error::NonFinite { index: 2 }));
        v[2] = Complex64::new(0.0, f64::INFINITY);
        assert_eq!(context.encode(&v, 1, context.scale), Err(Error::NonFinite { index: 2 }));
    }

    #[test]
    fn test_encode_scale_overflow() {
        let context = Context::new(Parameters::toy(4, 1)).unwrap();
        let v = vec![Complex64::new(1e12, 0.0)];
        assert!(matches!(
            context.encode(&v, 0, context.scale),
            Err(Error::ScaleOverflow { .. })
        ));
    }
}
