use num_complex::Complex64;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

use super::{
    ciphertext::{Ciphertext, Plaintext},
    context::Context,
    key::{KeyGenerator, KeyType, RelinearizationKey, RotationKeySet, Sk},
    params::Parameters,
    sampling::NoiseSampler,
};
use crate::{
    backend::HomomorphicBackend,
    error::{Error, Result},
};

/// Relative tolerance under which two scales count as equal.
const SCALE_TOLERANCE: f64 = 1e-9;

/// Transparent CKKS simulator.
///
/// Tracks level, scale, key availability and approximation noise exactly the
/// way a CKKS evaluator would, but keeps the payload in the clear. Cloning is
/// cheap and clones share the parameters and the noise source.
#[derive(Debug, Clone)]
pub struct SimulatedCkks {
    context: Arc<Context>,
    sampler: Arc<Mutex<NoiseSampler>>,
    sk: Sk,
    rlk: RelinearizationKey,
    rotation_keys: Arc<RotationKeySet>,
}

impl SimulatedCkks {
    /// Instantiates `params` and derives a fresh secret and relinearization
    /// key. Equal seeds replay equal noise.
    pub fn new(params: Parameters, seed: &[u8]) -> Result<Self> {
        let context = Context::new(params)?;
        let mut sampler = NoiseSampler::new(seed, context.params.sigma)?;
        let kgen = KeyGenerator::new(context.slots);
        let sk = kgen.gen_secret_key(&mut sampler);
        let rlk = kgen.gen_relinearization_key(&sk);
        Ok(Self {
            context: Arc::new(context),
            sampler: Arc::new(Mutex::new(sampler)),
            sk,
            rlk,
            rotation_keys: Arc::new(RotationKeySet::default()),
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn secret_key(&self) -> &Sk {
        &self.sk
    }

    pub fn key_generator(&self) -> KeyGenerator {
        KeyGenerator::new(self.context.slots)
    }

    pub fn rotation_keys(&self) -> &RotationKeySet {
        &self.rotation_keys
    }

    /// New evaluator view whose key registry also holds `keys`; `self` is
    /// left as it was.
    pub fn with_key(&self, keys: &RotationKeySet) -> Self {
        Self {
            rotation_keys: Arc::new(self.rotation_keys.union(keys)),
            ..self.clone()
        }
    }

    /// Shorthand for generating rotation keys for `offsets` under this
    /// evaluator's secret and attaching them.
    pub fn with_rotations(&self, offsets: &[usize]) -> Self {
        let keys = self.key_generator().gen_rotation_keys(&self.sk, offsets);
        self.with_key(&keys)
    }

    pub fn has_key(&self, key: KeyType) -> bool {
        match key {
            KeyType::Encryption => true,
            KeyType::Multiplication => self.rlk.key_id == self.sk.id,
            KeyType::Conjugation => {
                self.rotation_keys.key_id == Some(self.sk.id) && self.rotation_keys.has_conjugation()
            }
            KeyType::Rotation(rot) => {
                self.rotation_keys.key_id == Some(self.sk.id) && self.rotation_keys.contains(rot % self.context.slots)
            }
        }
    }

    /// Fresh Gaussian error, in the slot domain.
    fn gaussian_error(&self) -> Vec<Complex64> {
        let error = self
            .sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gaussian_coeffs(self.context.slots);
        self.context.to_slots(error)
    }

    fn rounding_error(&self) -> Vec<Complex64> {
        let error = self
            .sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rounding_coeffs(self.context.slots);
        self.context.to_slots(error)
    }

    fn check_key(&self, ct: &Ciphertext) -> Result<()> {
        if ct.key_id != self.sk.id {
            return Err(Error::KeyMismatch);
        }
        Ok(())
    }

    fn check_operands(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<()> {
        self.check_key(ct1)?;
        self.check_key(ct2)?;
        if ct1.l != ct2.l || (ct1.scale / ct2.scale - 1.0).abs() > SCALE_TOLERANCE {
            return Err(Error::OperandMismatch {
                lhs_level: ct1.l,
                rhs_level: ct2.l,
                lhs_log_scale: ct1.scale.log2(),
                rhs_log_scale: ct2.scale.log2(),
            });
        }
        Ok(())
    }

    /// Complex conjugation of every slot. Needs the key of
    /// [`KeyGenerator::gen_conjugation_key`]; level and scale are kept.
    pub fn conjugate(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.check_key(ct)?;
        if !self.has_key(KeyType::Conjugation) {
            return Err(Error::MissingConjugationKey);
        }
        let payload = ct
            .payload
            .iter()
            .zip(self.gaussian_error())
            .map(|(m, e)| m.conj() + e)
            .collect();
        trace!("conjugate");
        Ok(Ciphertext { payload, ..ct.clone() })
    }

    /// Drops primes from the modulus chain until `ct` sits at level `l`.
    /// The scale is unchanged.
    pub fn mod_down_to(&self, ct: &Ciphertext, l: usize) -> Ciphertext {
        debug_assert!(l <= ct.l);
        Ciphertext {
            l: l.min(ct.l),
            ..ct.clone()
        }
    }
}

impl HomomorphicBackend for SimulatedCkks {
    type Plaintext = Plaintext;
    type Ciphertext = Ciphertext;

    fn slot_capacity(&self) -> usize {
        self.context.slots
    }

    fn max_level(&self) -> usize {
        self.context.max_level()
    }

    fn default_scale(&self) -> f64 {
        self.context.scale
    }

    fn level(&self, ct: &Ciphertext) -> usize {
        ct.l
    }

    fn scale(&self, ct: &Ciphertext) -> f64 {
        ct.scale
    }

    fn encode(&self, values: &[Complex64], level: usize) -> Result<Plaintext> {
        self.context.encode(values, level, self.context.scale)
    }

    fn decode(&self, plaintext: &Plaintext) -> Result<Vec<Complex64>> {
        Ok(self.context.decode(plaintext))
    }

    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext> {
        let mut payload = self.context.coeffs_to_slots(&plaintext.coeffs);
        for (m, e) in payload.iter_mut().zip(self.gaussian_error()) {
            *m += e;
        }
        trace!(level = plaintext.l, "encrypt");
        Ok(Ciphertext {
            payload,
            l: plaintext.l,
            scale: plaintext.scale,
            key_id: self.sk.id,
        })
    }

    fn decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        self.check_key(ct)?;
        let coeffs = self.context.slots_to_coeffs(&ct.payload, ct.l)?;
        Ok(Plaintext {
            coeffs,
            l: ct.l,
            scale: ct.scale,
        })
    }

    fn multiply_relin(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext> {
        self.check_key(ct1)?;
        self.check_key(ct2)?;
        if self.rlk.key_id != ct1.key_id {
            return Err(Error::KeyMismatch);
        }
        let l = ct1.l.min(ct2.l);
        if l == 0 {
            return Err(Error::LevelExhausted {
                operation: "multiply_relin",
                level: l,
            });
        }
        let scale = ct1.scale * ct2.scale;
        let modulus_bits = self.context.modulus_bits(l);
        if scale.log2() >= modulus_bits as f64 {
            return Err(Error::ScaleOverflow {
                scale_bits: scale.log2(),
                modulus_bits,
            });
        }

        let mut payload: Vec<Complex64> = ct1.payload.iter().zip(&ct2.payload).map(|(a, b)| a * b).collect();
        // key switching error of the relinearization
        for (m, e) in payload.iter_mut().zip(self.gaussian_error()) {
            *m += e;
        }
        trace!(level = l, log_scale = scale.log2(), "multiply_relin");
        Ok(Ciphertext {
            payload,
            l,
            scale,
            key_id: ct1.key_id,
        })
    }

    fn rescale(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.check_key(ct)?;
        if ct.l == 0 {
            return Err(Error::LevelExhausted {
                operation: "rescale",
                level: 0,
            });
        }
        let q = self.context.rescale_prime(ct.l) as f64;
        let payload = ct
            .payload
            .iter()
            .zip(self.rounding_error())
            .map(|(m, e)| m / q + e)
            .collect();
        trace!(level = ct.l - 1, "rescale");
        Ok(Ciphertext {
            payload,
            l: ct.l - 1,
            scale: ct.scale / q,
            key_id: ct.key_id,
        })
    }

    fn rotate(&self, ct: &Ciphertext, offset: usize) -> Result<Ciphertext> {
        self.check_key(ct)?;
        let rot = offset % self.context.slots;
        if rot == 0 {
            return Ok(ct.clone());
        }
        if !self.has_key(KeyType::Rotation(rot)) {
            return Err(Error::MissingRotationKey { offset: rot });
        }
        let mut payload = ct.payload.clone();
        payload.rotate_left(rot);
        for (m, e) in payload.iter_mut().zip(self.gaussian_error()) {
            *m += e;
        }
        trace!(offset = rot, "rotate");
        Ok(Ciphertext { payload, ..ct.clone() })
    }

    fn add(&self, ct1: &Ciphertext, ct2: &Ciphertext) -> Result<Ciphertext> {
        self.check_operands(ct1, ct2)?;
        let payload = ct1.payload.iter().zip(&ct2.payload).map(|(a, b)| a + b).collect();
        Ok(Ciphertext {
            payload,
            l: ct1.l,
            scale: ct1.scale,
            key_id: ct1.key_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ckks::utils::{equal_up_to_epsilon, gen_random_complex_vector};

    fn scheme(log_n: u32, max_level: usize) -> SimulatedCkks {
        SimulatedCkks::new(Parameters::toy(log_n, max_level), b"scheme tests").unwrap()
    }

    #[test]
    fn test_encrypt_then_decrypt() {
        let scheme = scheme(10, 1);
        let v = vec![
            Complex64::new(0.47, 0.97),
            Complex64::new(0.12, 0.77),
            Complex64::new(-0.45, 0.37),
            Complex64::new(0.08, 0.39),
            Complex64::new(0.44, -0.98),
            Complex64::new(0.19, 0.98),
            Complex64::new(-0.12, -0.44),
            Complex64::new(0.20, 0.24),
        ];
        let ciphertext = scheme.encrypt_values(&v).unwrap();
        assert_eq!(ciphertext.level(), 1);
        let v_decrypted = scheme.decrypt_values(&ciphertext).unwrap();
        assert!(equal_up_to_epsilon(&v, &v_decrypted[..8], 1e-8));
    }

    #[test]
    fn test_homomorphic_mul() {
        let scheme = scheme(10, 2);
        let slots = scheme.slot_capacity();
        let v1 = gen_random_complex_vector(slots);
        let v2 = gen_random_complex_vector(slots);
        let v_mul: Vec<_> = v1.iter().zip(v2.iter()).map(|(c1, c2)| c1 * c2).collect();

        let ct1 = scheme.encrypt_values(&v1).unwrap();
        let ct2 = scheme.encrypt_values(&v2).unwrap();
        let ct_mul = scheme.multiply_relin(&ct1, &ct2).unwrap();
        assert_eq!(ct_mul.level(), 2);
        let ct_mul = scheme.rescale(&ct_mul).unwrap();
        assert_eq!(ct_mul.level(), 1);
        assert!((ct_mul.scale().log2() - 45.0).abs() < 0.01);

        let v_mul_decrypted = scheme.decrypt_values(&ct_mul).unwrap();
        assert!(equal_up_to_epsilon(&v_mul, &v_mul_decrypted, 1e-7));
    }

    #[test]
    fn test_homomorphic_add() {
        let scheme = scheme(8, 3);
        let slots = scheme.slot_capacity();
        let v1 = gen_random_complex_vector(slots);
        let v2 = gen_random_complex_vector(slots);
        let v_add: Vec<_> = v1.iter().zip(v2.iter()).map(|(c1, c2)| c1 + c2).collect();

        let ct1 = scheme.encrypt_values(&v1).unwrap();
        let ct2 = scheme.encrypt_values(&v2).unwrap();
        let ct_add = scheme.add(&ct1, &ct2).unwrap();

        let v_add_decrypted = scheme.decrypt_values(&ct_add).unwrap();
        assert!(equal_up_to_epsilon(&v_add, &v_add_decrypted, 1e-7));
    }

    #[test]
    fn test_add_rejects_mismatched_operands() {
        let scheme = scheme(8, 2);
        let v = gen_random_complex_vector(4);
        let ct1 = scheme.encrypt_values(&v).unwrap();
        let ct2 = scheme.mod_down_to(&ct1, 1);
        assert!(matches!(
            scheme.add(&ct1, &ct2),
            Err(Error::OperandMismatch { lhs_level: 2, rhs_level: 1, .. })
        ));

        let squared = scheme.multiply_relin(&ct1, &ct1).unwrap();
        assert!(matches!(scheme.add(&ct1, &squared), Err(Error::OperandMismatch { .. })));
    }

    #[test]
    fn test_homomorphic_rotate() {
        let scheme = scheme(6, 1).with_rotations(&[3, 1]);
        let slots = scheme.slot_capacity();

        let mut v = gen_random_complex_vector(slots);
        let ct = scheme.encrypt_values(&v).unwrap();
        let ct_rotate = scheme.rotate(&ct, 3).unwrap();
        assert_eq!(ct_rotate.level(), ct.level());
        let v_rot_decrypted = scheme.decrypt_values(&ct_rotate).unwrap();
        v.rotate_left(3);
        assert!(equal_up_to_epsilon(&v, &v_rot_decrypted, 1e-7));

        // offsets are taken mod the slot count
        let ct_wrapped = scheme.rotate(&ct, slots + 1).unwrap();
        let mut w = scheme.decrypt_values(&ct).unwrap();
        w.rotate_left(1);
        assert!(equal_up_to_epsilon(&w, &scheme.decrypt_values(&ct_wrapped).unwrap(), 1e-7));
    }

    #[test]
    fn test_missing_rotation_key_leaves_input_untouched() {
        let scheme = scheme(6, 1).with_rotations(&[1]);
        let ct = scheme.encrypt_values(&gen_random_complex_vector(8)).unwrap();
        let before = ct.clone();
        assert_eq!(scheme.rotate(&ct, 2), Err(Error::MissingRotationKey { offset: 2 }));
        assert_eq!(ct, before);
    }

    #[test]
    fn test_with_key_returns_a_new_view() {
        let base = scheme(6, 1);
        let keys = base.key_generator().gen_rotation_keys(base.secret_key(), &[2]);
        let extended = base.with_key(&keys);
        assert!(extended.has_key(KeyType::Rotation(2)));
        assert!(!base.has_key(KeyType::Rotation(2)));
        assert!(base.rotation_keys().is_empty());

        let ct = extended.encrypt_values(&gen_random_complex_vector(4)).unwrap();
        assert!(extended.rotate(&ct, 2).is_ok());
        assert!(base.rotate(&ct, 2).is_err());
    }

    #[test]
    fn test_homomorphic_conjugate() {
        let base = scheme(6, 1);
        let slots = base.slot_capacity();
        let v = gen_random_complex_vector(slots);
        let ct = base.encrypt_values(&v).unwrap();
        assert_eq!(base.conjugate(&ct), Err(Error::MissingConjugationKey));
        assert!(!base.has_key(KeyType::Conjugation));

        let conj = base.key_generator().gen_conjugation_key(base.secret_key());
        let scheme = base.with_key(&conj);
        assert!(scheme.has_key(KeyType::Conjugation));
        let ct_conj = scheme.conjugate(&ct).unwrap();
        assert_eq!(ct_conj.level(), ct.level());
        let expected: Vec<_> = v.iter().map(|z| z.conj()).collect();
        assert!(equal_up_to_epsilon(&expected, &scheme.decrypt_values(&ct_conj).unwrap(), 1e-7));
    }

    #[test]
    fn test_level_exhaustion() {
        let scheme = scheme(6, 1);
        let v = gen_random_complex_vector(4);
        let ct = scheme.encrypt_values(&v).unwrap();
        let ct = scheme.rescale(&scheme.multiply_relin(&ct, &ct).unwrap()).unwrap();
        assert_eq!(ct.level(), 0);
        assert_eq!(
            scheme.multiply_relin(&ct, &ct),
            Err(Error::LevelExhausted {
                operation: "multiply_relin",
                level: 0
            })
        );
        assert!(matches!(scheme.rescale(&ct), Err(Error::LevelExhausted { .. })));
    }

    #[test]
    fn test_multiply_aligns_levels() {
        let scheme = scheme(6, 3);
        let v1 = gen_random_complex_vector(4);
        let v2 = gen_random_complex_vector(4);
        let ct1 = scheme.encrypt_values(&v1).unwrap();
        let ct2 = scheme.mod_down_to(&scheme.encrypt_values(&v2).unwrap(), 2);
        let ct = scheme.rescale(&scheme.multiply_relin(&ct1, &ct2).unwrap()).unwrap();
        assert_eq!(ct.level(), 1);
        let expected: Vec<_> = v1.iter().zip(&v2).map(|(a, b)| a * b).collect();
        assert!(equal_up_to_epsilon(&expected, &scheme.decrypt_values(&ct).unwrap()[..4], 1e-7));
    }

    #[test]
    fn test_unrescaled_chain_overflows() {
        let scheme = scheme(6, 2);
        let ct = scheme.encrypt_values(&gen_random_complex_vector(4)).unwrap();
        let squared = scheme.multiply_relin(&ct, &ct).unwrap();
        let fourth = scheme.multiply_relin(&squared, &squared);
        assert!(matches!(fourth, Err(Error::ScaleOverflow { .. })));
    }

    #[test]
    fn test_decrypt_under_other_key() {
        let alice = scheme(6, 1);
        let bob = SimulatedCkks::new(Parameters::toy(6, 1), b"another seed").unwrap();
        let ct = alice.encrypt_values(&gen_random_complex_vector(4)).unwrap();
        assert_eq!(bob.decrypt(&ct), Err(Error::KeyMismatch));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let v = gen_random_complex_vector(8);
        let a = scheme(6, 1);
        let b = scheme(6, 1);
        assert_eq!(a.encrypt_values(&v).unwrap(), b.encrypt_values(&v).unwrap());
    }
}
