//! The homomorphic arithmetic the kernel is written against.
//!
//! Implementations own the parameters and every piece of key material; the
//! kernel only borrows a backend and never inspects a ciphertext beyond its
//! level and scale.

use num_complex::Complex64;

use crate::error::Result;

/// A leveled, SIMD-packed approximate HE scheme (CKKS-like).
///
/// Every operation takes its operands by reference and returns a fresh value,
/// so a failing call leaves its inputs untouched.
pub trait HomomorphicBackend {
    type Plaintext;
    type Ciphertext: Clone;

    /// Number of slots a single ciphertext packs.
    fn slot_capacity(&self) -> usize;

    /// Level of freshly encrypted ciphertexts.
    fn max_level(&self) -> usize;

    /// Nominal scale new plaintexts are encoded at.
    fn default_scale(&self) -> f64;

    /// Remaining multiplicative budget of `ct`.
    fn level(&self, ct: &Self::Ciphertext) -> usize;

    fn scale(&self, ct: &Self::Ciphertext) -> f64;

    /// Encodes at most `slot_capacity` values at `level` and the default scale;
    /// missing slots are zero.
    fn encode(&self, values: &[Complex64], level: usize) -> Result<Self::Plaintext>;

    fn decode(&self, plaintext: &Self::Plaintext) -> Result<Vec<Complex64>>;

    fn encrypt(&self, plaintext: &Self::Plaintext) -> Result<Self::Ciphertext>;

    fn decrypt(&self, ct: &Self::Ciphertext) -> Result<Self::Plaintext>;

    /// Slotwise product followed by relinearization. The result carries the
    /// product of the operand scales and must be rescaled before the next
    /// multiplication.
    fn multiply_relin(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Divides the scale by the last prime of the modulus chain, consuming one level.
    fn rescale(&self, ct: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Cyclic left rotation: slot `i` of the result is slot `i + offset` of `ct`.
    fn rotate(&self, ct: &Self::Ciphertext, offset: usize) -> Result<Self::Ciphertext>;

    /// Slotwise sum; both operands must share level and scale.
    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    fn encrypt_values(&self, values: &[Complex64]) -> Result<Self::Ciphertext> {
        let plaintext = self.encode(values, self.max_level())?;
        self.encrypt(&plaintext)
    }

    fn decrypt_values(&self, ct: &Self::Ciphertext) -> Result<Vec<Complex64>> {
        let plaintext = self.decrypt(ct)?;
        self.decode(&plaintext)
    }
}
