//! A transparent CKKS simulator.
//!
//! Encoding is real CKKS encoding through the canonical embedding, and the
//! modulus chain, levels, scales, key material and approximation noise behave
//! the way an RNS-CKKS evaluator's do. Ciphertexts however carry their payload
//! in the clear: this backend offers no confidentiality and only exists to run
//! and measure homomorphic circuits.

mod ciphertext;
mod context;
mod encoding;
mod key;
mod params;
mod sampling;
mod scheme;
#[cfg(test)]
mod utils;

pub use ciphertext::{Ciphertext, Plaintext};
pub use context::Context;
pub use key::{KeyGenerator, KeyType, RelinearizationKey, RotationKeySet, Sk};
pub use params::Parameters;
pub use sampling::NoiseSampler;
pub use scheme::SimulatedCkks;
