use thiserror::Error;

/// Errors surfaced by the slot layout, the kernel and the homomorphic backend.
///
/// None of these are transient: a failed `multiply` is aborted as a whole and
/// the caller has to fix its input, its keys or its parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("shape error: {0}")]
    Shape(String),

    #[error("payload of {len} values exceeds the slot capacity {capacity}")]
    EncodingOverflow { len: usize, capacity: usize },

    #[error("slot {index} holds a value that is not a finite number")]
    NonFinite { index: usize },

    #[error("no rotation key registered for offset {offset}")]
    MissingRotationKey { offset: usize },

    #[error("{operation} needs one more level but the ciphertext is at level {level}")]
    LevelExhausted { operation: &'static str, level: usize },

    #[error(
        "operands differ: level {lhs_level} vs {rhs_level}, scale 2^{lhs_log_scale:.2} vs 2^{rhs_log_scale:.2}"
    )]
    OperandMismatch {
        lhs_level: usize,
        rhs_level: usize,
        lhs_log_scale: f64,
        rhs_log_scale: f64,
    },

    #[error("scale of 2^{scale_bits:.2} does not fit under a {modulus_bits}-bit modulus")]
    ScaleOverflow { scale_bits: f64, modulus_bits: u64 },

    #[error("no conjugation key registered")]
    MissingConjugationKey,

    #[error("ciphertext was encrypted under a different secret key")]
    KeyMismatch,

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
