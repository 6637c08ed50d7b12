use num_complex::Complex64;

/// Encoded message: integer coefficients of m(X), packed as
/// `coeffs[i] = (m_i, m_{i + N/2})`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plaintext {
    pub(crate) coeffs: Vec<(i128, i128)>,
    /// the level of the plaintext
    pub(crate) l: usize,
    pub(crate) scale: f64,
}

impl Plaintext {
    pub fn level(&self) -> usize {
        self.l
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Simulated ciphertext. The payload is the noisy message in the slot domain
/// scaled by `scale`; it is stored in the clear, the simulator hides nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Ciphertext {
    pub(crate) payload: Vec<Complex64>,
    /// the level of the ciphertext
    pub(crate) l: usize,
    pub(crate) scale: f64,
    /// secret the ciphertext was encrypted under
    pub(crate) key_id: u64,
}

impl Ciphertext {
    pub fn level(&self) -> usize {
        self.l
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}
