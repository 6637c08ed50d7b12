//! Encrypted matrix-vector product.
//!
//! One ciphertext carries the whole column-major matrix, one carries the
//! tiled vector; a single slotwise multiplication followed by a block
//! rotate-and-sum leaves `sum_r M[r][c] v[r]` in the first slot of block `c`.

mod extract;
mod reducer;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

pub use extract::extract_block_heads;
pub use reducer::{ReductionStrategy, RotateSumReducer};

use crate::{
    backend::HomomorphicBackend,
    error::{Error, Result},
    layout::{flatten_column_major, tile, to_complex_slots, PlaintextMatrix, PlaintextVector},
};

/// Most decimal digits an extracted value can be rounded to; an f64 holds
/// no more significant digits than this.
pub const MAX_PRECISION: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelOptions {
    pub reduction: ReductionStrategy,
    /// decimal digits of the extracted results, `None` keeps the raw decoding.
    /// In TOML a negative value stands for `None`.
    #[serde(serialize_with = "serialize_precision", deserialize_with = "deserialize_precision")]
    pub precision: Option<u32>,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            reduction: ReductionStrategy::default(),
            precision: Some(2),
        }
    }
}

impl KernelOptions {
    pub fn validate(&self) -> Result<()> {
        match self.precision {
            Some(digits) if digits > MAX_PRECISION => Err(Error::InvalidParameters(format!(
                "precision = {digits} exceeds the {MAX_PRECISION} digits of an f64"
            ))),
            _ => Ok(()),
        }
    }
}

fn serialize_precision<S: Serializer>(precision: &Option<u32>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match precision {
        Some(digits) => serializer.serialize_i64(i64::from(*digits)),
        None => serializer.serialize_i64(-1),
    }
}

fn deserialize_precision<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u32>, D::Error> {
    let digits = i64::deserialize(deserializer)?;
    if digits < 0 {
        return Ok(None);
    }
    u32::try_from(digits)
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("precision = {digits} is out of range")))
}

/// A matrix encrypted in column-major slot layout, reusable across products.
#[derive(Debug, Clone)]
pub struct EncryptedMatrix<C> {
    ct: C,
    rows: usize,
    cols: usize,
}

impl<C> EncryptedMatrix<C> {
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn ciphertext(&self) -> &C {
        &self.ct
    }
}

/// Computes `result[c] = sum_r matrix[r][c] * vector[r]` under encryption.
///
/// The kernel only borrows the backend and never generates keys: the
/// offsets of [`MatVecKernel::required_rotations`] must already be
/// registered with it.
pub struct MatVecKernel<'a, B: HomomorphicBackend> {
    backend: &'a B,
    options: KernelOptions,
    reducer: RotateSumReducer,
}

impl<'a, B: HomomorphicBackend> MatVecKernel<'a, B> {
    pub fn new(backend: &'a B, options: KernelOptions) -> Self {
        let reducer = RotateSumReducer::new(options.reduction);
        Self {
            backend,
            options,
            reducer,
        }
    }

    pub fn options(&self) -> &KernelOptions {
        &self.options
    }

    /// Rotation offsets the reduction over a matrix with `rows` rows uses.
    pub fn required_rotations(&self, rows: usize) -> Vec<usize> {
        self.reducer.rotation_offsets(rows)
    }

    pub fn multiply(&self, matrix: &PlaintextMatrix, vector: &PlaintextVector) -> Result<PlaintextVector> {
        check_vector(matrix.rows(), vector)?;
        let encrypted = self.encrypt_matrix(matrix)?;
        self.multiply_encrypted(&encrypted, vector)
    }

    /// Runs every vector against the same encrypted matrix.
    pub fn multiply_batch(&self, matrix: &PlaintextMatrix, vectors: &[PlaintextVector]) -> Result<Vec<PlaintextVector>> {
        for vector in vectors {
            check_vector(matrix.rows(), vector)?;
        }
        let encrypted = self.encrypt_matrix(matrix)?;
        vectors
            .iter()
            .map(|vector| self.multiply_encrypted(&encrypted, vector))
            .collect()
    }

    /// `lhs * rhs`, row by row: row `i` of the result is row `i` of `lhs`
    /// weighting the rows of the encrypted `rhs`.
    pub fn multiply_matrix(&self, lhs: &PlaintextMatrix, rhs: &PlaintextMatrix) -> Result<PlaintextMatrix> {
        if lhs.cols() != rhs.rows() {
            return Err(Error::Shape(format!(
                "cannot multiply a {}x{} matrix by a {}x{} matrix",
                lhs.rows(),
                lhs.cols(),
                rhs.rows(),
                rhs.cols()
            )));
        }
        let rows: Vec<PlaintextVector> = lhs.row_vectors().collect();
        let products = self.multiply_batch(rhs, &rows)?;
        PlaintextMatrix::new(products.into_iter().map(PlaintextVector::into_inner).collect())
    }

    pub fn encrypt_matrix(&self, matrix: &PlaintextMatrix) -> Result<EncryptedMatrix<B::Ciphertext>> {
        let (rows, cols) = matrix.dimensions();
        let flat = flatten_column_major(matrix);
        let capacity = self.backend.slot_capacity();
        if flat.len() > capacity {
            return Err(Error::EncodingOverflow {
                len: flat.len(),
                capacity,
            });
        }
        debug!(rows, cols, "matrix flattened column-major");
        let ct = self.backend.encrypt_values(&to_complex_slots(&flat))?;
        Ok(EncryptedMatrix { ct, rows, cols })
    }

    pub fn multiply_encrypted(
        &self,
        matrix: &EncryptedMatrix<B::Ciphertext>,
        vector: &PlaintextVector,
    ) -> Result<PlaintextVector> {
        let (rows, cols) = matrix.dimensions();
        check_vector(rows, vector)?;

        let tiled = tile(vector, cols, self.backend.slot_capacity())?;
        let ct_vec = self.backend.encrypt_values(&to_complex_slots(&tiled))?;
        debug!(level = self.backend.level(&ct_vec), "vector tiled and encrypted");

        let ct_prod = self.backend.multiply_relin(&ct_vec, &matrix.ct)?;
        let ct_prod = self.backend.rescale(&ct_prod)?;
        debug!(
            level = self.backend.level(&ct_prod),
            log_scale = self.backend.scale(&ct_prod).log2(),
            "multiplied and rescaled"
        );

        let ct_res = self.reducer.reduce(self.backend, &ct_prod, rows)?;
        debug!(strategy = ?self.reducer.strategy(), block = rows, "blocks reduced");

        let slots = self.backend.decrypt_values(&ct_res)?;
        let res = extract_block_heads(&slots, rows, cols, self.options.precision)?;
        debug!(outputs = res.len(), "block heads extracted");
        Ok(res)
    }
}

fn check_vector(rows: usize, vector: &PlaintextVector) -> Result<()> {
    if vector.len() != rows {
        return Err(Error::Shape(format!(
            "vector of length {} cannot weight the {rows} rows of the matrix",
            vector.len()
        )));
    }
    Ok(())
}
