//! Slot layout of a matrix-vector product.
//!
//! The matrix is flattened column-major so that column `c` occupies the block
//! of slots `[c*k, (c+1)*k)`, `k` being the number of rows. The vector (one
//! weight per row) is tiled once per column block, so that slot `c*k + r`
//! holds `M[r][c]` on the matrix side and `v[r]` on the vector side. An
//! elementwise product followed by a block sum then yields `sum_r M[r][c] v[r]`
//! in the first slot of block `c`.

mod matrix;

use num_complex::Complex64;

pub use matrix::{PlaintextMatrix, PlaintextVector};

use crate::error::{Error, Result};

/// Column-major flattening: slot `col * rows + row` holds `matrix[row][col]`.
pub fn flatten_column_major(matrix: &PlaintextMatrix) -> Vec<f64> {
    let (rows, cols) = matrix.dimensions();
    let mut res = Vec::with_capacity(rows * cols);
    for col in 0..cols {
        for row in 0..rows {
            res.push(matrix[(row, col)]);
        }
    }
    res
}

/// Inverse of [`flatten_column_major`] for a matrix with `rows` rows.
pub fn unflatten_column_major(slots: &[f64], rows: usize) -> Result<PlaintextMatrix> {
    if rows == 0 || slots.len() % rows != 0 {
        return Err(Error::Shape(format!(
            "{} slots cannot be split into columns of height {rows}",
            slots.len()
        )));
    }
    let cols = slots.len() / rows;
    let entries = (0..rows)
        .map(|row| (0..cols).map(|col| slots[col * rows + row]).collect())
        .collect();
    PlaintextMatrix::new(entries)
}

/// Repeats `vector` `repetitions` times end to end.
///
/// Fails with [`Error::EncodingOverflow`] if the result would not fit in
/// `capacity` slots.
pub fn tile(vector: &PlaintextVector, repetitions: usize, capacity: usize) -> Result<Vec<f64>> {
    if repetitions == 0 {
        return Err(Error::Shape("a vector must be tiled at least once".into()));
    }
    let len = vector
        .len()
        .checked_mul(repetitions)
        .ok_or(Error::EncodingOverflow { len: usize::MAX, capacity })?;
    if len > capacity {
        return Err(Error::EncodingOverflow { len, capacity });
    }
    let mut res = Vec::with_capacity(len);
    for _ in 0..repetitions {
        res.extend_from_slice(vector.as_slice());
    }
    Ok(res)
}

/// Lifts real slot values to the complex slots a CKKS encoder consumes.
pub fn to_complex_slots(values: &[f64]) -> Vec<Complex64> {
    values.iter().map(|&re| Complex64::new(re, 0.0)).collect()
}
