use std::ops::Index;

use crate::error::{Error, Result};

/// Dense row-major matrix of reals with `rows` rows of `cols` entries each.
///
/// Construction checks that the matrix is non-empty and rectangular, so every
/// value of this type has a well defined shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaintextMatrix {
    entries: Vec<Vec<f64>>,
    cols: usize,
}

impl PlaintextMatrix {
    pub fn new(entries: Vec<Vec<f64>>) -> Result<Self> {
        let cols = match entries.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(Error::Shape("matrix must have at least one row and one column".into())),
        };
        if let Some((r, row)) = entries.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(Error::Shape(format!(
                "row {r} has {} entries, expected {cols}",
                row.len()
            )));
        }
        Ok(Self { entries, cols })
    }

    pub fn rows(&self) -> usize {
        self.entries.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows(), self.cols)
    }

    pub fn row(&self, r: usize) -> &[f64] {
        &self.entries[r]
    }

    pub fn row_vectors(&self) -> impl Iterator<Item = PlaintextVector> + '_ {
        self.entries.iter().map(|row| PlaintextVector::from(row.clone()))
    }

    /// v^T * self, computed in the clear.
    pub fn transpose_mul(&self, vector: &PlaintextVector) -> Result<PlaintextVector> {
        if vector.len() != self.rows() {
            return Err(Error::Shape(format!(
                "vector of length {} cannot weight the {} rows of the matrix",
                vector.len(),
                self.rows()
            )));
        }
        let res = (0..self.cols)
            .map(|c| (0..self.rows()).map(|r| self.entries[r][c] * vector[r]).sum())
            .collect::<Vec<f64>>();
        Ok(res.into())
    }
}

impl Index<(usize, usize)> for PlaintextMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.entries[row][col]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaintextVector {
    entries: Vec<f64>,
}

impl PlaintextVector {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.entries
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.entries
    }
}

impl From<Vec<f64>> for PlaintextVector {
    fn from(entries: Vec<f64>) -> Self {
        Self { entries }
    }
}

impl Index<usize> for PlaintextVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(matches!(PlaintextMatrix::new(vec![]), Err(Error::Shape(_))));
        assert!(matches!(PlaintextMatrix::new(vec![vec![]]), Err(Error::Shape(_))));
        assert!(matches!(
            PlaintextMatrix::new(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_dimensions_and_index() {
        let m = PlaintextMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.dimensions(), (2, 3));
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_transpose_mul() {
        let m = PlaintextMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let v = PlaintextVector::from(vec![1.0, -1.0]);
        assert_eq!(m.transpose_mul(&v).unwrap().as_slice(), &[-3.0, -3.0, -3.0]);

        let bad = PlaintextVector::from(vec![1.0, 2.0, 3.0]);
        assert!(matches!(m.transpose_mul(&bad), Err(Error::Shape(_))));
    }
}
