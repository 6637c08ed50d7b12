use num_complex::Complex64;

use super::MAX_PRECISION;
use crate::{
    error::{Error, Result},
    layout::PlaintextVector,
};

/// Reads the representative (first) slot of `count` blocks of width `block`,
/// keeping the real part rounded to `precision` decimals (at most
/// [`MAX_PRECISION`]).
pub fn extract_block_heads(
    slots: &[Complex64],
    block: usize,
    count: usize,
    precision: Option<u32>,
) -> Result<PlaintextVector> {
    if block == 0 || block * count > slots.len() {
        return Err(Error::Shape(format!(
            "{count} blocks of width {block} do not fit in {} decoded slots",
            slots.len()
        )));
    }
    Ok((0..count)
        .map(|c| round_to(slots[c * block].re, precision))
        .collect::<Vec<_>>()
        .into())
}

fn round_to(x: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(digits) => {
            let factor = 10f64.powi(digits.min(MAX_PRECISION) as i32);
            (x * factor).round() / factor
        }
        None => x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_block_heads() {
        let slots: Vec<Complex64> = (0..12).map(|i| Complex64::new(i as f64 + 0.004, 1.0)).collect();
        let heads = extract_block_heads(&slots, 4, 3, Some(2)).unwrap();
        assert_eq!(heads.as_slice(), &[0.0, 4.0, 8.0]);

        let raw = extract_block_heads(&slots, 4, 2, None).unwrap();
        assert_eq!(raw.as_slice(), &[0.004, 4.004]);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(67.99999991, Some(2)), 68.0);
        assert_eq!(round_to(-1.236, Some(2)), -1.24);
        assert_eq!(round_to(3.5, Some(0)), 4.0);
    }

    #[test]
    fn test_large_precision_is_clamped() {
        assert_eq!(round_to(68.0, Some(400)), 68.0);
        assert_eq!(round_to(-1.25, Some(u32::MAX)), -1.25);
        let slots = vec![Complex64::new(116.0, 0.0); 4];
        let heads = extract_block_heads(&slots, 2, 2, Some(400)).unwrap();
        assert_eq!(heads.as_slice(), &[116.0, 116.0]);
    }

    #[test]
    fn test_out_of_range() {
        let slots = vec![Complex64::new(0.0, 0.0); 8];
        assert!(matches!(extract_block_heads(&slots, 3, 3, None), Err(Error::Shape(_))));
        assert!(matches!(extract_block_heads(&slots, 0, 1, None), Err(Error::Shape(_))));
    }
}
