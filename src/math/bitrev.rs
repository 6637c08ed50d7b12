pub(crate) fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// In-place bit-reversal permutation; `x.len()` must be a power of two.
pub(crate) fn bitrev<T: Copy>(x: &mut [T]) {
    let n = x.len();
    assert!(is_power_of_two(n), "The length n of x must be a power of two");
    if n < 2 {
        return;
    }

    let shift = usize::BITS - n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> shift;
        if i < j {
            x.swap(i, j);
        }
    }
}
