pub(crate) fn mul_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

pub(crate) fn modpow(mut a: u64, mut n: u64, p: u64) -> u64 {
    let mut res = 1;
    a %= p;
    while n > 0 {
        if n % 2 == 1 {
            res = mul_mod(res, a, p);
        }
        a = mul_mod(a, a, p);
        n /= 2;
    }
    res
}

/// Witnesses that make Miller-Rabin deterministic for every n < 2^64.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// miller rabin prime test
pub(crate) fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // n-1 = 2^k * q, with q odd
    let k = (n - 1).trailing_zeros();
    let q = (n - 1) >> k;

    'witness: for a in WITNESSES {
        let mut x = modpow(a, q, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..k {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Collects `count` primes congruent to 1 mod `m`, walking outwards from
/// `center`: `center + i*m + 1` and `center - i*m + 1` for i = 1, 2, ...
/// Primes in `exclude` are skipped. Returns `None` if the walk would leave
/// the positive range before enough primes are found.
pub(crate) fn ntt_primes_around(center: u64, m: u64, count: usize, exclude: &[u64]) -> Option<Vec<u64>> {
    let mut primes = Vec::with_capacity(count);
    let mut bnd = 1u64;
    while primes.len() < count {
        let up = center.checked_add(bnd.checked_mul(m)?)?.checked_add(1)?;
        if is_prime(up) && !exclude.contains(&up) {
            primes.push(up);
            if primes.len() == count {
                break;
            }
        }
        let down = center.checked_sub(bnd.checked_mul(m)?)?.checked_add(1)?;
        if down > m && is_prime(down) && !exclude.contains(&down) {
            primes.push(down);
        }
        bnd += 1;
    }
    Some(primes)
}
