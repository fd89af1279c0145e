//! Modular arithmetic shared by every cipher.

/// Greatest common divisor, always non-negative.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `n mod m` normalized into `[0, m)` for negative `n`.
pub fn modulo(n: i64, m: i64) -> i64 {
    ((n % m) + m) % m
}

/// Multiplicative inverse of `a` modulo `m` via the extended Euclidean
/// algorithm. `None` when `gcd(a, m) != 1`.
pub fn mod_inverse(a: i64, m: i64) -> Option<i64> {
    if m <= 0 {
        return None;
    }

    let mut rs = (modulo(a, m), m);
    let mut st = (1i64, 0i64);

    while rs.1 != 0 {
        let q = rs.0 / rs.1;
        rs = (rs.1, rs.0 - q * rs.1);
        st = (st.1, st.0 - q * st.1);
    }

    if rs.0 == 1 {
        Some(modulo(st.0, m))
    } else {
        None
    }
}
