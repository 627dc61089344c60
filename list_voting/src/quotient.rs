//! Divisor sequences of the Sainte-Laguë family.

/// A divisor sequence: the divisor applied to a list that already won `n` seats.
pub type QuotientFn = fn(u32) -> f64;

/// Divisors 1, 3, 5, 7, ...
pub fn standard(n: u32) -> f64 {
    2.0 * n as f64 + 1.0
}

/// Same as `standard` except for the first divisor, raised to 1.4.
pub fn modified(n: u32) -> f64 {
    if n == 0 {
        1.4
    } else {
        standard(n)
    }
}

/// The factor that turns the vote number of a list with `n - 1` seats into the
/// vote number of the same list with `n` seats.
pub fn ratio(f: QuotientFn, n: u32) -> f64 {
    debug_assert!(n >= 1, "ratio is only defined from the first seat");
    f(n - 1) / f(n)
}

/// The divisor multiplied by 5, as an integer.
///
/// All the divisors of the family are multiples of 1/5, so two vote numbers
/// `va / f(na)` and `vb / f(nb)` compare exactly as
/// `va * scaled(f, nb)` against `vb * scaled(f, na)`.
pub fn scaled(f: QuotientFn, n: u32) -> u64 {
    (f(n) * 5.0).round() as u64
}
