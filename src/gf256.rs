//! Arithmetic over GF(2⁸), the field shared by the Shamir and Reed-Solomon
//! layers.
//!
//! The field is built on the irreducible polynomial x⁸ + x⁴ + x³ + x + 1
//! (0x11B) with generator 3. Multiplication and division go through
//! precomputed log/exp tables; the zero cases are masked in constant time so
//! that operating on key bytes does not leak through timing.

use subtle::{ConditionallySelectable, ConstantTimeEq};

/// Carry-less multiplication used only to build the tables at compile time.
const fn mul_slow(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    let mut i = 0;
    while i < 8 {
        if b & 1 != 0 {
            product ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= 0x1B; // reduce modulo x^8 + x^4 + x^3 + x + 1
        }
        b >>= 1;
        i += 1;
    }
    product
}

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x = 1u8;
    let mut i = 0;
    while i < 255 {
        exp[i] = x;
        log[x as usize] = i as u8;
        x = mul_slow(x, 3);
        i += 1;
    }
    // The cycle length is 255, so exp[255] is never reached by a reduced
    // index. Fill it with the cycle start anyway so the table has no hole.
    exp[255] = exp[0];
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();

/// exp[i] = 3^i in GF(2⁸).
pub(crate) const EXP_TABLE: [u8; 256] = TABLES.0;

/// log[x] = i such that 3^i = x. log[0] is a sentinel and must never be used
/// without masking the zero case.
pub(crate) const LOG_TABLE: [u8; 256] = TABLES.1;

/// Addition in GF(2⁸). Identical to subtraction.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiplication in GF(2⁸).
///
/// Returns 0 when either operand is 0. The zero check is a constant-time
/// select, not a branch.
pub fn mul(a: u8, b: u8) -> u8 {
    let sum = (LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize) % 255;
    let product = EXP_TABLE[sum];
    let either_zero = a.ct_eq(&0) | b.ct_eq(&0);
    u8::conditional_select(&product, &0, either_zero)
}

/// Division in GF(2⁸).
///
/// # Panics
///
/// Panics if `b` is 0. Every caller must guarantee a nonzero divisor; a zero
/// divisor is unreachable in a correct pipeline.
pub fn div(a: u8, b: u8) -> u8 {
    if b == 0 {
        panic!("division by zero in GF(2^8)");
    }
    let diff = (LOG_TABLE[a as usize] as i32 - LOG_TABLE[b as usize] as i32).rem_euclid(255);
    let quotient = EXP_TABLE[diff as usize];
    u8::conditional_select(&quotient, &0, a.ct_eq(&0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_xor() {
        assert_eq!(add(0x53, 0xCA), 0x53 ^ 0xCA);
        assert_eq!(add(0xFF, 0xFF), 0);
    }

    #[test]
    fn test_mul_zero_annihilates() {
        for a in 0..=255u8 {
            assert_eq!(mul(a, 0), 0);
            assert_eq!(mul(0, a), 0);
        }
    }

    #[test]
    fn test_mul_identity() {
        for a in 0..=255u8 {
            assert_eq!(mul(a, 1), a);
            assert_eq!(mul(1, a), a);
        }
    }

    #[test]
    fn test_mul_matches_slow_path() {
        // Spot-check the table lookups against carry-less multiplication.
        for a in [0u8, 1, 2, 3, 0x53, 0x8F, 0xFE, 0xFF] {
            for b in [0u8, 1, 2, 3, 0xCA, 0x11, 0x80, 0xFF] {
                assert_eq!(mul(a, b), mul_slow(a, b), "mul({a}, {b})");
            }
        }
    }

    #[test]
    fn test_div_inverts_mul() {
        for a in 1..=255u8 {
            for b in [1u8, 2, 3, 0x1D, 0x8E, 0xFF] {
                let product = mul(a, b);
                assert_eq!(div(product, b), a, "div(mul({a}, {b}), {b})");
            }
        }
    }

    #[test]
    fn test_div_zero_numerator() {
        for b in 1..=255u8 {
            assert_eq!(div(0, b), 0);
        }
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn test_div_by_zero_panics() {
        div(1, 0);
    }

    #[test]
    fn test_tables_are_inverse_of_each_other() {
        for i in 0..255usize {
            assert_eq!(LOG_TABLE[EXP_TABLE[i] as usize] as usize, i);
        }
        // Generator 3 has full order, so every nonzero byte appears.
        let mut seen = [false; 256];
        for i in 0..255usize {
            seen[EXP_TABLE[i] as usize] = true;
        }
        assert!((1..=255).all(|v| seen[v]));
    }
}
