//! Shamir secret sharing over GF(2⁸).
//!
//! Splits an arbitrary-length secret into `n` shares of which any `t`
//! reconstruct it. Each byte of the secret becomes the intercept of its own
//! random polynomial of degree `t - 1`, evaluated at x = 1..=n. A share is
//! the concatenation of the per-byte evaluations with the x-coordinate as the
//! trailing byte: `[y_0, y_1, ..., y_{L-1}, x]`.
//!
//! Combining fewer than `t` shares yields deterministic garbage, not an
//! error. Integrity is the authenticated-encryption layer's job.

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::gf256;

/// Errors from splitting or combining shares.
#[derive(Error, Debug)]
pub enum ShamirError {
    #[error("shares cannot be less than threshold")]
    SharesBelowThreshold,

    #[error("shares cannot exceed 255")]
    TooManyShares,

    #[error("threshold must be at least 2")]
    ThresholdTooSmall,

    #[error("cannot split an empty secret")]
    EmptySecret,

    #[error("at least two shares are required to reconstruct")]
    NotEnoughShares,

    #[error("shares have mismatched lengths")]
    LengthMismatch,

    #[error("duplicate share detected (repeated x-coordinate)")]
    DuplicateShare,
}

/// A polynomial over GF(2⁸) with random coefficients above the intercept.
struct Polynomial {
    coefficients: Vec<u8>,
}

impl Polynomial {
    /// Builds a polynomial of the given degree with `intercept` as the
    /// constant term and uniformly random higher coefficients.
    fn random(intercept: u8, degree: u8) -> Self {
        let mut coefficients = vec![0u8; degree as usize + 1];
        coefficients[0] = intercept;
        OsRng.fill_bytes(&mut coefficients[1..]);
        Self { coefficients }
    }

    /// Evaluates the polynomial at `x` using Horner's method.
    fn evaluate(&self, x: u8) -> u8 {
        if x == 0 {
            return self.coefficients[0];
        }
        let mut out = 0u8;
        for &coefficient in self.coefficients.iter().rev() {
            out = gf256::add(gf256::mul(out, x), coefficient);
        }
        out
    }
}

/// Lagrange interpolation at `x` from the sample points `(x_samples[i],
/// y_samples[i])`. The x-coordinates must be pairwise distinct.
fn interpolate(x_samples: &[u8], y_samples: &[u8], x: u8) -> u8 {
    let mut result = 0u8;
    for (i, (&xi, &yi)) in x_samples.iter().zip(y_samples).enumerate() {
        let mut basis = 1u8;
        for (j, &xj) in x_samples.iter().enumerate() {
            if i == j {
                continue;
            }
            let numerator = gf256::add(x, xj);
            let denominator = gf256::add(xi, xj);
            basis = gf256::mul(basis, gf256::div(numerator, denominator));
        }
        result = gf256::add(result, gf256::mul(yi, basis));
    }
    result
}

/// Splits `secret` into `shares` shares, any `threshold` of which
/// reconstruct it.
///
/// Constraints: `2 <= threshold <= shares <= 255` and a non-empty secret.
pub fn split(secret: &[u8], shares: usize, threshold: usize) -> Result<Vec<Vec<u8>>, ShamirError> {
    if threshold < 2 {
        return Err(ShamirError::ThresholdTooSmall);
    }
    if shares < threshold {
        return Err(ShamirError::SharesBelowThreshold);
    }
    if shares > 255 {
        return Err(ShamirError::TooManyShares);
    }
    if secret.is_empty() {
        return Err(ShamirError::EmptySecret);
    }

    // Share layout: [y_0 .. y_{L-1}, x]. The x-coordinates are 1..=n;
    // x = 0 would evaluate every polynomial at its intercept and hand out
    // the secret verbatim.
    let mut out: Vec<Vec<u8>> = (0..shares)
        .map(|i| {
            let mut share = vec![0u8; secret.len() + 1];
            share[secret.len()] = i as u8 + 1;
            share
        })
        .collect();

    for (byte_index, &secret_byte) in secret.iter().enumerate() {
        let polynomial = Polynomial::random(secret_byte, threshold as u8 - 1);
        for share in &mut out {
            let x = share[secret.len()];
            share[byte_index] = polynomial.evaluate(x);
        }
    }

    Ok(out)
}

/// Reconstructs the secret from the given shares.
///
/// Requires at least two shares of identical length with distinct
/// x-coordinates. Supplying fewer shares than the original threshold does not
/// fail here; it produces bytes unrelated to the secret.
pub fn combine(shares: &[Vec<u8>]) -> Result<Vec<u8>, ShamirError> {
    if shares.len() < 2 {
        return Err(ShamirError::NotEnoughShares);
    }

    let share_len = shares[0].len();
    if share_len < 2 {
        return Err(ShamirError::LengthMismatch);
    }

    let mut x_samples = Vec::with_capacity(shares.len());
    for share in shares {
        if share.len() != share_len {
            return Err(ShamirError::LengthMismatch);
        }
        let x = share[share_len - 1];
        if x_samples.contains(&x) {
            return Err(ShamirError::DuplicateShare);
        }
        x_samples.push(x);
    }

    let secret_len = share_len - 1;
    let mut secret = vec![0u8; secret_len];
    let mut y_samples = vec![0u8; shares.len()];

    for byte_index in 0..secret_len {
        for (sample, share) in y_samples.iter_mut().zip(shares) {
            *sample = share[byte_index];
        }
        secret[byte_index] = interpolate(&x_samples, &y_samples, 0);
    }

    Ok(secret)
}
