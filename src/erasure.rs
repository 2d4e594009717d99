//! Systematic Reed-Solomon erasure coding over GF(2⁸).
//!
//! A payload is padded to a multiple of the threshold T, cut into T data
//! shards, and extended with N−T parity shards. Any T shards, identified by
//! their 0-based index, rebuild the padded payload.
//!
//! The encoding matrix is derived from a Vandermonde matrix normalized so
//! its top T rows are the identity; data shards therefore carry the payload
//! bytes verbatim. Every T-row submatrix of a Vandermonde matrix with
//! distinct evaluation points is invertible, and right-multiplying by an
//! invertible matrix preserves that, so reconstruction from any T shards is
//! a matrix inversion away.
//!
//! Reconstruction returns the padded payload. Stripping the padding needs
//! the true payload length, which only the caller knows (the pipeline keeps
//! it in a length prefix).

use std::collections::HashMap;
use thiserror::Error;

use crate::gf256;

/// Errors from erasure splitting or reconstruction.
#[derive(Error, Debug)]
pub enum ErasureError {
    #[error("invalid shard counts: {threshold} data / {total} total")]
    InvalidShardCounts { total: usize, threshold: usize },

    #[error("cannot split an empty payload")]
    EmptyPayload,

    #[error("not enough shards to reconstruct: have {have}, need {need}")]
    TooFewShards { have: usize, need: usize },

    #[error("shard index {index} out of range for {total} total shards")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("shards have mismatched lengths")]
    LengthMismatch,

    #[error("decode matrix is singular")]
    SingularMatrix,
}

/// Raises `base` to `exponent` in GF(2⁸). `pow(0, 0)` is 1 by convention.
fn pow(base: u8, exponent: usize) -> u8 {
    let mut out = 1u8;
    for _ in 0..exponent {
        out = gf256::mul(out, base);
    }
    out
}

/// A dense matrix over GF(2⁸).
#[derive(Clone)]
struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<u8>>,
}

impl Matrix {
    fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![vec![0u8; cols]; rows],
        }
    }

    fn identity(size: usize) -> Self {
        let mut m = Self::zero(size, size);
        for i in 0..size {
            m.data[i][i] = 1;
        }
        m
    }

    /// Vandermonde matrix with evaluation points 0..rows:
    /// `m[r][c] = r^c`.
    fn vandermonde(rows: usize, cols: usize) -> Self {
        let mut m = Self::zero(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                m.data[r][c] = pow(r as u8, c);
            }
        }
        m
    }

    fn multiply(&self, rhs: &Matrix) -> Matrix {
        debug_assert_eq!(self.cols, rhs.rows);
        let mut out = Matrix::zero(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut acc = 0u8;
                for k in 0..self.cols {
                    acc = gf256::add(acc, gf256::mul(self.data[r][k], rhs.data[k][c]));
                }
                out.data[r][c] = acc;
            }
        }
        out
    }

    /// Copies `row_indices` of this matrix into a new one.
    fn select_rows(&self, row_indices: &[usize]) -> Matrix {
        let mut out = Matrix::zero(row_indices.len(), self.cols);
        for (r, &source) in row_indices.iter().enumerate() {
            out.data[r].copy_from_slice(&self.data[source]);
        }
        out
    }

    /// Inverts a square matrix by Gauss-Jordan elimination on `[self | I]`.
    fn invert(&self) -> Result<Matrix, ErasureError> {
        debug_assert_eq!(self.rows, self.cols);
        let n = self.rows;

        let mut work = self.clone();
        let mut inverse = Matrix::identity(n);

        for column in 0..n {
            // Find a nonzero pivot at or below the diagonal.
            let pivot_row = (column..n)
                .find(|&r| work.data[r][column] != 0)
                .ok_or(ErasureError::SingularMatrix)?;
            work.data.swap(column, pivot_row);
            inverse.data.swap(column, pivot_row);

            // Scale the pivot row so the diagonal entry becomes 1.
            let pivot = work.data[column][column];
            if pivot != 1 {
                for c in 0..n {
                    work.data[column][c] = gf256::div(work.data[column][c], pivot);
                    inverse.data[column][c] = gf256::div(inverse.data[column][c], pivot);
                }
            }

            // Eliminate the column from every other row.
            for r in 0..n {
                if r == column || work.data[r][column] == 0 {
                    continue;
                }
                let factor = work.data[r][column];
                for c in 0..n {
                    let w = gf256::mul(factor, work.data[column][c]);
                    work.data[r][c] = gf256::add(work.data[r][c], w);
                    let v = gf256::mul(factor, inverse.data[column][c]);
                    inverse.data[r][c] = gf256::add(inverse.data[r][c], v);
                }
            }
        }

        Ok(inverse)
    }
}

/// A systematic Reed-Solomon codec with fixed shard counts.
pub struct Codec {
    total: usize,
    threshold: usize,
    /// `total x threshold` encoding matrix; the top `threshold` rows are the
    /// identity.
    encoding: Matrix,
}

impl Codec {
    /// Creates a codec producing `total` shards of which any `threshold`
    /// reconstruct. `1 <= threshold <= total <= 255`.
    pub fn new(total: usize, threshold: usize) -> Result<Self, ErasureError> {
        if threshold == 0 || threshold > total || total > 255 {
            return Err(ErasureError::InvalidShardCounts { total, threshold });
        }

        let vandermonde = Matrix::vandermonde(total, threshold);
        let top = vandermonde.select_rows(&(0..threshold).collect::<Vec<_>>());
        // Normalizing by the inverse of the top square turns the first
        // `threshold` rows into the identity, which is what makes the code
        // systematic.
        let encoding = vandermonde.multiply(&top.invert()?);

        Ok(Self {
            total,
            threshold,
            encoding,
        })
    }

    /// Shard length for a payload of `payload_len` bytes: ⌈len/T⌉.
    pub fn shard_len(&self, payload_len: usize) -> usize {
        payload_len.div_ceil(self.threshold)
    }

    /// Splits `payload` into `total` equal-length shards, zero-padding it to
    /// a multiple of the threshold first. Shard `i` carries index `i`;
    /// shards `0..threshold` hold the payload bytes verbatim.
    pub fn split(&self, payload: &[u8]) -> Result<Vec<Vec<u8>>, ErasureError> {
        if payload.is_empty() {
            return Err(ErasureError::EmptyPayload);
        }

        let shard_len = self.shard_len(payload.len());
        let mut shards: Vec<Vec<u8>> = Vec::with_capacity(self.total);

        // Data shards: consecutive slices of the padded payload.
        for i in 0..self.threshold {
            let start = i * shard_len;
            let end = ((i + 1) * shard_len).min(payload.len());
            let mut shard = vec![0u8; shard_len];
            if start < payload.len() {
                shard[..end - start].copy_from_slice(&payload[start..end]);
            }
            shards.push(shard);
        }

        // Parity shards: linear combinations of the data shards.
        for row in self.threshold..self.total {
            let coefficients = &self.encoding.data[row];
            let mut shard = vec![0u8; shard_len];
            for (c, data_shard) in shards[..self.threshold].iter().enumerate() {
                let coefficient = coefficients[c];
                if coefficient == 0 {
                    continue;
                }
                for (out, &byte) in shard.iter_mut().zip(data_shard) {
                    *out = gf256::add(*out, gf256::mul(coefficient, byte));
                }
            }
            shards.push(shard);
        }

        Ok(shards)
    }

    /// Rebuilds the padded payload from at least `threshold` shards keyed by
    /// 0-based index.
    pub fn reconstruct(&self, shards: &HashMap<usize, Vec<u8>>) -> Result<Vec<u8>, ErasureError> {
        if shards.len() < self.threshold {
            return Err(ErasureError::TooFewShards {
                have: shards.len(),
                need: self.threshold,
            });
        }

        let mut shard_len = 0usize;
        for (&index, shard) in shards {
            if index >= self.total {
                return Err(ErasureError::IndexOutOfRange {
                    index,
                    total: self.total,
                });
            }
            if shard_len == 0 {
                shard_len = shard.len();
            }
            if shard.len() != shard_len || shard.is_empty() {
                return Err(ErasureError::LengthMismatch);
            }
        }

        // Fast path: all data shards survived.
        if (0..self.threshold).all(|i| shards.contains_key(&i)) {
            let mut payload = Vec::with_capacity(self.threshold * shard_len);
            for i in 0..self.threshold {
                payload.extend_from_slice(&shards[&i]);
            }
            return Ok(payload);
        }

        // Pick `threshold` available shards in index order and invert the
        // corresponding rows of the encoding matrix.
        let mut picked: Vec<usize> = shards.keys().copied().collect();
        picked.sort_unstable();
        picked.truncate(self.threshold);

        let decode = self.encoding.select_rows(&picked).invert()?;

        let mut payload = vec![0u8; self.threshold * shard_len];
        for (data_index, row) in decode.data.iter().enumerate() {
            let out = &mut payload[data_index * shard_len..(data_index + 1) * shard_len];
            for (k, &source_index) in picked.iter().enumerate() {
                let coefficient = row[k];
                if coefficient == 0 {
                    continue;
                }
                let shard = &shards[&source_index];
                for (o, &byte) in out.iter_mut().zip(shard) {
                    *o = gf256::add(*o, gf256::mul(coefficient, byte));
                }
            }
        }

        Ok(payload)
    }

    /// Total shard count (data + parity).
    pub fn total(&self) -> usize {
        self.total
    }

    /// Data shard count; also the reconstruction threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}
