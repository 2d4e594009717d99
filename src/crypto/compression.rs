//! Payload compression for the split pipeline.
//!
//! Compresses the plaintext before encryption so the shards carry less bulk.
//! Uses a gzip frame at best-speed; the payload is encrypted afterwards, so
//! squeezing out the last percent of ratio buys nothing.

use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::Read;
use thiserror::Error;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
}

/// Compresses data into a gzip frame.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(data, Compression::fast());
    let mut compressed = Vec::new();

    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    Ok(compressed)
}

/// Decompresses a gzip frame produced by [`compress`].
///
/// Malformed input surfaces as an error, never a panic.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;

    Ok(decompressed)
}
