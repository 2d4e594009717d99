//! The byte-transformation pipeline between a plaintext and its shards.
//!
//! Split direction: compress, encrypt, prepend an 8-byte little-endian
//! ciphertext length, erasure-split into N shards. Join direction runs the
//! stages in reverse.
//!
//! The length prefix is load-bearing. Reed-Solomon pads the payload to a
//! multiple of the threshold, and after reconstruction nothing else can tell
//! genuine tail bytes from padding; the padding would flow into GCM and fail
//! the tag check. The prefix is the sole truth of the ciphertext length.

use std::collections::HashMap;
use thiserror::Error;

use crate::crypto::{cipher, compression};
use crate::erasure;

/// Length of the little-endian ciphertext-length prefix.
const LENGTH_PREFIX: usize = 8;

/// Errors from the split or join pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Compression(#[from] compression::CompressionError),

    #[error(transparent)]
    Cipher(#[from] cipher::CipherError),

    #[error(transparent)]
    Erasure(#[from] erasure::ErasureError),

    #[error("reconstructed payload is too short to contain a length prefix")]
    MissingLengthPrefix,

    #[error("reconstructed payload is shorter than its recorded length")]
    TruncatedPayload,
}

/// Runs the split pipeline: compress, encrypt under `key`, length-prefix,
/// shard into `total` pieces of which `threshold` reconstruct.
pub fn split(
    plaintext: &[u8],
    key: &[u8],
    total: usize,
    threshold: usize,
) -> Result<Vec<Vec<u8>>, PipelineError> {
    let compressed = compression::compress(plaintext)?;
    let ciphertext = cipher::encrypt(&compressed, key)?;

    // payload = [length (8 bytes, LE) | ciphertext]
    let mut payload = Vec::with_capacity(LENGTH_PREFIX + ciphertext.len());
    payload.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    payload.extend_from_slice(&ciphertext);

    let codec = erasure::Codec::new(total, threshold)?;
    Ok(codec.split(&payload)?)
}

/// Runs the join pipeline on `threshold`-or-more shards keyed by 0-based
/// index: reconstruct, strip padding via the length prefix, decrypt and
/// authenticate, decompress.
///
/// A decryption error here is the primary integrity signal for the whole
/// shard set.
pub fn join(
    shards: &HashMap<usize, Vec<u8>>,
    key: &[u8],
    total: usize,
    threshold: usize,
) -> Result<Vec<u8>, PipelineError> {
    let codec = erasure::Codec::new(total, threshold)?;
    let payload = codec.reconstruct(shards)?;

    if payload.len() < LENGTH_PREFIX {
        return Err(PipelineError::MissingLengthPrefix);
    }

    let mut length_bytes = [0u8; LENGTH_PREFIX];
    length_bytes.copy_from_slice(&payload[..LENGTH_PREFIX]);
    let ciphertext_len = u64::from_le_bytes(length_bytes) as usize;

    let remainder = &payload[LENGTH_PREFIX..];
    if remainder.len() < ciphertext_len {
        return Err(PipelineError::TruncatedPayload);
    }

    let ciphertext = &remainder[..ciphertext_len];
    let compressed = cipher::decrypt(ciphertext, key)?;
    let plaintext = compression::decompress(&compressed)?;

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Secret, KEY_SIZE};
    use rand::RngCore;

    fn keep(shards: &[Vec<u8>], indices: &[usize]) -> HashMap<usize, Vec<u8>> {
        indices.iter().map(|&i| (i, shards[i].clone())).collect()
    }

    #[test]
    fn test_split_join_roundtrip() {
        let key = Secret::generate(KEY_SIZE);
        let plaintext = b"Not my daughter, you bitch!";

        let shards = split(plaintext, key.bytes(), 5, 3).unwrap();
        assert_eq!(shards.len(), 5);

        let recovered = join(&keep(&shards, &[0, 1, 2, 3, 4]), key.bytes(), 5, 3).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_join_with_minimum_shards() {
        let key = Secret::generate(KEY_SIZE);
        let mut plaintext = vec![0u8; 100_000];
        rand::rngs::OsRng.fill_bytes(&mut plaintext);

        let shards = split(&plaintext, key.bytes(), 5, 3).unwrap();

        // Lose shards 0 and 3; reconstruction must still be exact.
        let recovered = join(&keep(&shards, &[1, 2, 4]), key.bytes(), 5, 3).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_wrong_key_is_an_integrity_error() {
        let key = Secret::generate(KEY_SIZE);
        let wrong = Secret::generate(KEY_SIZE);
        let shards = split(b"secret diary", key.bytes(), 3, 2).unwrap();

        let result = join(&keep(&shards, &[0, 1]), wrong.bytes(), 3, 2);
        assert!(matches!(
            result,
            Err(PipelineError::Cipher(cipher::CipherError::AuthenticationFailed))
        ));
    }

    #[test]
    fn test_tampered_shard_fails_authentication() {
        let key = Secret::generate(KEY_SIZE);
        let shards = split(b"some sensitive content here", key.bytes(), 3, 2).unwrap();

        // Corrupt a byte in a data shard and join from exactly the corrupted
        // pair; GCM must refuse to emit plaintext.
        let mut map = keep(&shards, &[0, 1]);
        map.get_mut(&0).unwrap()[2] ^= 0xFF;

        let result = join(&map, key.bytes(), 3, 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let key = Secret::generate(KEY_SIZE);
        // Even an empty file compresses into a nonempty gzip frame, so the
        // pipeline never sees an empty erasure payload.
        let shards = split(b"", key.bytes(), 3, 2).unwrap();
        let recovered = join(&keep(&shards, &[2, 0]), key.bytes(), 3, 2).unwrap();
        assert_eq!(recovered, b"");
    }

    #[test]
    fn test_too_few_shards_surfaces_erasure_error() {
        let key = Secret::generate(KEY_SIZE);
        let shards = split(b"payload", key.bytes(), 5, 3).unwrap();

        let result = join(&keep(&shards, &[1, 4]), key.bytes(), 5, 3);
        assert!(matches!(
            result,
            Err(PipelineError::Erasure(erasure::ErasureError::TooFewShards { .. }))
        ));
    }
}
