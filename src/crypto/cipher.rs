//! Authenticated encryption for the payload stage.
//!
//! Uses AES-256-GCM with a fresh random nonce per encryption. The wire layout
//! is `nonce (12 bytes) || ciphertext || tag (16 bytes)` in a single buffer.
//! Decryption failure means the shards are corrupt, mismatched, or the
//! reconstructed key is wrong; it is the pipeline's integrity signal.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Key size for AES-256-GCM.
pub const KEY_SIZE: usize = 32;

/// Nonce size for AES-GCM.
const NONCE_SIZE: usize = 12;

/// Authentication tag size for AES-GCM.
const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption or decryption.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("decryption failed: authentication tag mismatch")]
    AuthenticationFailed,
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_SIZE {
        return Err(CipherError::InvalidKeyLength {
            expected: KEY_SIZE,
            got: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| CipherError::EncryptionFailed(e.to_string()))
}

/// Encrypts `plaintext` under a 32-byte key.
///
/// Draws a fresh nonce from the OS CSPRNG for every call; nonce reuse under
/// the same key breaks GCM entirely.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = cipher_for(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypts and authenticates a `nonce || ciphertext || tag` buffer.
///
/// Any tampering with the ciphertext or tag surfaces as
/// [`CipherError::AuthenticationFailed`]; callers must treat that as
/// non-recoverable for the data at hand.
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = cipher_for(key)?;

    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CipherError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CipherError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        key
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"the chamber of secrets has been opened";

        let blob = encrypt(plaintext, &key).unwrap();
        let decrypted = decrypt(&blob, &key).unwrap();

        assert_eq!(plaintext.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_nonces_differ_between_calls() {
        let key = test_key();
        let a = encrypt(b"same input", &key).unwrap();
        let b = encrypt(b"same input", &key).unwrap();
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = encrypt(b"payload", &test_key()).unwrap();
        let result = decrypt(&blob, &test_key());
        assert!(matches!(result, Err(CipherError::AuthenticationFailed)));
    }

    #[test]
    fn test_any_flipped_bit_fails_authentication() {
        let key = test_key();
        let blob = encrypt(b"integrity matters", &key).unwrap();

        // Flip one bit in every byte position past the nonce: ciphertext and
        // tag alike must fail to open.
        for i in NONCE_SIZE..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(decrypt(&tampered, &key), Err(CipherError::AuthenticationFailed)),
                "bit flip at byte {i} was not caught"
            );
        }
    }

    #[test]
    fn test_rejects_bad_key_length() {
        assert!(matches!(
            encrypt(b"x", &[0u8; 16]),
            Err(CipherError::InvalidKeyLength { expected: 32, got: 16 })
        ));
        assert!(matches!(
            decrypt(&[0u8; 64], &[0u8; 31]),
            Err(CipherError::InvalidKeyLength { expected: 32, got: 31 })
        ));
    }

    #[test]
    fn test_blob_too_short() {
        let result = decrypt(&[0u8; 20], &test_key());
        assert!(matches!(result, Err(CipherError::CiphertextTooShort)));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let blob = encrypt(b"", &key).unwrap();
        assert_eq!(decrypt(&blob, &key).unwrap(), b"");
    }
}
