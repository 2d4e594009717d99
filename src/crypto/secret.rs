//! Wrapper for ephemeral key material.
//!
//! A [`Secret`] owns a byte buffer and guarantees the bytes are overwritten
//! with zeros when destroyed, through `zeroize`'s volatile writes that the
//! compiler cannot elide. Destruction is idempotent and also happens on drop,
//! covering every early-return path in the callers.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

/// An in-memory secret (an encryption key, or a key reconstructed from
/// shares). Never cloned; the creator owns the only copy.
pub struct Secret {
    data: Vec<u8>,
}

impl Secret {
    /// Generates a secret of `size` bytes from the OS CSPRNG.
    pub fn generate(size: usize) -> Self {
        let mut data = vec![0u8; size];
        OsRng.fill_bytes(&mut data);
        Self { data }
    }

    /// Adopts existing bytes as a secret, taking ownership so there is a
    /// single buffer left to zeroize.
    pub fn wrap(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Borrows the raw bytes. Empty after [`destroy`](Self::destroy).
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Overwrites the buffer with zeros and marks it gone. Idempotent.
    pub fn destroy(&mut self) {
        self.data.zeroize();
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_fills_with_random_bytes() {
        let a = Secret::generate(32);
        let b = Secret::generate(32);
        assert_eq!(a.bytes().len(), 32);
        assert_ne!(a.bytes(), b.bytes());
    }

    #[test]
    fn test_wrap_keeps_bytes() {
        let secret = Secret::wrap(vec![1, 2, 3, 4]);
        assert_eq!(secret.bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_destroy_clears_and_is_idempotent() {
        let mut secret = Secret::wrap(vec![0xAA; 16]);
        secret.destroy();
        assert!(secret.bytes().is_empty());
        secret.destroy();
        assert!(secret.bytes().is_empty());
    }
}
