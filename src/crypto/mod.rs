//! Cryptographic building blocks for the split/bind pipeline.
//!
//! This module provides:
//! - Authenticated encryption (AES-256-GCM) for the payload
//! - Gzip compression applied before encryption
//! - The `Secret` wrapper that zeroizes key material on destruction

pub mod cipher;
pub mod compression;
pub mod secret;

pub use cipher::{decrypt, encrypt, CipherError, KEY_SIZE};
pub use compression::{compress, decompress, CompressionError};
pub use secret::Secret;
