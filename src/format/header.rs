//! Horcrux metadata header.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from header validation.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("invalid index {index} for total {total}")]
    InvalidIndex { index: usize, total: usize },

    #[error("invalid threshold {threshold} for total {total}")]
    InvalidThreshold { threshold: usize, total: usize },

    #[error("header is missing key fragment")]
    MissingKeyFragment,

    #[error("header is missing original filename")]
    MissingFilename,
}

/// All the metadata required to bind a set of horcruxes back together.
///
/// Immutable once constructed. The JSON field names are part of the on-disk
/// format; `keyFragment` is carried as a base64 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Name of the file before splitting.
    pub original_filename: String,

    /// Unix timestamp of the split. Together with the filename it identifies
    /// the group, so horcruxes from different sessions never mix.
    pub timestamp: i64,

    /// 1-based shard index. Doubles as the Shamir x-coordinate of the key
    /// fragment; x = 0 is forbidden because it would expose the secret.
    pub index: usize,

    /// Total number of horcruxes created.
    pub total: usize,

    /// Number of horcruxes required to resurrect the file.
    pub threshold: usize,

    /// Shamir share of the AES-256-GCM key for this horcrux.
    #[serde(with = "base64_bytes")]
    pub key_fragment: Vec<u8>,
}

impl Header {
    /// Checks that the header contains sane values.
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.index < 1 || self.index > self.total {
            return Err(HeaderError::InvalidIndex {
                index: self.index,
                total: self.total,
            });
        }
        if self.threshold < 2 || self.threshold > self.total {
            return Err(HeaderError::InvalidThreshold {
                threshold: self.threshold,
                total: self.total,
            });
        }
        if self.key_fragment.is_empty() {
            return Err(HeaderError::MissingKeyFragment);
        }
        if self.original_filename.is_empty() {
            return Err(HeaderError::MissingFilename);
        }
        Ok(())
    }

    /// The (filename, timestamp) pair identifying which split this horcrux
    /// belongs to.
    pub fn group_id(&self) -> (String, i64) {
        (self.original_filename.clone(), self.timestamp)
    }
}

/// Serde adapter encoding `Vec<u8>` as a base64 string in JSON.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}
