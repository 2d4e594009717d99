//! Split orchestration: one input file in, N horcrux artifacts out.

use image::DynamicImage;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::crypto::{Secret, KEY_SIZE};
use crate::format::{FormatError, Header, Writer};
use crate::pipeline::{self, PipelineError};
use crate::shamir::{self, ShamirError};
use crate::stego::{self, StegoError};

/// Errors from the split orchestrator.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("number of horcruxes must be at least 2")]
    TotalTooSmall,

    #[error("threshold must be at least 2")]
    ThresholdTooSmall,

    #[error("threshold cannot be greater than the number of horcruxes")]
    ThresholdExceedsTotal,

    #[error("failed to split key: {0}")]
    Shamir(#[from] ShamirError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("mismatch between data shards ({shards}) and key fragments ({fragments})")]
    CountMismatch { shards: usize, fragments: usize },

    #[error("failed to serialize horcrux {index}: {source}")]
    Format { index: usize, source: FormatError },

    #[error("failed to embed horcrux {index} into carrier: {source}")]
    Stego { index: usize, source: StegoError },
}

/// The payload of one produced horcrux.
pub enum HorcruxContent {
    /// Framed container bytes, ready to be written as-is.
    Framed(Vec<u8>),
    /// A stego image; must be persisted in a lossless container (PNG).
    Image(DynamicImage),
}

/// One of the N artifacts produced by a split.
pub struct Horcrux {
    /// Suggested output file name, e.g. `diary_2_of_5.horcrux`.
    pub name_hint: String,
    pub content: HorcruxContent,
}

/// Splits `input` into `total` horcruxes of which any `threshold` bind back
/// to the original.
///
/// An ephemeral AES-256 key is generated, Shamir-split across the headers,
/// and zeroized before this function returns on every path. With a carrier
/// image, each framed horcrux is hidden in a fresh copy of the carrier; with
/// `headerless` set, the on-disk form is raw noise and binding becomes the
/// user's burden.
pub fn split_file(
    input: &[u8],
    original_filename: &str,
    total: usize,
    threshold: usize,
    headerless: bool,
    carrier: Option<&DynamicImage>,
) -> Result<Vec<Horcrux>, SplitError> {
    if total < 2 {
        return Err(SplitError::TotalTooSmall);
    }
    if threshold < 2 {
        return Err(SplitError::ThresholdTooSmall);
    }
    if threshold > total {
        return Err(SplitError::ThresholdExceedsTotal);
    }

    let mut key = Secret::generate(KEY_SIZE);
    let result = split_with_key(
        input,
        original_filename,
        total,
        threshold,
        headerless,
        carrier,
        &key,
    );
    key.destroy();
    result
}

fn split_with_key(
    input: &[u8],
    original_filename: &str,
    total: usize,
    threshold: usize,
    headerless: bool,
    carrier: Option<&DynamicImage>,
    key: &Secret,
) -> Result<Vec<Horcrux>, SplitError> {
    let key_fragments = shamir::split(key.bytes(), total, threshold)?;
    let shards = pipeline::split(input, key.bytes(), total, threshold)?;

    if shards.len() != key_fragments.len() {
        return Err(SplitError::CountMismatch {
            shards: shards.len(),
            fragments: key_fragments.len(),
        });
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64);
    let stem = file_stem(original_filename);

    let mut horcruxes = Vec::with_capacity(total);
    for (i, (fragment, shard)) in key_fragments.into_iter().zip(shards).enumerate() {
        let index = i + 1; // 1-based on disk; doubles as the Shamir x-coordinate

        let header = Header {
            original_filename: original_filename.to_string(),
            timestamp,
            index,
            total,
            threshold,
            key_fragment: fragment,
        };

        let mut framed = Vec::new();
        Writer::new(&mut framed)
            .write(&header, &shard, headerless)
            .map_err(|source| SplitError::Format { index, source })?;

        let (content, extension) = match carrier {
            Some(carrier) => {
                let stego_image = stego::embed(carrier, &framed)
                    .map_err(|source| SplitError::Stego { index, source })?;
                (HorcruxContent::Image(stego_image), "png")
            }
            None if headerless => (HorcruxContent::Framed(framed), "bin"),
            None => (HorcruxContent::Framed(framed), "horcrux"),
        };

        horcruxes.push(Horcrux {
            name_hint: format!("{stem}_{index}_of_{total}.{extension}"),
            content,
        });
    }

    Ok(horcruxes)
}

/// File name without its final extension, for naming the outputs.
fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}
