//! # Horcrux - threshold file splitting
//!
//! Horcrux splits a sensitive file into N encrypted fragments ("horcruxes")
//! such that any T of them resurrect the original and fewer than T reveal
//! nothing. Losing up to N−T fragments is tolerated; an attacker holding up
//! to T−1 learns nothing.
//!
//! ## How a split works
//!
//! The plaintext is gzip-compressed, encrypted under a fresh AES-256-GCM key,
//! length-prefixed, and erasure-coded into N Reed-Solomon shards. The key
//! never touches disk whole: it is Shamir-split into N fragments, one per
//! horcrux header. Each horcrux is a self-describing container (banner, JSON
//! header, binary body) or, in paranoiac mode, raw noise with no metadata at
//! all. Optionally every container is hidden inside a copy of a carrier
//! image via LSB steganography.
//!
//! Binding reverses the pipeline: gather at least T horcruxes of the same
//! split, recombine the key fragments, reconstruct the payload, decrypt,
//! decompress. The GCM tag is the integrity gate; no plaintext is ever
//! emitted without it verifying.
//!
//! ## Example
//!
//! ```rust
//! use horcrux::{bind, split_file, Artifact, HorcruxContent};
//!
//! let horcruxes = split_file(b"my diary", "diary.txt", 5, 3, false, None).unwrap();
//! assert_eq!(horcruxes.len(), 5);
//!
//! // Any three survive; feed them back as artifacts.
//! let artifacts: Vec<Artifact> = horcruxes
//!     .into_iter()
//!     .take(3)
//!     .map(|h| match h.content {
//!         HorcruxContent::Framed(bytes) => Artifact::Framed { name: h.name_hint, bytes },
//!         HorcruxContent::Image(_) => unreachable!("no carrier was used"),
//!     })
//!     .collect();
//!
//! let report = bind(artifacts);
//! assert_eq!(report.recovered[0].plaintext, b"my diary");
//! ```
//!
//! ## Modules
//!
//! - [`gf256`]: GF(2⁸) arithmetic shared by Shamir and Reed-Solomon
//! - [`shamir`]: secret sharing for the encryption key
//! - [`erasure`]: systematic Reed-Solomon coding for the payload
//! - [`crypto`]: AES-256-GCM, compression, and the zeroizing [`Secret`]
//! - [`pipeline`]: the compress/encrypt/shard byte pipeline
//! - [`format`]: the on-disk horcrux container
//! - [`stego`]: LSB image steganography for hidden horcruxes
//! - [`splitter`] / [`binder`]: the end-to-end orchestrators

pub mod binder;
pub mod crypto;
pub mod erasure;
pub mod format;
pub mod gf256;
pub mod pipeline;
pub mod shamir;
pub mod splitter;
pub mod stego;

// Re-export the surface the CLI (and other callers) work against.
pub use binder::{
    bind, Artifact, BindFailure, BindReport, FailedGroup, RecoveredFile, SkippedArtifact,
};
pub use crypto::{Secret, KEY_SIZE};
pub use format::{Header, HeaderError};
pub use splitter::{split_file, Horcrux, HorcruxContent, SplitError};
