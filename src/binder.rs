//! Bind orchestration: a pile of artifacts in, resurrected files out.
//!
//! Artifacts arrive either as framed container bytes or as decoded images;
//! images go through stego extraction first, so both kinds feed the same
//! container parser. Parsed horcruxes are grouped by (original filename,
//! timestamp); each group that reaches its threshold gets its key
//! reconstructed and its shards joined.
//!
//! Unreadable artifacts are skipped with a reason and never sink the rest of
//! the set. A group that fails authentication produces no output at all:
//! plaintext is only ever emitted after the GCM tag verified.

use image::DynamicImage;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use thiserror::Error;

use crate::crypto::Secret;
use crate::format::Reader;
use crate::pipeline::{self, PipelineError};
use crate::shamir::{self, ShamirError};
use crate::stego;

/// One input handed to [`bind`]: either raw framed bytes (a `.horcrux` or
/// headerless file) or an already-decoded image suspected to carry a hidden
/// horcrux.
pub enum Artifact {
    Framed { name: String, bytes: Vec<u8> },
    Image { name: String, image: DynamicImage },
}

impl Artifact {
    fn name(&self) -> &str {
        match self {
            Artifact::Framed { name, .. } => name,
            Artifact::Image { name, .. } => name,
        }
    }
}

/// Why a whole group could not be bound.
#[derive(Error, Debug)]
pub enum BindFailure {
    #[error("not enough horcruxes: need {need}, found {have}")]
    NotEnoughShards { have: usize, need: usize },

    #[error("horcruxes disagree on total/threshold")]
    InconsistentGroup,

    #[error("failed to reconstruct key: {0}")]
    KeyReconstruction(#[from] ShamirError),

    #[error("reconstruction failed: {0}")]
    Reconstruction(#[from] PipelineError),
}

impl BindFailure {
    /// True when the group was corrupt or mismatched rather than merely
    /// incomplete.
    pub fn is_integrity_failure(&self) -> bool {
        !matches!(self, BindFailure::NotEnoughShards { .. })
    }
}

/// A successfully resurrected file.
pub struct RecoveredFile {
    pub original_filename: String,
    pub plaintext: Vec<u8>,
}

/// An artifact that could not be used, and why.
pub struct SkippedArtifact {
    pub name: String,
    pub reason: String,
}

/// A group that reached the binder but produced no output.
pub struct FailedGroup {
    pub original_filename: String,
    pub failure: BindFailure,
}

/// Everything that happened during one bind run.
#[derive(Default)]
pub struct BindReport {
    pub recovered: Vec<RecoveredFile>,
    pub skipped: Vec<SkippedArtifact>,
    pub failed: Vec<FailedGroup>,
}

struct GroupMember {
    key_fragment: Vec<u8>,
    total: usize,
    threshold: usize,
    body: Vec<u8>,
}

/// Binds a set of artifacts back into the original files.
///
/// Never fails as a whole; per-artifact and per-group problems are recorded
/// in the report. Callers decide what a partial result means to them.
pub fn bind(artifacts: Vec<Artifact>) -> BindReport {
    let mut report = BindReport::default();
    // BTreeMaps keep group handling and output ordering deterministic.
    let mut groups: BTreeMap<(String, i64), BTreeMap<usize, GroupMember>> = BTreeMap::new();

    for artifact in artifacts {
        let name = artifact.name().to_string();

        let framed = match artifact {
            Artifact::Framed { bytes, .. } => bytes,
            Artifact::Image { image, .. } => match stego::extract(&image) {
                Ok(bytes) => bytes,
                Err(e) => {
                    report.skipped.push(SkippedArtifact {
                        name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            },
        };

        let (header, body) = match Reader::new(Cursor::new(framed)).and_then(Reader::into_parts) {
            Ok(parts) => parts,
            Err(e) => {
                report.skipped.push(SkippedArtifact {
                    name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let group = groups.entry(header.group_id()).or_default();
        if group.contains_key(&header.index) {
            report.skipped.push(SkippedArtifact {
                name,
                reason: format!("duplicate horcrux index {}", header.index),
            });
            continue;
        }
        group.insert(
            header.index,
            GroupMember {
                key_fragment: header.key_fragment,
                total: header.total,
                threshold: header.threshold,
                body,
            },
        );
    }

    for ((original_filename, _), members) in groups {
        match bind_group(&members) {
            Ok(plaintext) => report.recovered.push(RecoveredFile {
                original_filename,
                plaintext,
            }),
            Err(failure) => report.failed.push(FailedGroup {
                original_filename,
                failure,
            }),
        }
    }

    report
}

fn bind_group(members: &BTreeMap<usize, GroupMember>) -> Result<Vec<u8>, BindFailure> {
    let reference = members.values().next().expect("groups are never empty");
    let (total, threshold) = (reference.total, reference.threshold);

    if members
        .values()
        .any(|m| m.total != total || m.threshold != threshold)
    {
        return Err(BindFailure::InconsistentGroup);
    }
    if members.len() < threshold {
        return Err(BindFailure::NotEnoughShards {
            have: members.len(),
            need: threshold,
        });
    }

    let fragments: Vec<Vec<u8>> = members.values().map(|m| m.key_fragment.clone()).collect();
    let mut key = Secret::wrap(shamir::combine(&fragments)?);

    // The header index is 1-based (it doubles as the Shamir x-coordinate);
    // Reed-Solomon counts shards from 0. This is the single point where the
    // two conventions are converted.
    let shards: HashMap<usize, Vec<u8>> = members
        .iter()
        .map(|(&index, member)| (index - 1, member.body.clone()))
        .collect();

    let result = pipeline::join(&shards, key.bytes(), total, threshold);
    key.destroy();

    Ok(result?)
}
