//! Integration tests for horcrux.
//!
//! These run the full pipeline through the public API: split, lose or
//! mistreat some horcruxes, bind, and check the resurrected bytes. The one
//! property that must never break: plaintext only comes out byte-identical
//! or not at all.

use image::{DynamicImage, ImageBuffer, Rgb};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::io::Cursor;

use horcrux::format::Reader;
use horcrux::{bind, shamir, split_file, stego, Artifact, HorcruxContent};

/// Unwraps framed horcruxes into bind artifacts.
fn to_artifacts(horcruxes: Vec<horcrux::Horcrux>) -> Vec<Artifact> {
    horcruxes
        .into_iter()
        .map(|h| match h.content {
            HorcruxContent::Framed(bytes) => Artifact::Framed {
                name: h.name_hint,
                bytes,
            },
            HorcruxContent::Image(img) => Artifact::Image {
                name: h.name_hint,
                image: img,
            },
        })
        .collect()
}

/// Round trip 1 MiB of random bytes with n=5, t=3, losing two horcruxes.
#[test]
fn test_full_roundtrip_with_lost_shards() {
    let mut original = vec![0u8; 1024 * 1024];
    rand::rngs::OsRng.fill_bytes(&mut original);
    let original_hash = Sha256::digest(&original);

    let horcruxes = split_file(&original, "secret_plans.txt", 5, 3, false, None).unwrap();
    assert_eq!(horcruxes.len(), 5);

    // Disaster strikes: horcruxes 1 and 4 are gone (indices 0 and 3).
    let mut artifacts = to_artifacts(horcruxes);
    artifacts.remove(3);
    artifacts.remove(0);

    let report = bind(artifacts);
    assert_eq!(report.recovered.len(), 1);
    assert!(report.failed.is_empty());

    let restored = &report.recovered[0];
    assert_eq!(restored.original_filename, "secret_plans.txt");
    assert_eq!(Sha256::digest(&restored.plaintext), original_hash);
}

/// Split into stego PNGs and bind the PNGs back, through real PNG encoding.
#[test]
fn test_stego_roundtrip_through_png() {
    let original = b"This is a super secret diary entry.\n";

    let carrier = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(500, 500, Rgb([87, 120, 33])));
    // Go through actual PNG bytes, as a real carrier file would.
    let carrier = stego::load_from_bytes(&stego::to_png_bytes(&carrier).unwrap()).unwrap();

    let horcruxes = split_file(original, "diary.txt", 3, 2, false, Some(&carrier)).unwrap();
    assert_eq!(horcruxes.len(), 3);

    let mut artifacts = Vec::new();
    for horcrux in horcruxes {
        let image = match horcrux.content {
            HorcruxContent::Image(img) => img,
            HorcruxContent::Framed(_) => panic!("expected stego images"),
        };
        let png = stego::to_png_bytes(&image).unwrap();
        artifacts.push(Artifact::Image {
            name: horcrux.name_hint,
            image: stego::load_from_bytes(&png).unwrap(),
        });
    }

    let report = bind(artifacts);
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(report.recovered[0].plaintext, original);
}

/// A corrupted horcrux must never produce wrong plaintext: binding either
/// succeeds with the exact original or fails outright.
#[test]
fn test_corrupt_shard_safety() {
    let original = b"Launch codes: 12345";

    let horcruxes = split_file(original, "codes.txt", 3, 2, false, None).unwrap();
    let mut artifacts = to_artifacts(horcruxes);

    // Append garbage to the first horcrux, body included.
    if let Artifact::Framed { bytes, .. } = &mut artifacts[0] {
        bytes.extend_from_slice(b"MALICIOUS_DATA");
    }

    let report = bind(artifacts);
    match report.recovered.as_slice() {
        [] => assert!(!report.failed.is_empty(), "failure must be reported"),
        [restored] => assert_eq!(restored.plaintext, original),
        _ => panic!("one input file cannot restore to several"),
    }
}

/// Headerless (paranoiac) outputs must be rejected by the container parser.
#[test]
fn test_headerless_outputs_are_unparseable() {
    let horcruxes = split_file(b"paranoiac", "paranoiac.txt", 3, 2, true, None).unwrap();

    for horcrux in &horcruxes {
        let bytes = match &horcrux.content {
            HorcruxContent::Framed(bytes) => bytes.clone(),
            HorcruxContent::Image(_) => panic!("no carrier was used"),
        };
        assert!(Reader::new(Cursor::new(bytes)).is_err());
    }

    // The bind orchestrator consequently skips all of them.
    let report = bind(to_artifacts(horcruxes));
    assert!(report.recovered.is_empty());
    assert_eq!(report.skipped.len(), 3);
}

/// Shamir: any 3 of 5 shares recover the secret; 2 recover garbage.
#[test]
fn test_shamir_threshold_behaviour() {
    let secret = b"I solemnly swear that I am up to no good";
    assert_eq!(secret.len(), 40);

    let shares = shamir::split(secret, 5, 3).unwrap();

    let three = vec![shares[4].clone(), shares[0].clone(), shares[2].clone()];
    assert_eq!(shamir::combine(&three).unwrap(), secret);

    let two = vec![shares[1].clone(), shares[3].clone()];
    assert_ne!(shamir::combine(&two).unwrap(), secret);
}

/// A 2x2 carrier offers 12 payload bits; even one byte needs 40.
#[test]
fn test_stego_capacity_error() {
    let carrier = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([0, 0, 0])));
    let result = stego::embed(&carrier, b"A");
    assert!(matches!(
        result,
        Err(stego::StegoError::MessageTooLarge { .. })
    ));
}

/// The 1-based header index maps to the 0-based Reed-Solomon shard index.
/// Binding only the highest-indexed horcruxes exercises the conversion: an
/// off-by-one would ask for a shard index that does not exist.
#[test]
fn test_index_convention_roundtrip() {
    let original = b"indices are hard";
    let horcruxes = split_file(original, "f.txt", 3, 2, false, None).unwrap();

    let mut artifacts = to_artifacts(horcruxes);
    artifacts.remove(0); // keep header indices 2 and 3 only

    let report = bind(artifacts);
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(report.recovered[0].plaintext, original);
}

/// Horcruxes survive a trip through the filesystem, the way the CLI stores
/// them.
#[test]
fn test_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let original = b"written to disk and back";

    let horcruxes = split_file(original, "notes.txt", 4, 2, false, None).unwrap();
    for horcrux in horcruxes {
        let bytes = match horcrux.content {
            HorcruxContent::Framed(bytes) => bytes,
            HorcruxContent::Image(_) => unreachable!(),
        };
        std::fs::write(dir.path().join(&horcrux.name_hint), bytes).unwrap();
    }

    let mut artifacts = Vec::new();
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        artifacts.push(Artifact::Framed {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            bytes: std::fs::read(&path).unwrap(),
        });
    }
    assert_eq!(artifacts.len(), 4);

    let report = bind(artifacts);
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(report.recovered[0].original_filename, "notes.txt");
    assert_eq!(report.recovered[0].plaintext, original);
}

/// Two different splits never cross-contaminate, even in one bind run.
#[test]
fn test_mixed_groups_bind_independently() {
    let first = split_file(b"alpha", "alpha.txt", 3, 2, false, None).unwrap();
    let second = split_file(b"beta", "beta.txt", 3, 2, false, None).unwrap();

    let mut artifacts = to_artifacts(first);
    artifacts.extend(to_artifacts(second));

    let report = bind(artifacts);
    assert_eq!(report.recovered.len(), 2);
    assert_eq!(report.recovered[0].original_filename, "alpha.txt");
    assert_eq!(report.recovered[0].plaintext, b"alpha");
    assert_eq!(report.recovered[1].original_filename, "beta.txt");
    assert_eq!(report.recovered[1].plaintext, b"beta");
}
