//! Bind command - reconstruct original files from a directory of horcruxes.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Args;

use horcrux::{bind, stego, Artifact};

use super::CommandExecutor;

/// Scan a directory for .horcrux and .png files and attempt to reconstruct
/// the original files. You need at least T (threshold) valid horcruxes per
/// file to succeed.
#[derive(Args, Debug)]
pub struct BindCommand {
    /// Directory to scan for horcruxes (default: current directory)
    pub directory: Option<PathBuf>,

    /// Directory to write the resurrected files (default: the scanned one)
    #[arg(short = 'd', long)]
    pub destination: Option<PathBuf>,

    /// Overwrite existing files if present
    #[arg(long)]
    pub overwrite: bool,
}

impl CommandExecutor for BindCommand {
    fn execute(&self) -> Result<ExitCode> {
        let source = self
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        println!("Scanning for horcruxes in {}...", source.display());

        let mut artifacts = Vec::new();
        let entries = fs::read_dir(&source)
            .with_context(|| format!("failed to read directory {}", source.display()))?;

        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();

            match extension.as_str() {
                "png" => {
                    let bytes = fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    match stego::load_from_bytes(&bytes) {
                        Ok(image) => artifacts.push(Artifact::Image { name, image }),
                        Err(e) => eprintln!("Skipping invalid image {name}: {e}"),
                    }
                }
                "horcrux" => {
                    let bytes = fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    artifacts.push(Artifact::Framed { name, bytes });
                }
                _ => {}
            }
        }

        if artifacts.is_empty() {
            bail!("no horcrux files found in {}", source.display());
        }

        let report = bind(artifacts);

        for skipped in &report.skipped {
            eprintln!("Skipped {}: {}", skipped.name, skipped.reason);
        }

        let destination = self.destination.clone().unwrap_or(source);
        for recovered in &report.recovered {
            let out_path = destination.join(&recovered.original_filename);
            if out_path.exists() && !self.overwrite {
                eprintln!(
                    "File {} already exists. Use --overwrite to replace it.",
                    out_path.display()
                );
                continue;
            }
            fs::write(&out_path, &recovered.plaintext)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            println!("Successfully resurrected: {}", out_path.display());
        }

        let mut integrity_failure = false;
        let mut insufficient = false;
        for failed in &report.failed {
            eprintln!(
                "Could not restore {}: {}",
                failed.original_filename, failed.failure
            );
            if failed.failure.is_integrity_failure() {
                integrity_failure = true;
            } else {
                insufficient = true;
            }
        }

        // Corruption beats incompleteness when picking the exit code.
        if integrity_failure {
            Ok(ExitCode::from(2))
        } else if insufficient {
            Ok(ExitCode::from(3))
        } else if report.recovered.is_empty() {
            bail!("no valid horcruxes found in the scanned files");
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}
