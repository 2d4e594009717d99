//! Split command - break a file into encrypted horcruxes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use horcrux::stego;
use horcrux::{split_file, HorcruxContent};

use super::CommandExecutor;

/// Split a file into N encrypted fragments (horcruxes). You need T
/// fragments to recover the file; up to N−T can be lost.
///
/// With --carrier-image, each horcrux is hidden inside a copy of that image
/// and saved as a PNG. With --headerless, the outputs carry no metadata and
/// look like random noise; binding them is on you.
#[derive(Args, Debug)]
pub struct SplitCommand {
    /// File to split
    pub file: PathBuf,

    /// Total number of horcruxes to make
    #[arg(short = 'n', long = "shards")]
    pub shards: usize,

    /// Number of horcruxes required to resurrect the file
    #[arg(short = 't', long)]
    pub threshold: usize,

    /// Directory to output horcruxes (default: the input file's directory)
    #[arg(short = 'd', long)]
    pub destination: Option<PathBuf>,

    /// Image (png/jpg) to hide the horcruxes inside
    #[arg(short = 'i', long = "carrier-image")]
    pub carrier_image: Option<PathBuf>,

    /// Paranoiac mode: do not write metadata headers
    #[arg(long)]
    pub headerless: bool,
}

impl CommandExecutor for SplitCommand {
    fn execute(&self) -> Result<ExitCode> {
        let input = fs::read(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;

        let carrier = match &self.carrier_image {
            Some(path) => {
                let bytes = fs::read(path)
                    .with_context(|| format!("failed to read carrier image {}", path.display()))?;
                Some(
                    stego::load_from_bytes(&bytes)
                        .with_context(|| format!("failed to decode {}", path.display()))?,
                )
            }
            None => None,
        };

        let original_filename = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("input path has no file name")?;

        let destination = match &self.destination {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                dir.clone()
            }
            None => self
                .file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf(),
        };

        println!("Generating key and splitting...");

        let horcruxes = split_file(
            &input,
            &original_filename,
            self.shards,
            self.threshold,
            self.headerless,
            carrier.as_ref(),
        )?;

        for horcrux in horcruxes {
            let out_path = destination.join(&horcrux.name_hint);
            let bytes = match horcrux.content {
                HorcruxContent::Framed(bytes) => bytes,
                // PNG keeps the LSBs intact; a lossy format would destroy them.
                HorcruxContent::Image(img) => stego::to_png_bytes(&img)?,
            };
            fs::write(&out_path, bytes)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            println!("Created {}", horcrux.name_hint);
        }

        println!("Done! Keep your horcruxes safe.");
        Ok(ExitCode::SUCCESS)
    }
}
