//! Serializes a horcrux into its on-disk container.

use std::io::Write as IoWrite;

use super::{FormatError, Header, BODY_MARKER, HEADER_MARKER};

/// Human-readable introduction at the top of every standard horcrux file.
/// Parameterized by (total, index, remaining) where remaining is
/// threshold − 1: how many more horcruxes the finder of this one needs.
fn banner(total: usize, index: usize, remaining: usize) -> String {
    format!(
        "# THIS FILE IS A HORCRUX.\n\
         # IT IS ONE OF {total} HORCRUXES THAT EACH CONTAIN PART OF AN ORIGINAL FILE.\n\
         # THIS IS HORCRUX NUMBER {index}.\n\
         # IN ORDER TO RESURRECT THE ORIGINAL FILE YOU MUST FIND THE OTHER {remaining} HORCRUX(ES)\n\
         # AND BIND THEM WITH THE HORCRUX PROGRAM.\n"
    )
}

/// Writes a single horcrux file to an underlying stream.
pub struct Writer<W: IoWrite> {
    inner: W,
}

impl<W: IoWrite> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Serializes the header and body.
    ///
    /// With `headerless` set (paranoiac mode) the banner, markers, and JSON
    /// are all skipped; the file is raw body bytes that read as noise.
    pub fn write(
        &mut self,
        header: &Header,
        body: &[u8],
        headerless: bool,
    ) -> Result<(), FormatError> {
        if !headerless {
            header.validate()?;

            let intro = banner(header.total, header.index, header.threshold - 1);
            self.inner.write_all(intro.as_bytes())?;

            writeln!(self.inner, "{HEADER_MARKER}")?;

            let header_json = serde_json::to_vec(header)?;
            self.inner.write_all(&header_json)?;
            writeln!(self.inner)?;

            writeln!(self.inner, "{BODY_MARKER}")?;
        }

        self.inner.write_all(body)?;
        Ok(())
    }
}
