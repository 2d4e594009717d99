//! Parses a horcrux container back into header and body.

use std::io::{BufRead, BufReader, Read};

use super::{FormatError, Header, BODY_MARKER, HEADER_MARKER, MARKER_SCAN_LIMIT};

/// Separates the metadata header from the binary body of a horcrux stream.
///
/// Parsing consumes exactly the text portion; the struct itself is the body
/// reader, positioned at the first byte after the `-- BODY --` line. The
/// underlying `BufReader` re-exposes whatever it buffered during the line
/// scan, so no body bytes are lost.
pub struct Reader<R: Read> {
    header: Header,
    body: BufReader<R>,
}

impl<R: Read> Reader<R> {
    /// Attempts to parse a horcrux stream.
    ///
    /// Fails on headerless files, files missing either marker within bounds,
    /// malformed JSON, and headers that do not validate.
    pub fn new(source: R) -> Result<Self, FormatError> {
        let mut buffered = BufReader::new(source);

        // Scan for the header marker, bounded so garbage or headerless
        // files are rejected without reading them to the end.
        let mut line = Vec::new();
        let mut found = false;
        for _ in 0..MARKER_SCAN_LIMIT {
            if read_line(&mut buffered, &mut line)? == 0 {
                break;
            }
            if trimmed(&line) == Some(HEADER_MARKER) {
                found = true;
                break;
            }
        }
        if !found {
            return Err(FormatError::MissingMarker(HEADER_MARKER));
        }

        // Collect JSON lines until the body marker.
        let mut header_json = Vec::new();
        loop {
            if read_line(&mut buffered, &mut line)? == 0 {
                return Err(FormatError::MissingMarker(BODY_MARKER));
            }
            if trimmed(&line) == Some(BODY_MARKER) {
                break;
            }
            header_json.extend_from_slice(&line);
        }

        let header: Header = serde_json::from_slice(&header_json)?;
        header.validate()?;

        Ok(Self {
            header,
            body: buffered,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Reads the remaining body bytes and returns them with the header.
    pub fn into_parts(mut self) -> Result<(Header, Vec<u8>), FormatError> {
        let mut body = Vec::new();
        self.body.read_to_end(&mut body)?;
        Ok((self.header, body))
    }
}

impl<R: Read> Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.body.read(buf)
    }
}

/// Reads one `\n`-terminated line (terminator included) into `line`,
/// clearing it first. Returns the number of bytes read; 0 means end of
/// stream.
fn read_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> std::io::Result<usize> {
    line.clear();
    reader.read_until(b'\n', line)
}

/// The line as trimmed UTF-8, or `None` for binary junk.
fn trimmed(line: &[u8]) -> Option<&str> {
    std::str::from_utf8(line).ok().map(str::trim)
}
