use crate::error::TailError;
use crate::events::TailOutcome;
use log::{debug, warn};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Incremental reader for the active journal file
///
/// Each call reads only the bytes appended since the previous offset and
/// reports the last line in that batch which carries the marker token and
/// looks like a JSON object. Earlier matches in the same batch are dropped
/// so only the freshest state is forwarded.
#[derive(Debug, Clone)]
pub struct JournalTailer {
    marker: String,
}

impl JournalTailer {
    /// Create a tailer that forwards lines containing `marker`
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Check whether a single line should be forwarded
    ///
    /// The line must contain the marker, start with `{` and end with `}`
    /// once trailing whitespace is ignored. The content is not parsed.
    pub fn is_match(&self, line: &str) -> bool {
        line.starts_with('{') && line.trim_end().ends_with('}') && line.contains(&self.marker)
    }

    /// Read everything appended to `path` since `offset`
    ///
    /// Returns the offset to remember for the next call together with the
    /// last matching line, if any. When the file has not grown the content is
    /// not read at all. If the file is now shorter than `offset` it was
    /// truncated in place and is read again from the start.
    ///
    /// A final line without a terminator is still being written. It is
    /// neither filtered nor consumed: the returned offset stops just past the
    /// last terminator so the whole line is read on a later call.
    ///
    /// # Errors
    ///
    /// Any open, stat, seek or read failure is returned as a `TailError`. The
    /// caller should keep its previous offset in that case.
    pub fn read_new_lines(&self, path: &Path, offset: u64) -> Result<TailOutcome, TailError> {
        let size = std::fs::metadata(path)
            .map_err(|source| TailError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if size == offset {
            debug!("No new data in {}", path.display());
            return Ok(TailOutcome::unchanged(offset));
        }

        let start = if size < offset {
            warn!(
                "{} shrank from {} to {} bytes, reading from the start",
                path.display(),
                offset,
                size
            );
            0
        } else {
            offset
        };

        let mut file = File::open(path).map_err(|source| TailError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        file.seek(SeekFrom::Start(start))
            .map_err(|source| TailError::Seek {
                path: path.to_path_buf(),
                offset: start,
                source,
            })?;

        let mut buffer = Vec::new();
        let bytes_read = file
            .read_to_end(&mut buffer)
            .map_err(|source| TailError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let complete = complete_len(&buffer);
        let text = String::from_utf8_lossy(&buffer[..complete]);
        let matched = split_lines(&text)
            .filter(|line| self.is_match(line))
            .last()
            .map(str::to_string);

        let new_offset = start + complete as u64;
        debug!(
            "Read {} bytes from {} (offset {} -> {}, {} held back), match: {}",
            bytes_read,
            path.display(),
            start,
            new_offset,
            bytes_read - complete,
            matched.is_some()
        );

        Ok(TailOutcome {
            offset: new_offset,
            matched,
        })
    }
}

/// Length of the prefix of `bytes` that ends with a line terminator
fn complete_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .rposition(|b| *b == b'\n' || *b == b'\r')
        .map_or(0, |pos| pos + 1)
}

/// Split text on `\n`, `\r\n` or a lone `\r`
///
/// A trailing terminator does not produce an empty final line, but a final
/// line without a terminator is still returned.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\n', '\r']) {
            Some(pos) => {
                let line = &rest[..pos];
                let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
