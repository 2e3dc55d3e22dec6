//! JSONL reading operations.
//!
//! [`JsonlReader`] reads one JSON document per line and keeps a 1-based line
//! counter so callers can point at the exact line that failed to decode.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// A raw line pulled from the underlying reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    /// A non-blank line, trimmed of surrounding whitespace.
    Text(String),
    /// A line that was not valid UTF-8.
    InvalidUtf8,
}

/// Async reader for JSONL (JSON Lines) data.
///
/// Blank lines are skipped but still counted, so line numbers reported in
/// errors always match what an editor shows.
///
/// # Examples
///
/// ```no_run
/// use miniboard_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("board.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(value) = reader.read_line::<serde_json::Value>().await? {
///     println!("{value}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// Line number of the last line consumed (0 before the first read).
    line_number: usize,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Returns the 1-based number of the last line read, or 0 before any read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line without decoding it.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying reader fails.
    pub async fn next_raw_line(&mut self) -> Result<Option<RawLine>> {
        loop {
            self.buffer.clear();
            let read = self.reader.read_until(b'\n', &mut self.buffer).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let Ok(text) = std::str::from_utf8(&self.buffer) else {
                return Ok(Some(RawLine::InvalidUtf8));
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(RawLine::Text(trimmed.to_string())));
        }
    }

    /// Reads and decodes the next record.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the underlying reader fails
    /// - [`Error::Line`] if the line is not valid JSON for `T`
    /// - [`Error::InvalidFormat`] if the line is not valid UTF-8
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.next_raw_line().await? {
            None => Ok(None),
            Some(RawLine::InvalidUtf8) => Err(Error::InvalidFormat(format!(
                "line {} is not valid UTF-8",
                self.line_number
            ))),
            Some(RawLine::Text(line)) => serde_json::from_str(&line)
                .map(Some)
                .map_err(|source| Error::Line {
                    line_number: self.line_number,
                    source,
                }),
        }
    }

    /// Reads every remaining record, failing on the first bad line.
    ///
    /// # Errors
    ///
    /// See [`read_line`](Self::read_line).
    pub async fn read_all<T: DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let mut values = Vec::new();
        while let Some(value) = self.read_line().await? {
            values.push(value);
        }
        Ok(values)
    }

    /// Consumes the reader, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}
