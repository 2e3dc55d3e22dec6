//! JSONL writing operations.

use crate::Result;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Async writer for JSONL (JSON Lines) data.
///
/// Each value is serialized compactly onto its own line. Output is buffered;
/// call [`flush`](Self::flush) before dropping the writer.
pub struct JsonlWriter<W> {
    writer: BufWriter<W>,
    lines_written: usize,
}

impl<W: AsyncWrite + Unpin> JsonlWriter<W> {
    /// Creates a new `JsonlWriter` wrapping the given async writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines_written: 0,
        }
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Serializes one value and writes it followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_vec(value)?;
        self.writer.write_all(&json).await?;
        self.writer.write_all(b"\n").await?;
        self.lines_written += 1;
        Ok(())
    }

    /// Writes every value produced by `values`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first serialization or write error.
    pub async fn write_all<T, I>(&mut self, values: I) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.write(&value).await?;
        }
        Ok(())
    }

    /// Flushes buffered output to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying buffered writer.
    ///
    /// This does not flush.
    #[must_use]
    pub fn into_inner(self) -> BufWriter<W> {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row<'a> {
        id: u32,
        name: &'a str,
    }

    #[tokio::test]
    async fn writes_one_line_per_value() {
        let mut writer = JsonlWriter::new(Vec::new());
        writer
            .write_all([Row { id: 1, name: "a" }, Row { id: 2, name: "b" }])
            .await
            .unwrap();
        writer.flush().await.unwrap();
        assert_eq!(writer.lines_written(), 2);

        let bytes = writer.into_inner().into_inner();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n"
        );
    }

    #[tokio::test]
    async fn embedded_newlines_stay_on_one_line() {
        let mut writer = JsonlWriter::new(Vec::new());
        writer
            .write(&Row {
                id: 1,
                name: "two\nlines",
            })
            .await
            .unwrap();
        writer.flush().await.unwrap();

        let text = String::from_utf8(writer.into_inner().into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
