//! Resilient streaming of JSONL records.
//!
//! Malformed lines are reported to a [`WarningCollector`] and skipped; only
//! records that decode cleanly are yielded.

use crate::reader::{JsonlReader, RawLine};
use crate::warning::{Warning, WarningCollector};
use crate::Result;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncRead;

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Turns the reader into a stream of successfully decoded records.
    ///
    /// Every skipped line is recorded in `warnings`. An I/O error ends the
    /// stream after recording a [`Warning::SkippedLine`].
    pub fn stream_resilient<T>(self, warnings: WarningCollector) -> impl Stream<Item = T>
    where
        T: DeserializeOwned,
    {
        stream::unfold((self, warnings), |(mut reader, warnings)| async move {
            loop {
                match reader.next_raw_line().await {
                    Ok(None) => return None,
                    Ok(Some(RawLine::InvalidUtf8)) => {
                        warnings.add(Warning::InvalidUtf8 {
                            line_number: reader.line_number(),
                        });
                    }
                    Ok(Some(RawLine::Text(line))) => match serde_json::from_str::<T>(&line) {
                        Ok(value) => return Some((value, (reader, warnings))),
                        Err(err) => warnings.add(Warning::MalformedJson {
                            line_number: reader.line_number(),
                            error: err.to_string(),
                        }),
                    },
                    Err(err) => {
                        warnings.add(Warning::SkippedLine {
                            line_number: reader.line_number() + 1,
                            reason: err.to_string(),
                        });
                        return None;
                    }
                }
            }
        })
    }
}

/// Loads every decodable record from a JSONL file.
///
/// Returns the records in file order together with the warnings for the
/// lines that were skipped.
///
/// # Errors
///
/// Fails only if the file cannot be opened. Problems inside the file are
/// returned as warnings.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let collector = WarningCollector::new();

    let values: Vec<T> = JsonlReader::new(file)
        .stream_resilient(collector.clone())
        .collect()
        .await;

    let warnings = collector.into_warnings();
    if !warnings.is_empty() {
        tracing::debug!(
            path = %path.as_ref().display(),
            count = warnings.len(),
            "skipped lines while loading"
        );
    }
    Ok((values, warnings))
}
