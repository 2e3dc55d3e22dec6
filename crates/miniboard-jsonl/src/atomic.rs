//! Crash-safe replacement of JSONL files.
//!
//! Data is written to a sibling temporary file, flushed, then renamed over the
//! target. A rename within one filesystem is atomic on POSIX, so readers see
//! either the old file or the complete new one.

use crate::{JsonlWriter, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Atomically replaces `path` with one JSON line per value.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed. The
/// original file is left untouched in that case.
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Like [`write_jsonl_atomic`] but takes any iterator of values.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Err(err) = write_temp(&temp_path, values).await {
        // Best effort: a stale temp file is harmless, the target is intact.
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(err);
    }

    tokio::fs::rename(&temp_path, path).await?;
    tracing::trace!(path = %path.display(), "replaced jsonl file");
    Ok(())
}

/// `board.jsonl` becomes `board.jsonl.tmp`; `board` becomes `board.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    path.with_extension(extension)
}

async fn write_temp<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    writer.into_inner().into_inner().sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Row {
        id: u32,
    }

    #[test]
    fn temp_path_appends_tmp_to_extension() {
        assert_eq!(
            temp_path_for(Path::new("/data/board.jsonl")),
            Path::new("/data/board.jsonl.tmp")
        );
        assert_eq!(temp_path_for(Path::new("board")), Path::new("board.tmp"));
    }

    #[tokio::test]
    async fn writes_and_replaces_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.jsonl");
        std::fs::write(&path, "old contents\n").unwrap();

        write_jsonl_atomic(&path, &[Row { id: 1 }, Row { id: 2 }])
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"id\":1}\n{\"id\":2}\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn empty_input_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.jsonl");

        write_jsonl_atomic_iter(&path, std::iter::empty::<Row>())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_directory_leaves_no_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("board.jsonl");

        let result = write_jsonl_atomic(&path, &[Row { id: 1 }]).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
