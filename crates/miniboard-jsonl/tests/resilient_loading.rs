//! Integration tests for resilient loading from files on disk.

use miniboard_jsonl::{
    Error, JsonlReader, Warning, read_jsonl_resilient, write_jsonl_atomic,
};
use rstest::{fixture, rstest};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Card {
    id: u32,
    title: String,
    #[serde(default)]
    points: Option<u32>,
}

fn card(id: u32, title: &str) -> Card {
    Card {
        id,
        title: title.to_string(),
        points: None,
    }
}

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

fn file_with(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

#[rstest]
#[tokio::test]
async fn atomic_write_then_resilient_read(temp_dir: TempDir) {
    let path = temp_dir.path().join("cards.jsonl");
    let cards = vec![card(1, "first"), card(2, "second\nline")];

    write_jsonl_atomic(&path, &cards).await.unwrap();
    let (loaded, warnings) = read_jsonl_resilient::<Card, _>(&path).await.unwrap();

    assert_eq!(loaded, cards);
    assert!(warnings.is_empty());
}

#[tokio::test]
async fn corrupted_lines_become_warnings() {
    let file = file_with(
        b"{\"id\":1,\"title\":\"ok\"}\n\
          {\"id\":2,\"title\":\n\
          \n\
          {\"id\":4,\"title\":\"also ok\",\"points\":3}\n\
          [1,2,3]\n",
    );

    let (loaded, warnings) = read_jsonl_resilient::<Card, _>(file.path()).await.unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].points, Some(3));
    let lines: Vec<usize> = warnings.iter().map(Warning::line_number).collect();
    assert_eq!(lines, vec![2, 5]);
    assert!(warnings.iter().all(|w| w.kind() == "malformed_json"));
}

#[tokio::test]
async fn every_line_invalid_yields_nothing() {
    let file = file_with(b"a\nb\nc\n");

    let (loaded, warnings) = read_jsonl_resilient::<Card, _>(file.path()).await.unwrap();

    assert!(loaded.is_empty());
    assert_eq!(warnings.len(), 3);
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = read_jsonl_resilient::<Card, _>(dir.path().join("nope.jsonl")).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn strict_reader_stops_at_first_bad_line() {
    let file = file_with(b"{\"id\":1,\"title\":\"ok\"}\n{oops}\n{\"id\":3,\"title\":\"x\"}\n");
    let handle = tokio::fs::File::open(file.path()).await.unwrap();
    let mut reader = JsonlReader::new(handle);

    let result = reader.read_all::<Card>().await;

    match result {
        Err(Error::Line { line_number, .. }) => assert_eq!(line_number, 2),
        other => panic!("expected line error, got {other:?}"),
    }
}

#[rstest]
#[case(10)]
#[case(1_000)]
#[tokio::test]
async fn sparse_errors_in_larger_files(temp_dir: TempDir, #[case] count: u32) {
    let path = temp_dir.path().join("big.jsonl");
    let mut contents = String::new();
    for id in 1..=count {
        if id % 7 == 0 {
            contents.push_str("{\"id\":\n");
        } else {
            contents.push_str(&format!("{{\"id\":{id},\"title\":\"card {id}\"}}\n"));
        }
    }
    std::fs::write(&path, contents).unwrap();

    let (loaded, warnings) = read_jsonl_resilient::<Card, _>(&path).await.unwrap();

    let broken = (count / 7) as usize;
    assert_eq!(warnings.len(), broken);
    assert_eq!(loaded.len(), count as usize - broken);
    assert!(loaded.iter().all(|c| c.id % 7 != 0));
}
