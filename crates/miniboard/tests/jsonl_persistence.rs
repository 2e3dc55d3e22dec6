//! Integration tests for JSONL persistence.
//!
//! These tests cover the data file end to end: saving a board and loading it
//! back, and loading files that were edited by hand or written by older
//! tools. Problems inside the file never fail the load; they come back as
//! [`LoadWarning`]s and the rest of the board stays usable.

use chrono::NaiveDate;
use miniboard::domain::{
    EntityKind, IssueId, IssueType, NewComment, NewIssue, NewProject, NewRelease, NewUser,
    ReleaseId, UserId,
};
use miniboard::reorder::verify_density;
use miniboard::storage::in_memory::{
    LoadWarning, RecordRef, load_from_jsonl, new_in_memory_storage, save_to_jsonl,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// =============================================================================
// Test Helpers
// =============================================================================

const STAMP: &str = "2024-01-01T00:00:00Z";

fn create_temp_jsonl_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for line in lines {
        writeln!(file, "{line}").expect("Failed to write to temp file");
    }
    file.flush().expect("Failed to flush temp file");
    file
}

fn user_json(id: u64, username: &str) -> String {
    format!(r#"{{"kind":"user","id":{id},"username":"{username}","created_at":"{STAMP}"}}"#)
}

fn project_json(id: u64, key: &str) -> String {
    format!(
        r#"{{"kind":"project","id":{id},"key":"{key}","name":"Project {key}","description":"","created_at":"{STAMP}"}}"#
    )
}

fn release_json(id: u64, due: &str) -> String {
    format!(
        r#"{{"kind":"release","id":{id},"name":"Release {id}","due_date":"{due}","created_at":"{STAMP}"}}"#
    )
}

fn issue_json(id: u64, release: u64, priority: u32, title: &str) -> String {
    format!(
        r#"{{"kind":"issue","id":{id},"project_id":1,"release_id":{release},"author_id":1,"priority":{priority},"type":"bug","status":"todo","points":2,"title":"{title}","description":"","created_at":"{STAMP}","updated_at":"{STAMP}"}}"#
    )
}

fn comment_json(id: u64, issue: u64) -> String {
    format!(
        r#"{{"kind":"comment","id":{id},"issue_id":{issue},"author_id":1,"content":"note","created_at":"{STAMP}"}}"#
    )
}

fn header() -> Vec<String> {
    vec![
        user_json(1, "alice"),
        project_json(1, "MB"),
        release_json(1, "2030-06-01"),
        release_json(2, "2030-01-01"),
    ]
}

// =============================================================================
// Round Trip
// =============================================================================

#[tokio::test]
async fn saved_board_loads_without_warnings() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("board.jsonl");

    let mut storage = new_in_memory_storage();
    let author = storage
        .create_user(NewUser {
            username: "alice".to_string(),
        })
        .await
        .unwrap();
    let project = storage
        .create_project(NewProject {
            key: "MB".to_string(),
            name: "Mini Board".to_string(),
            description: "Release planning".to_string(),
        })
        .await
        .unwrap();
    let release = storage
        .create_release(NewRelease {
            name: "1.0".to_string(),
            due_date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
        })
        .await
        .unwrap();
    for title in ["a", "b", "c"] {
        storage
            .create_issue(NewIssue {
                project_id: project.id,
                release_id: release.id,
                author_id: author.id,
                issue_type: IssueType::Bug,
                points: 3,
                title: title.to_string(),
                description: "line one\nline two".to_string(),
            })
            .await
            .unwrap();
    }
    storage
        .add_comment(NewComment {
            issue_id: IssueId::new(2),
            author_id: author.id,
            content: "needs a test".to_string(),
        })
        .await
        .unwrap();
    storage
        .move_issue(IssueId::new(3), IssueId::new(1))
        .await
        .unwrap();

    save_to_jsonl(storage.as_ref(), &path).await.unwrap();
    let (loaded, warnings) = load_from_jsonl(&path).await.unwrap();

    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(
        loaded.export_all().await.unwrap(),
        storage.export_all().await.unwrap()
    );
}

#[tokio::test]
async fn data_file_has_one_tagged_record_per_line() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("board.jsonl");
    let file = create_temp_jsonl_file(&[header(), vec![issue_json(1, 1, 0, "a")]].concat());

    let (storage, _) = load_from_jsonl(file.path()).await.unwrap();
    save_to_jsonl(storage.as_ref(), &path).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains(r#""kind":"user""#));
    assert!(lines[4].contains(r#""kind":"issue""#));
    assert!(lines[4].contains(r#""type":"bug""#));
}

// =============================================================================
// Repairs
// =============================================================================

#[tokio::test]
async fn one_based_and_gapped_priorities_are_renumbered() {
    let lines = [
        header(),
        vec![
            issue_json(1, 1, 1, "a"),
            issue_json(2, 1, 2, "b"),
            issue_json(3, 2, 5, "c"),
            issue_json(4, 2, 0, "d"),
        ],
    ]
    .concat();
    let file = create_temp_jsonl_file(&lines);

    let (storage, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert_eq!(
        warnings,
        vec![
            LoadWarning::PriorityRepaired {
                release_id: ReleaseId::new(1)
            },
            LoadWarning::PriorityRepaired {
                release_id: ReleaseId::new(2)
            },
        ]
    );
    let snapshot = storage.export_all().await.unwrap();
    verify_density(&snapshot.issues).unwrap();

    let priority = |id: u64| {
        snapshot
            .issues
            .iter()
            .find(|i| i.id == IssueId::new(id))
            .map(|i| i.priority)
    };
    assert_eq!(priority(1), Some(0));
    assert_eq!(priority(2), Some(1));
    assert_eq!(priority(4), Some(0));
    assert_eq!(priority(3), Some(1));
}

#[tokio::test]
async fn damaged_file_loads_what_it_can() {
    let lines = [
        header(),
        vec![
            issue_json(1, 1, 0, "kept"),
            "{ not json".to_string(),
            issue_json(1, 1, 1, "duplicate"),
            issue_json(2, 9, 0, "no such release"),
            issue_json(3, 1, 1, " "),
            comment_json(1, 2),
            comment_json(2, 1),
            user_json(2, "alice"),
        ],
    ]
    .concat();
    let file = create_temp_jsonl_file(&lines);

    let (storage, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert!(
        warnings
            .iter()
            .any(|w| matches!(w, LoadWarning::MalformedJson { line_number: 6, .. }))
    );
    assert!(warnings.contains(&LoadWarning::DuplicateId {
        record: RecordRef {
            kind: EntityKind::Issue,
            id: 1
        }
    }));
    assert!(warnings.contains(&LoadWarning::DanglingReference {
        record: RecordRef {
            kind: EntityKind::Issue,
            id: 2
        },
        missing: RecordRef {
            kind: EntityKind::Release,
            id: 9
        },
    }));
    assert!(warnings.iter().any(|w| matches!(
        w,
        LoadWarning::InvalidRecord { record, .. } if *record == RecordRef { kind: EntityKind::Issue, id: 3 }
    )));
    assert!(warnings.iter().any(|w| matches!(
        w,
        LoadWarning::InvalidRecord { record, .. } if *record == RecordRef { kind: EntityKind::User, id: 2 }
    )));

    let snapshot = storage.export_all().await.unwrap();
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.issues.len(), 1);
    assert_eq!(snapshot.issues[0].title, "kept");
    assert_eq!(snapshot.comments.len(), 1);
    assert_eq!(snapshot.comments[0].issue_id, IssueId::new(1));
}

#[tokio::test]
async fn repaired_board_is_usable_and_saves_clean() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("board.jsonl");
    let lines = [
        header(),
        vec![issue_json(4, 1, 3, "a"), issue_json(7, 1, 8, "b")],
    ]
    .concat();
    let file = create_temp_jsonl_file(&lines);

    let (mut storage, warnings) = load_from_jsonl(file.path()).await.unwrap();
    assert_eq!(warnings.len(), 1);

    let created = storage
        .create_issue(NewIssue {
            project_id: miniboard::domain::ProjectId::new(1),
            release_id: ReleaseId::new(1),
            author_id: UserId::new(1),
            issue_type: IssueType::Feature,
            points: 1,
            title: "new".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, IssueId::new(8));
    assert_eq!(created.priority, 2);

    save_to_jsonl(storage.as_ref(), &path).await.unwrap();
    let (_, warnings) = load_from_jsonl(&path).await.unwrap();
    assert!(warnings.is_empty());
}

#[tokio::test]
async fn lower_case_project_keys_are_upper_cased_on_load() {
    let lines = vec![
        user_json(1, "alice"),
        project_json(1, "mb"),
        project_json(2, "MB"),
    ];
    let file = create_temp_jsonl_file(&lines);

    let (storage, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert_eq!(
        warnings,
        vec![LoadWarning::InvalidRecord {
            record: RecordRef {
                kind: EntityKind::Project,
                id: 2
            },
            error: "project key 'MB' is already in use".to_string(),
        }]
    );
    let projects = storage.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].key, "MB");
}

#[tokio::test]
async fn empty_file_is_an_empty_board() {
    let file = create_temp_jsonl_file(&[]);

    let (storage, warnings) = load_from_jsonl(file.path()).await.unwrap();

    assert!(warnings.is_empty());
    assert!(storage.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();

    let result = load_from_jsonl(&temp_dir.path().join("nope.jsonl")).await;

    assert!(result.is_err());
}
