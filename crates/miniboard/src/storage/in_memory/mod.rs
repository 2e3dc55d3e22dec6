//! In-memory storage backend.
//!
//! All records are held in ordered maps and are **lost when the process
//! exits** unless written out with [`save_to_jsonl`]. The JSONL backend is
//! this store plus a data file: [`load_from_jsonl`] builds it from disk and
//! repairs what it can, [`save_to_jsonl`] writes it back atomically.
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<Mutex<BoardInner>>`. Every trait method takes
//! the lock once for its whole duration, so a move reads and rewrites the
//! affected releases without another task interleaving.

mod inner;
mod jsonl;
mod sorting;
mod trait_impl;

use crate::storage::BoardStorage;
use inner::BoardInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{LoadWarning, RecordRef, load_from_jsonl, save_to_jsonl};

/// Thread-safe in-memory storage.
///
/// Implements [`BoardStorage`] via the trait implementation in
/// `trait_impl.rs`.
pub(crate) type InMemoryStorage = Arc<Mutex<BoardInner>>;

/// Create a new, empty in-memory board.
///
/// ```
/// use miniboard::storage::BoardStorage;
/// use miniboard::storage::in_memory::new_in_memory_storage;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let storage = new_in_memory_storage();
///     assert!(storage.list_users().await.unwrap().is_empty());
/// }
/// ```
#[must_use]
pub fn new_in_memory_storage() -> Box<dyn BoardStorage> {
    Box::new(Arc::new(Mutex::new(BoardInner::new())))
}
