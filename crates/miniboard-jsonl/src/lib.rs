//! Async JSONL (JSON Lines) support for the Mini Board data file.
//!
//! The crate covers the three things the board store needs from a line-based
//! format: reading records with line tracking, loading a file resiliently
//! (bad lines become [`Warning`]s instead of errors), and replacing a file
//! atomically so an interrupted save never leaves a half-written board.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod stream;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::JsonlReader;
pub use stream::read_jsonl_resilient;
pub use warning::{Warning, WarningCollector};
pub use writer::JsonlWriter;
