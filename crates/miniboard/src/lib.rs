//! Mini Board - a small release-planning issue board.
//!
//! This crate provides both a CLI application and a library for tracking
//! issues in prioritized releases, with JSONL storage. The heart of it is
//! [`reorder`], which moves one issue into another's place while keeping
//! every release densely numbered.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod reorder;
pub mod storage;

// Application context and configuration
pub mod app;
pub mod config;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Output formatting for the CLI
pub mod output;
