//! Command implementations that work outside an initialized board.

pub mod init;
