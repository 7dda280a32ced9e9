//! # locbak - Local Incremental Backup
//!
//! Mirrors selected files and directories into a target tree, driven by a
//! small line-oriented directive file. Only new or changed files are copied;
//! nothing is ever deleted from the target.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod directive;
pub mod executor;
pub mod filesystem;
pub mod filter;
pub mod report;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use commands::backup::{execute, run};
pub use config::Config;
pub use filesystem::{FileSystem, LocalFileSystem};
pub use report::RunReport;
pub use types::{BackupError, FileEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
