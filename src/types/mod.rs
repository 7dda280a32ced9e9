//! Core type definitions for locbak

mod action;
mod entry;
mod error;

pub use action::{Counts, FileOutcome, SkipReason};
pub use entry::FileEntry;
pub use error::BackupError;
