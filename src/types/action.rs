//! Per-file outcomes and per-source counters

use serde::Serialize;
use std::fmt;

/// Why the sync policy left a file alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Symbolic links are never followed or copied
    Symlink,
    /// Larger than the active `!>` threshold
    TooLarge,
    /// Modified before the active `!@` threshold
    TooOld,
    /// Path matched an exclude pattern
    Excluded,
    /// Destination is at least as new as the source
    UpToDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::Symlink => "symlink",
            SkipReason::TooLarge => "too large",
            SkipReason::TooOld => "too old",
            SkipReason::Excluded => "excluded",
            SkipReason::UpToDate => "up to date",
        };
        f.write_str(label)
    }
}

/// Result of running the sync policy on one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// File was copied, carrying the number of bytes written
    Copied(u64),
    /// Dry run: file would have been copied
    WouldCopy,
    /// File was not eligible
    Skipped(SkipReason),
    /// A per-file error was recorded
    Failed,
}

impl FileOutcome {
    pub fn is_copy(&self) -> bool {
        matches!(self, FileOutcome::Copied(_) | FileOutcome::WouldCopy)
    }
}

/// Counters for one source argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub dirs: u64,
    pub files: u64,
    pub copied: u64,
    /// Bytes written by real copies (zero in a dry run)
    pub bytes: u64,
}
