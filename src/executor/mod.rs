//! Executor module for file copy strategies

pub mod copy;

pub use copy::{copy_file_atomic, copy_file_native};

use crate::types::{BackupError, FileEntry};
use camino::Utf8Path;

/// How file content reaches the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CopyMethod {
    /// Stream into `<dest>.part`, then rename over the destination
    #[default]
    Stream,
    /// Let the OS copy the file (`CopyFileExW`, `copy_file_range`, ...)
    Native,
}

impl CopyMethod {
    /// Preferred method for the platform this binary was built for
    pub fn for_platform() -> Self {
        if cfg!(windows) {
            CopyMethod::Native
        } else {
            CopyMethod::Stream
        }
    }

    /// Copy `src` to `dest` with this method
    pub fn copy(self, src: &Utf8Path, dest: &Utf8Path, src_entry: &FileEntry) -> Result<u64, BackupError> {
        match self {
            CopyMethod::Stream => copy_file_atomic(src, dest, src_entry),
            CopyMethod::Native => copy_file_native(src, dest, src_entry),
        }
    }
}
