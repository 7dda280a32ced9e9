//! Filesystem capability consumed by the backup engine
//!
//! The engine never touches `std::fs` directly. It is handed one
//! [`FileSystem`] per run: [`LocalFileSystem`] in production, an in-memory
//! fake in tests.

mod local;

pub use local::LocalFileSystem;

use crate::types::{BackupError, FileEntry};
use camino::Utf8Path;

/// Permission bits for destination directories
pub const DEST_DIR_MODE: u32 = 0o770;

/// Permission bits for copied files: read-write for owner and group
pub const DEST_FILE_MODE: u32 = 0o660;

/// What a walk visitor wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    /// Do not descend into the directory just visited
    SkipDir,
    /// Abandon the walk
    Stop,
}

/// One step of a directory walk
pub type WalkItem = Result<FileEntry, BackupError>;

/// Visitor invoked for every entry of a walk, the root included
pub type WalkVisitor<'a> = dyn FnMut(WalkItem) -> WalkControl + 'a;

/// Filesystem operations used by the backup engine
pub trait FileSystem {
    /// Describe `path` without following symbolic links
    fn stat(&self, path: &Utf8Path) -> Result<FileEntry, BackupError>;

    /// Depth-first walk of `root`, parents before their contents
    fn walk_dir(&self, root: &Utf8Path, visit: &mut WalkVisitor<'_>);

    fn chmod(&self, path: &Utf8Path, mode: u32) -> Result<(), BackupError>;

    /// Create `path` and any missing parents
    fn mkdir_all(&self, path: &Utf8Path, mode: u32) -> Result<(), BackupError>;

    /// Copy file content, then give `dest` the source mtime and
    /// [`DEST_FILE_MODE`]. Returns the number of bytes written.
    fn copy_file(&self, src: &Utf8Path, dest: &Utf8Path, src_entry: &FileEntry)
        -> Result<u64, BackupError>;
}
