//! Depth-first source walker with exclude pruning

use crate::diff::dir_match_key;
use crate::filesystem::{FileSystem, WalkControl};
use crate::filter::ExcludeSet;
use crate::report::Halt;
use crate::types::{BackupError, FileEntry};
use camino::Utf8Path;

/// Receives the entries of a source walk
pub trait SourceVisitor {
    /// Exclude snapshot used to prune directories
    fn excludes(&self) -> &ExcludeSet;

    /// A directory (root included) passed the exclude check
    fn enter_dir(&mut self, dir: &FileEntry);

    /// A non-directory entry; symlinks arrive here too
    fn visit_file(&mut self, file: FileEntry) -> Result<(), Halt>;

    /// An entry could not be read
    fn walk_error(&mut self, err: BackupError) -> Result<(), Halt>;
}

/// Walk a source directory, pruning excluded subtrees
///
/// Every directory, the root included, is tested against the exclude
/// patterns with a trailing separator appended; a match skips the whole
/// subtree. Files are handed to the visitor unfiltered.
///
/// # Errors
/// Returns the first [`Halt`] raised by the visitor; the walk stops there.
pub fn walk_source<V>(fs: &dyn FileSystem, root: &Utf8Path, visitor: &mut V) -> Result<(), Halt>
where
    V: SourceVisitor + ?Sized,
{
    let mut halted = None;

    fs.walk_dir(root, &mut |item| {
        let step = match item {
            Ok(entry) if entry.is_dir => {
                if visitor.excludes().matches(&dir_match_key(&entry.path)) {
                    tracing::debug!(path = %entry.path, "directory excluded");
                    return WalkControl::SkipDir;
                }
                visitor.enter_dir(&entry);
                Ok(())
            }
            Ok(entry) => visitor.visit_file(entry),
            Err(err) => visitor.walk_error(err),
        };

        match step {
            Ok(()) => WalkControl::Continue,
            Err(halt) => {
                halted = Some(halt);
                WalkControl::Stop
            }
        }
    });

    match halted {
        Some(halt) => Err(halt),
        None => Ok(()),
    }
}
