//! Real filesystem implementation

use super::{FileSystem, WalkControl, WalkItem, WalkVisitor};
use crate::executor::CopyMethod;
use crate::types::{BackupError, FileEntry};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

/// [`FileSystem`] backed by `std::fs` and `walkdir`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem {
    copy_method: CopyMethod,
}

impl LocalFileSystem {
    pub fn new(copy_method: CopyMethod) -> Self {
        Self { copy_method }
    }
}

impl FileSystem for LocalFileSystem {
    fn stat(&self, path: &Utf8Path) -> Result<FileEntry, BackupError> {
        let metadata = fs::symlink_metadata(path).map_err(|e| BackupError::at(path, e))?;
        FileEntry::from_metadata(path, &metadata).map_err(|e| BackupError::at(path, e))
    }

    fn walk_dir(&self, root: &Utf8Path, visit: &mut WalkVisitor<'_>) {
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(result) = walker.next() {
            let item = result.map_err(walk_error).and_then(entry_from_walkdir);
            let is_dir = matches!(&item, Ok(entry) if entry.is_dir);

            match visit(item) {
                WalkControl::Continue => {}
                WalkControl::SkipDir => {
                    if is_dir {
                        walker.skip_current_dir();
                    }
                }
                WalkControl::Stop => break,
            }
        }
    }

    fn chmod(&self, path: &Utf8Path, mode: u32) -> Result<(), BackupError> {
        fs::set_permissions(path, permissions_from_mode(path, mode)?)
            .map_err(|e| BackupError::at(path, e))
    }

    fn mkdir_all(&self, path: &Utf8Path, mode: u32) -> Result<(), BackupError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path).map_err(|e| BackupError::at(path, e))
    }

    fn copy_file(
        &self,
        src: &Utf8Path,
        dest: &Utf8Path,
        src_entry: &FileEntry,
    ) -> Result<u64, BackupError> {
        self.copy_method.copy(src, dest, src_entry)
    }
}

#[cfg(unix)]
fn permissions_from_mode(_path: &Utf8Path, mode: u32) -> Result<fs::Permissions, BackupError> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn permissions_from_mode(path: &Utf8Path, mode: u32) -> Result<fs::Permissions, BackupError> {
    // Only the read-only flag exists here; derive it from the owner write bit.
    let mut permissions = fs::metadata(path)
        .map_err(|e| BackupError::at(path, e))?
        .permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    Ok(permissions)
}

fn entry_from_walkdir(entry: walkdir::DirEntry) -> WalkItem {
    let metadata = entry.metadata().map_err(walk_error)?;
    let path = Utf8PathBuf::from_path_buf(entry.into_path()).map_err(BackupError::NonUtf8Path)?;
    FileEntry::from_metadata(&path, &metadata).map_err(|e| BackupError::at(path, e))
}

fn walk_error(err: walkdir::Error) -> BackupError {
    let path = err.path().and_then(Utf8Path::from_path).map(Utf8Path::to_path_buf);
    match (path, err.into_io_error()) {
        (Some(path), Some(io)) => BackupError::at(path, io),
        (_, Some(io)) => BackupError::Io(io),
        (_, None) => BackupError::Io(std::io::Error::other("filesystem loop detected")),
    }
}
