//! File copy implementations

use crate::filesystem::DEST_FILE_MODE;
use crate::types::{BackupError, FileEntry};
use camino::Utf8Path;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 128 * 1024;

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Write to a uniquely named temporary file next to `dest`
/// 2. Flush and sync to disk
/// 3. Set destination metadata (mode 0o660, source mtime)
/// 4. Rename over the final destination
///
/// The temporary file is created exclusively, so it never replaces an
/// existing sibling of `dest`. The destination's parent directory must
/// already exist. On failure the temporary file is removed and any previous
/// destination is left untouched.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(BackupError::Copy)` - IO failure, with both paths attached
///
/// # Example
/// ```no_run
/// use locbak::executor::copy_file_atomic;
/// use locbak::filesystem::{FileSystem, LocalFileSystem};
/// use camino::Utf8Path;
///
/// let src = Utf8Path::new("notes.txt");
/// let entry = LocalFileSystem::default().stat(src)?;
/// let bytes = copy_file_atomic(src, Utf8Path::new("backup/notes.txt"), &entry)?;
/// # Ok::<(), locbak::BackupError>(())
/// ```
pub fn copy_file_atomic(
    src: &Utf8Path,
    dest: &Utf8Path,
    src_entry: &FileEntry,
) -> Result<u64, BackupError> {
    let copy = || -> std::io::Result<u64> {
        let mut src_file = File::open(src)?;

        // Dropping `part` on any early return deletes it.
        let mut part = tempfile::Builder::new()
            .prefix(".locbak-")
            .suffix(".part")
            .tempfile_in(parent_dir(dest))?;

        let bytes = stream(&mut src_file, part.as_file_mut())?;
        part.as_file().sync_all()?;
        set_handle_metadata(part.as_file(), src_entry)?;

        part.persist(dest).map_err(|err| err.error)?;
        Ok(bytes)
    };
    copy().map_err(|source| copy_error(src, dest, source))
}

/// Copy a file with the OS copy primitive, then set destination metadata
///
/// A read-only destination is made writable first, since the OS copy opens
/// it for writing.
pub fn copy_file_native(
    src: &Utf8Path,
    dest: &Utf8Path,
    src_entry: &FileEntry,
) -> Result<u64, BackupError> {
    let copy = || -> std::io::Result<u64> {
        make_writable(dest.as_std_path())?;
        let bytes = fs::copy(src, dest)?;
        set_path_metadata(dest.as_std_path(), src_entry)?;
        Ok(bytes)
    };
    copy().map_err(|source| copy_error(src, dest, source))
}

fn stream(src: &mut File, dest: &mut File) -> std::io::Result<u64> {
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        dest.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    Ok(total_bytes)
}

/// Directory that will hold the temporary file for `dest`
fn parent_dir(dest: &Utf8Path) -> &Path {
    match dest.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.as_std_path(),
        _ => Path::new("."),
    }
}

fn make_writable(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_file() && metadata.permissions().readonly() => {
            fs::set_permissions(path, dest_permissions(metadata.permissions()))
        }
        _ => Ok(()),
    }
}

fn set_handle_metadata(file: &File, src_entry: &FileEntry) -> std::io::Result<()> {
    file.set_permissions(dest_permissions(file.metadata()?.permissions()))?;
    filetime::set_file_handle_times(file, None, Some(mtime_of(src_entry)))
}

fn set_path_metadata(path: &Path, src_entry: &FileEntry) -> std::io::Result<()> {
    fs::set_permissions(path, dest_permissions(fs::metadata(path)?.permissions()))?;
    filetime::set_file_mtime(path, mtime_of(src_entry))
}

#[cfg(unix)]
fn dest_permissions(_current: fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    fs::Permissions::from_mode(DEST_FILE_MODE)
}

#[cfg(not(unix))]
fn dest_permissions(mut current: fs::Permissions) -> fs::Permissions {
    let _ = DEST_FILE_MODE;
    current.set_readonly(false);
    current
}

fn mtime_of(src_entry: &FileEntry) -> filetime::FileTime {
    filetime::FileTime::from_system_time(src_entry.mtime)
}

fn copy_error(src: &Utf8Path, dest: &Utf8Path, source: std::io::Error) -> BackupError {
    BackupError::Copy {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    }
}
