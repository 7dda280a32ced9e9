//! FileEntry - Describes a single filesystem entry seen during a backup

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::Metadata;
use std::time::SystemTime;

/// Owner write bit; an entry without it is treated as read-only.
const OWNER_WRITE: u32 = 0o200;

/// Describes one filesystem entry (file, directory or symlink)
///
/// Entries are produced by a [`FileSystem`](crate::filesystem::FileSystem)
/// and consumed immediately by the sync policy; they are never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Full path of the entry
    pub path: Utf8PathBuf,

    /// File size in bytes
    pub size: u64,

    /// Last modification time
    pub mtime: SystemTime,

    /// Unix permissions (mode bits)
    pub permissions: u32,

    pub is_symlink: bool,
    pub is_dir: bool,
}

impl FileEntry {
    /// Create a new regular-file entry
    pub fn new(path: impl Into<Utf8PathBuf>, size: u64, mtime: SystemTime, permissions: u32) -> Self {
        Self {
            path: path.into(),
            size,
            mtime,
            permissions,
            is_symlink: false,
            is_dir: false,
        }
    }

    /// Create a directory entry
    pub fn new_dir(path: impl Into<Utf8PathBuf>, mtime: SystemTime) -> Self {
        Self {
            is_dir: true,
            ..Self::new(path, 0, mtime, 0o755)
        }
    }

    /// Create a symbolic link entry (the link itself, never its target)
    pub fn new_symlink(path: impl Into<Utf8PathBuf>, mtime: SystemTime) -> Self {
        Self {
            is_symlink: true,
            ..Self::new(path, 0, mtime, 0o777)
        }
    }

    /// Build an entry from `symlink_metadata` output
    pub fn from_metadata(path: &Utf8Path, metadata: &Metadata) -> std::io::Result<Self> {
        // Extract Unix permissions (platform-specific)
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode()
        };

        #[cfg(not(unix))]
        let permissions = if metadata.permissions().readonly() {
            0o444
        } else {
            0o666
        };

        let file_type = metadata.file_type();
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified()?,
            permissions,
            is_symlink: file_type.is_symlink(),
            is_dir: file_type.is_dir(),
        })
    }

    /// Check whether the owner write bit is cleared
    pub fn is_readonly(&self) -> bool {
        self.permissions & OWNER_WRITE == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_new_file_entry() {
        let mtime = UNIX_EPOCH + Duration::from_secs(1000);
        let entry = FileEntry::new("/docs/file.txt", 1024, mtime, 0o644);

        assert_eq!(entry.path, Utf8PathBuf::from("/docs/file.txt"));
        assert_eq!(entry.size, 1024);
        assert_eq!(entry.mtime, mtime);
        assert!(!entry.is_symlink);
        assert!(!entry.is_dir);
        assert!(!entry.is_readonly());
    }

    #[test]
    fn test_dir_and_symlink_constructors() {
        let dir = FileEntry::new_dir("/docs", UNIX_EPOCH);
        assert!(dir.is_dir);
        assert!(!dir.is_symlink);

        let link = FileEntry::new_symlink("/docs/link", UNIX_EPOCH);
        assert!(link.is_symlink);
        assert!(!link.is_dir);
    }

    #[test]
    fn test_readonly_detection() {
        let test_cases = vec![
            (0o444, true),
            (0o400, true),
            (0o000, true),
            (0o644, false),
            (0o200, false),
        ];

        for (perm, readonly) in test_cases {
            let entry = FileEntry::new("f", 1, UNIX_EPOCH, perm);
            assert_eq!(entry.is_readonly(), readonly, "mode {:o}", perm);
        }
    }

    #[test]
    fn test_from_metadata_reads_real_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("data.bin");
        std::fs::write(&file_path, b"12345").expect("Failed to write file");

        let path = Utf8Path::from_path(&file_path).expect("temp path should be UTF-8");
        let metadata = std::fs::symlink_metadata(path).expect("Failed to stat file");
        let entry = FileEntry::from_metadata(path, &metadata).expect("metadata should convert");

        assert_eq!(entry.size, 5);
        assert_eq!(entry.path, path);
        assert!(!entry.is_dir);
        assert!(!entry.is_symlink);
    }
}
