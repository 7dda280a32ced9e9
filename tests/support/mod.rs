//! In-memory filesystem for driving the backup engine in tests

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use locbak::filesystem::{FileSystem, WalkControl, WalkVisitor, DEST_FILE_MODE};
use locbak::{BackupError, FileEntry};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::time::{Duration, SystemTime};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Filesystem held in a sorted map; copies land in the same map
pub struct MemoryFileSystem {
    now: SystemTime,
    entries: RefCell<BTreeMap<Utf8PathBuf, FileEntry>>,
    mkdir_failures: BTreeSet<Utf8PathBuf>,
    copy_failures: BTreeSet<Utf8PathBuf>,
    pub copied: RefCell<Vec<Utf8PathBuf>>,
    pub mkdirs: RefCell<Vec<Utf8PathBuf>>,
    pub chmods: RefCell<Vec<Utf8PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            now: SystemTime::now(),
            entries: RefCell::new(BTreeMap::new()),
            mkdir_failures: BTreeSet::new(),
            copy_failures: BTreeSet::new(),
            copied: RefCell::new(Vec::new()),
            mkdirs: RefCell::new(Vec::new()),
            chmods: RefCell::new(Vec::new()),
        }
    }

    fn insert(&self, entry: FileEntry) {
        self.entries.borrow_mut().insert(entry.path.clone(), entry);
    }

    fn ago(&self, age_days: u32) -> SystemTime {
        self.now - DAY * age_days
    }

    /// Regular file modified `age_days` days ago
    pub fn file(self, path: &str, age_days: u32, size: u64) -> Self {
        self.insert(FileEntry::new(path, size, self.ago(age_days), 0o644));
        self
    }

    /// Regular file with an exact modification time
    pub fn file_at(self, path: &str, mtime: SystemTime, size: u64, permissions: u32) -> Self {
        self.insert(FileEntry::new(path, size, mtime, permissions));
        self
    }

    pub fn dir(self, path: &str) -> Self {
        self.insert(FileEntry::new_dir(path, self.now));
        self
    }

    pub fn symlink(self, path: &str) -> Self {
        self.insert(FileEntry::new_symlink(path, self.ago(1)));
        self
    }

    pub fn fail_mkdir(mut self, path: &str) -> Self {
        self.mkdir_failures.insert(path.into());
        self
    }

    pub fn fail_copy(mut self, src: &str) -> Self {
        self.copy_failures.insert(src.into());
        self
    }

    pub fn entry(&self, path: &str) -> Option<FileEntry> {
        self.entries.borrow().get(Utf8Path::new(path)).cloned()
    }

    pub fn copied_paths(&self) -> Vec<String> {
        self.copied.borrow().iter().map(|p| p.to_string()).collect()
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn stat(&self, path: &Utf8Path) -> Result<FileEntry, BackupError> {
        self.entries
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| BackupError::at(path, io::ErrorKind::NotFound.into()))
    }

    fn walk_dir(&self, root: &Utf8Path, visit: &mut WalkVisitor<'_>) {
        let snapshot: Vec<FileEntry> = self
            .entries
            .borrow()
            .values()
            .filter(|entry| entry.path.starts_with(root))
            .cloned()
            .collect();

        let mut skipped: Option<Utf8PathBuf> = None;
        for entry in snapshot {
            if let Some(dir) = &skipped {
                if entry.path.starts_with(dir) {
                    continue;
                }
            }
            let path = entry.path.clone();
            let is_dir = entry.is_dir;
            match visit(Ok(entry)) {
                WalkControl::Continue => {}
                WalkControl::SkipDir if is_dir => skipped = Some(path),
                WalkControl::SkipDir => {}
                WalkControl::Stop => return,
            }
        }
    }

    fn chmod(&self, path: &Utf8Path, mode: u32) -> Result<(), BackupError> {
        self.chmods.borrow_mut().push(path.to_path_buf());
        if let Some(entry) = self.entries.borrow_mut().get_mut(path) {
            entry.permissions = mode;
        }
        Ok(())
    }

    fn mkdir_all(&self, path: &Utf8Path, _mode: u32) -> Result<(), BackupError> {
        if self.mkdir_failures.contains(path) {
            return Err(BackupError::at(path, io::Error::other("mkdir failed")));
        }
        self.mkdirs.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn copy_file(
        &self,
        src: &Utf8Path,
        dest: &Utf8Path,
        src_entry: &FileEntry,
    ) -> Result<u64, BackupError> {
        if self.copy_failures.contains(src) {
            return Err(BackupError::Copy {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                source: io::Error::other("disk full"),
            });
        }
        self.copied.borrow_mut().push(src.to_path_buf());
        self.insert(FileEntry::new(
            dest.to_path_buf(),
            src_entry.size,
            src_entry.mtime,
            DEST_FILE_MODE,
        ));
        Ok(src_entry.size)
    }
}
