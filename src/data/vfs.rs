//! Filesystem and clock boundary.
//!
//! All staleness comparisons and output reads/writes go through the
//! [`Vfs`] trait so the filesystem can be substituted in tests.
//! [`NativeVfs`] is the production implementation; [`MemoryVfs`] is an
//! in-memory double with a settable clock.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Filesystem access used by staleness checks and output writing.
pub trait Vfs: Send + Sync {
    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Modification time of the file at `path`, if the file exists and
    /// the platform reports one.
    fn modified_time(&self, path: &Path) -> Option<SystemTime>;

    /// Read the file at `path` as UTF-8.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Write `content` to `path`, replacing any previous content.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

// ============================================================================
// Native filesystem
// ============================================================================

/// [`Vfs`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeVfs;

impl Vfs for NativeVfs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn modified_time(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }
}

// ============================================================================
// In-memory filesystem
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryFile {
    content: String,
    mtime: SystemTime,
}

/// In-memory [`Vfs`] with an explicit clock.
///
/// Writes are stamped with the current clock value; tests advance the
/// clock with [`MemoryVfs::set_now`] and plant files with explicit
/// timestamps via [`MemoryVfs::insert`].
#[derive(Debug)]
pub struct MemoryVfs {
    files: RwLock<FxHashMap<PathBuf, MemoryFile>>,
    now: RwLock<SystemTime>,
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(FxHashMap::default()),
            now: RwLock::new(SystemTime::UNIX_EPOCH),
        }
    }

    /// Set the clock used to stamp subsequent writes.
    pub fn set_now(&self, now: SystemTime) {
        *self.now.write() = now;
    }

    /// Plant a file with an explicit modification time.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>, mtime: SystemTime) {
        self.files.write().insert(
            path.into(),
            MemoryFile {
                content: content.into(),
                mtime,
            },
        );
    }

    /// Remove a file, if present.
    pub fn remove(&self, path: &Path) {
        self.files.write().remove(path);
    }
}

impl Vfs for MemoryVfs {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    fn modified_time(&self, path: &Path) -> Option<SystemTime> {
        self.files.read().get(path).map(|file| file.mtime)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .get(path)
            .map(|file| file.content.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mtime = *self.now.read();
        self.files.write().insert(
            path.to_path_buf(),
            MemoryFile {
                content: content.to_string(),
                mtime,
            },
        );
        Ok(())
    }
}
