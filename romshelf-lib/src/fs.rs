//! Typed access to the device file system.
//!
//! The pipeline never talks to storage directly. It consumes an abstract
//! [`FileSystem`] capability whose failures are raw `std::io::Error`s, and
//! [`FileAccessor`] maps those into the closed [`RomError`] taxonomy. The
//! accessor performs no retries; every failure is reported immediately.

use std::io;

use chrono::{DateTime, Utc};
use romshelf_core::{FsOperation, RomError};

/// Raw stat result as reported by a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStat {
    pub exists: bool,
    pub is_directory: bool,
    /// The path itself is a symbolic link. The other fields describe its
    /// target.
    pub is_symlink: bool,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

impl RawStat {
    /// Stat result for a path that does not exist.
    pub fn missing() -> Self {
        Self {
            exists: false,
            is_directory: false,
            is_symlink: false,
            size: 0,
            modified_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// File-system capability consumed by the pipeline.
///
/// Paths are `/`-separated strings. Implementations are free to be backed
/// by a real disk, a platform bridge, or memory.
#[allow(async_fn_in_trait)]
pub trait FileSystem {
    /// Names (not paths) of the entries directly inside `path`.
    async fn list_directory(&self, path: &str) -> io::Result<Vec<String>>;

    /// Stat a path. A missing path may be reported either as
    /// `exists: false` or as an `ErrorKind::NotFound` error.
    async fn stat(&self, path: &str) -> io::Result<RawStat>;

    /// Read a whole file as bytes.
    async fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Read a whole file as UTF-8 text.
    async fn read_text(&self, path: &str) -> io::Result<String>;

    /// Create or replace a file with `content`.
    async fn write_text(&self, path: &str, content: &str) -> io::Result<()>;

    /// Create a directory, and its parents when `recursive` is set.
    async fn make_directory(&self, path: &str, recursive: bool) -> io::Result<()>;
}

/// Stat result for an existing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: String,
    pub is_directory: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// Thin typed wrapper around a [`FileSystem`] capability.
pub struct FileAccessor<F> {
    fs: F,
}

impl<F: FileSystem> FileAccessor<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// The wrapped capability.
    pub fn inner(&self) -> &F {
        &self.fs
    }

    /// Stat a path. A missing path is always `RomError::NotFound`.
    pub async fn stat(&self, path: &str) -> Result<FileInfo, RomError> {
        let raw = self
            .fs
            .stat(path)
            .await
            .map_err(|e| map_io_error(path, FsOperation::Stat, e))?;
        if !raw.exists {
            return Err(RomError::NotFound(path.to_string()));
        }
        Ok(FileInfo {
            path: path.to_string(),
            is_directory: raw.is_directory,
            is_symlink: raw.is_symlink,
            size: raw.size,
            modified_at: raw.modified_at,
        })
    }

    /// Whether `path` exists. Errors other than not-found are propagated.
    pub async fn exists(&self, path: &str) -> Result<bool, RomError> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(RomError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn list_directory(&self, path: &str) -> Result<Vec<String>, RomError> {
        self.fs
            .list_directory(path)
            .await
            .map_err(|e| map_io_error(path, FsOperation::List, e))
    }

    pub async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, RomError> {
        self.fs
            .read(path)
            .await
            .map_err(|e| map_io_error(path, FsOperation::Read, e))
    }

    pub async fn read_text(&self, path: &str) -> Result<String, RomError> {
        self.fs
            .read_text(path)
            .await
            .map_err(|e| map_io_error(path, FsOperation::Read, e))
    }

    pub async fn write_text(&self, path: &str, content: &str) -> Result<(), RomError> {
        self.fs
            .write_text(path, content)
            .await
            .map_err(|e| map_io_error(path, FsOperation::Write, e))
    }

    pub async fn make_directory(&self, path: &str, recursive: bool) -> Result<(), RomError> {
        self.fs
            .make_directory(path, recursive)
            .await
            .map_err(|e| map_io_error(path, FsOperation::MakeDirectory, e))
    }
}

/// Translate a raw capability failure into the closed error set.
pub fn map_io_error(path: &str, operation: FsOperation, err: io::Error) -> RomError {
    match err.kind() {
        io::ErrorKind::NotFound => RomError::NotFound(path.to_string()),
        io::ErrorKind::PermissionDenied => RomError::PermissionDenied {
            path: path.to_string(),
            operation,
        },
        io::ErrorKind::NotADirectory => RomError::NotADirectory(path.to_string()),
        io::ErrorKind::IsADirectory => RomError::NotAFile(path.to_string()),
        _ => RomError::wrap(path, format!("{operation} failed: {err}"), err),
    }
}

#[cfg(test)]
#[path = "tests/fs_tests.rs"]
mod tests;
