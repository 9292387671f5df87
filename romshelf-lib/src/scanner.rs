//! Recursive ROM discovery over a [`FileSystem`] capability.
//!
//! Roots are walked depth-first. A missing root (or one that is not a
//! directory) contributes nothing. Inside a directory, an entry that cannot be
//! stat'd is skipped and recorded, while a directory that cannot be listed
//! fails the whole scan. One unreadable file never blanks out its siblings.
//! Symbolic links to files are reported like the files themselves; links to
//! directories are not descended into, though a root may itself be a link.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{self, StreamExt, TryStreamExt};
use romshelf_core::path::{extname, join};
use romshelf_core::{normalize_extension, RomError};
use tokio::sync::Semaphore;

use crate::fs::{FileAccessor, FileInfo, FileSystem};

/// Default cap on file-system calls in flight during a scan.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// A file discovered during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFileRecord {
    /// File name including extension.
    pub filename: String,
    pub path: String,
    /// Extension with its leading dot, or empty.
    pub extension: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// An entry that was dropped because it could not be stat'd.
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: String,
    pub error: RomError,
}

/// Records found by a scan plus the entries that had to be skipped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub records: Vec<RawFileRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl ScanOutcome {
    fn record(record: RawFileRecord) -> Self {
        Self {
            records: vec![record],
            skipped: Vec::new(),
        }
    }

    fn skipped(path: String, error: RomError) -> Self {
        Self {
            records: Vec::new(),
            skipped: vec![SkippedEntry { path, error }],
        }
    }

    /// Concatenate outcomes, keeping their order.
    fn merge(parts: Vec<ScanOutcome>) -> Self {
        let mut merged = Self::default();
        for part in parts {
            merged.records.extend(part.records);
            merged.skipped.extend(part.skipped);
        }
        merged
    }
}

/// One listing line after it has been stat'd.
struct DirectoryEntry {
    name: String,
    path: String,
    is_directory: bool,
}

/// Walks root directories and collects files with supported extensions.
pub struct Scanner<'a, F> {
    fs: &'a FileAccessor<F>,
    extensions: HashSet<String>,
    max_concurrency: usize,
    permits: Semaphore,
}

impl<'a, F: FileSystem> Scanner<'a, F> {
    /// Create a scanner accepting `extensions` (case-insensitive, leading dot
    /// optional).
    pub fn new<S: AsRef<str>>(fs: &'a FileAccessor<F>, extensions: &[S]) -> Self {
        Self {
            fs,
            extensions: extension_set(extensions),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            permits: Semaphore::new(DEFAULT_MAX_CONCURRENCY),
        }
    }

    /// Cap the number of file-system calls in flight (minimum 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        let n = max_concurrency.max(1);
        self.max_concurrency = n;
        self.permits = Semaphore::new(n);
        self
    }

    /// Scan every root, returning records in traversal order.
    pub async fn scan<S: AsRef<str>>(&self, roots: &[S]) -> Result<ScanOutcome, RomError> {
        let parts: Vec<ScanOutcome> = stream::iter(roots.iter().map(|r| r.as_ref()))
            .map(|root| self.scan_root(root))
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;
        let outcome = ScanOutcome::merge(parts);
        log::info!(
            "Scanned {} root(s): {} matching file(s), {} skipped",
            roots.len(),
            outcome.records.len(),
            outcome.skipped.len(),
        );
        Ok(outcome)
    }

    async fn scan_root(&self, root: &str) -> Result<ScanOutcome, RomError> {
        let root = join(&[root]);
        match self.stat(&root).await {
            Ok(info) if info.is_directory => self.walk(root).await,
            Ok(_) => {
                log::debug!("Scan root {} is not a directory, skipping", root);
                Ok(ScanOutcome::default())
            }
            Err(RomError::NotFound(_)) => {
                log::debug!("Scan root {} does not exist, skipping", root);
                Ok(ScanOutcome::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Walk one directory. Listing failures propagate; entry failures don't.
    fn walk(&self, dir: String) -> LocalBoxFuture<'_, Result<ScanOutcome, RomError>> {
        async move {
            let names = self.list(&dir).await?;
            log::debug!("Listing {} ({} entries)", dir, names.len());

            let dir = dir.as_str();
            let parts: Vec<ScanOutcome> = stream::iter(names)
                .map(move |name| self.visit(dir, name))
                .buffered(self.max_concurrency)
                .try_collect()
                .await?;
            Ok(ScanOutcome::merge(parts))
        }
        .boxed_local()
    }

    async fn visit(&self, dir: &str, name: String) -> Result<ScanOutcome, RomError> {
        let path = join(&[dir, name.as_str()]);
        let info = match self.stat(&path).await {
            Ok(info) => info,
            Err(e) => {
                log::debug!("Skipping {}: {}", path, e);
                return Ok(ScanOutcome::skipped(path, e));
            }
        };
        let entry = DirectoryEntry {
            name,
            path,
            is_directory: info.is_directory,
        };

        if entry.is_directory {
            // Linked directories can point back up the tree.
            if info.is_symlink {
                log::debug!("Not following directory link {}", entry.path);
                return Ok(ScanOutcome::default());
            }
            return self.walk(entry.path).await;
        }
        if !self.matches(&entry.name) {
            return Ok(ScanOutcome::default());
        }
        Ok(ScanOutcome::record(RawFileRecord {
            extension: extname(&entry.name).to_string(),
            filename: entry.name,
            path: entry.path,
            size_bytes: info.size,
            modified_at: info.modified_at,
        }))
    }

    fn matches(&self, filename: &str) -> bool {
        normalize_extension(extname(filename)).is_some_and(|ext| self.extensions.contains(&ext))
    }

    async fn stat(&self, path: &str) -> Result<FileInfo, RomError> {
        let _permit = self.acquire(path).await?;
        self.fs.stat(path).await
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, RomError> {
        let _permit = self.acquire(path).await?;
        self.fs.list_directory(path).await
    }

    async fn acquire(&self, path: &str) -> Result<tokio::sync::SemaphorePermit<'_>, RomError> {
        self.permits
            .acquire()
            .await
            .map_err(|e| RomError::wrap(path, "scan permits closed", e))
    }
}

/// Normalize a list of extensions into a lookup set.
pub fn extension_set<S: AsRef<str>>(extensions: &[S]) -> HashSet<String> {
    extensions
        .iter()
        .filter_map(|e| normalize_extension(e.as_ref()))
        .collect()
}

/// Scan `roots` for files whose extension is in `supported_extensions`.
pub async fn scan<F: FileSystem, R: AsRef<str>, E: AsRef<str>>(
    fs: &FileAccessor<F>,
    roots: &[R],
    supported_extensions: &[E],
) -> Result<Vec<RawFileRecord>, RomError> {
    Ok(scan_with_report(fs, roots, supported_extensions)
        .await?
        .records)
}

/// Like [`scan`], but also reports the entries that were skipped.
pub async fn scan_with_report<F: FileSystem, R: AsRef<str>, E: AsRef<str>>(
    fs: &FileAccessor<F>,
    roots: &[R],
    supported_extensions: &[E],
) -> Result<ScanOutcome, RomError> {
    Scanner::new(fs, supported_extensions).scan(roots).await
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
