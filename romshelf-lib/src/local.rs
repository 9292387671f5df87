//! [`FileSystem`] capability backed by the host disk through `tokio::fs`.

use std::io;

use chrono::{DateTime, Utc};

use crate::fs::{FileSystem, RawStat};

/// Host-disk capability. Directory listings are sorted by name so scans
/// are reproducible. `stat` follows symbolic links but flags them, so a
/// walker can refuse to descend through one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    async fn list_directory(&self, path: &str) -> io::Result<Vec<String>> {
        let mut dir = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn stat(&self, path: &str) -> io::Result<RawStat> {
        let link = match tokio::fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RawStat::missing()),
            Err(e) => return Err(e),
        };
        let is_symlink = link.is_symlink();
        let metadata = if is_symlink {
            match tokio::fs::metadata(path).await {
                Ok(m) => m,
                // Dangling link.
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RawStat::missing()),
                Err(e) => return Err(e),
            }
        } else {
            link
        };
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Ok(RawStat {
            exists: true,
            is_directory: metadata.is_dir(),
            is_symlink,
            size: metadata.len(),
            modified_at,
        })
    }

    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn read_text(&self, path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_text(&self, path: &str, content: &str) -> io::Result<()> {
        tokio::fs::write(path, content).await
    }

    async fn make_directory(&self, path: &str, recursive: bool) -> io::Result<()> {
        if recursive {
            tokio::fs::create_dir_all(path).await
        } else {
            tokio::fs::create_dir(path).await
        }
    }
}
