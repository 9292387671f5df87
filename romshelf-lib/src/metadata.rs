//! Turns discovered files into normalized ROM metadata and catalog entries.

use chrono::{DateTime, Utc};
use romshelf_catalog::{
    catalog_id, clean_title, format_timestamp, CatalogEntry, CatalogFile, ReleaseInfo,
};
use romshelf_core::{Platform, RomError};
use tokio::sync::Semaphore;

use crate::fs::{FileAccessor, FileSystem};
use crate::hasher::{content_checksum, fingerprint_checksum, ChecksumPolicy, DEFAULT_CONTENT_READS};
use crate::scanner::RawFileRecord;

/// Normalized description of one ROM file.
///
/// Only classifiable files get this far; the platform is always known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRomMetadata {
    pub filename: String,
    pub path: String,
    pub platform: Platform,
    pub title: String,
    pub file_size: u64,
    pub modified_at: DateTime<Utc>,
    pub checksum: String,
}

impl LocalRomMetadata {
    /// Deterministic catalog id for this file.
    pub fn id(&self) -> String {
        catalog_id(&self.title, self.platform, &self.checksum)
    }

    /// Build the single-file catalog entry for this ROM.
    pub fn to_catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            id: self.id(),
            platform: self.platform,
            last_modified: format_timestamp(self.modified_at),
            files: vec![CatalogFile {
                path: self.path.clone(),
                size: self.file_size,
                checksum: self.checksum.clone(),
            }],
            release: ReleaseInfo::new(self.title.clone()),
        }
    }
}

/// Assembles [`LocalRomMetadata`] from raw records.
///
/// Content checksums need the whole file in memory, so at most
/// `max_content_reads` files are read and hashed at once no matter how many
/// records are parsed concurrently.
pub struct MetadataAssembler<'a, F> {
    fs: &'a FileAccessor<F>,
    policy: ChecksumPolicy,
    reads: Semaphore,
}

impl<'a, F: FileSystem> MetadataAssembler<'a, F> {
    pub fn new(fs: &'a FileAccessor<F>, policy: ChecksumPolicy) -> Self {
        Self {
            fs,
            policy,
            reads: Semaphore::new(DEFAULT_CONTENT_READS),
        }
    }

    /// Cap concurrent whole-file reads (minimum 1).
    pub fn with_max_content_reads(mut self, max_content_reads: usize) -> Self {
        self.reads = Semaphore::new(max_content_reads.max(1));
        self
    }

    /// Classify, title and checksum one record.
    ///
    /// Fails only with [`RomError::UnknownPlatform`]; such records should be
    /// dropped from the catalog, not retried.
    pub async fn parse(&self, record: &RawFileRecord) -> Result<LocalRomMetadata, RomError> {
        let platform = Platform::from_extension(&record.extension)
            .ok_or_else(|| RomError::UnknownPlatform(record.extension.clone()))?;
        let checksum = self.checksum(record).await;

        Ok(LocalRomMetadata {
            filename: record.filename.clone(),
            path: record.path.clone(),
            platform,
            title: clean_title(&record.filename),
            file_size: record.size_bytes,
            modified_at: record.modified_at,
            checksum,
        })
    }

    async fn checksum(&self, record: &RawFileRecord) -> String {
        let fingerprint = || {
            fingerprint_checksum(record.size_bytes, record.modified_at, record.filename.len())
        };

        if !self.policy.reads_content(record.size_bytes) {
            log::debug!("Fingerprinting {} ({} bytes)", record.path, record.size_bytes);
            return fingerprint();
        }
        let hashed = match self.reads.acquire().await {
            Ok(_permit) => self
                .fs
                .read_bytes(&record.path)
                .await
                .map(|data| content_checksum(&data)),
            Err(e) => Err(RomError::wrap(&record.path, "checksum permits closed", e)),
        };
        match hashed {
            Ok(checksum) => checksum,
            Err(e) => {
                log::warn!(
                    "Could not read {} for checksum, using fingerprint: {}",
                    record.path,
                    e
                );
                fingerprint()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/metadata_tests.rs"]
mod tests;
