//! End-to-end catalog building: scan, assemble, filter.

use futures::stream::{self, StreamExt};
use romshelf_catalog::CatalogEntry;
use romshelf_core::RomError;

use crate::fs::{FileAccessor, FileSystem};
use crate::hasher::{ChecksumPolicy, DEFAULT_CONTENT_READS};
use crate::metadata::MetadataAssembler;
use crate::scanner::{DEFAULT_MAX_CONCURRENCY, Scanner, SkippedEntry};

/// Knobs for a catalog build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Cap on file-system calls in flight.
    pub max_concurrency: usize,
    /// Cap on whole files held in memory for content checksums.
    pub max_content_reads: usize,
    pub checksum: ChecksumPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_content_reads: DEFAULT_CONTENT_READS,
            checksum: ChecksumPolicy::default(),
        }
    }
}

/// A discovered file that was left out because its platform is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub path: String,
    pub extension: String,
}

/// Result of [`build_catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuild {
    /// Entries in discovery order.
    pub entries: Vec<CatalogEntry>,
    /// Entries the scanner could not stat.
    pub skipped: Vec<SkippedEntry>,
    /// Files dropped for an unknown platform.
    pub rejected: Vec<RejectedRecord>,
}

/// Scan `roots` and turn every classifiable match into a catalog entry.
///
/// Directory listing failures abort the build; unclassifiable files are
/// reported in [`CatalogBuild::rejected`] and never reach the entry list.
pub async fn build_catalog<F, R, E>(
    fs: &FileAccessor<F>,
    roots: &[R],
    supported_extensions: &[E],
    options: &ScanOptions,
) -> Result<CatalogBuild, RomError>
where
    F: FileSystem,
    R: AsRef<str>,
    E: AsRef<str>,
{
    let outcome = Scanner::new(fs, supported_extensions)
        .with_max_concurrency(options.max_concurrency)
        .scan(roots)
        .await?;

    let assembler = MetadataAssembler::new(fs, options.checksum)
        .with_max_content_reads(options.max_content_reads);
    let parsed: Vec<_> = stream::iter(&outcome.records)
        .map(|record| {
            let assembler = &assembler;
            async move { (record, assembler.parse(record).await) }
        })
        .buffered(options.max_concurrency.max(1))
        .collect()
        .await;

    let mut entries = Vec::with_capacity(parsed.len());
    let mut rejected = Vec::new();
    for (record, result) in parsed {
        match result {
            Ok(meta) => entries.push(meta.to_catalog_entry()),
            Err(RomError::UnknownPlatform(extension)) => {
                log::warn!("Skipping {}: unknown platform for '{}'", record.path, extension);
                rejected.push(RejectedRecord {
                    path: record.path.clone(),
                    extension,
                });
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Catalog built: {} entries, {} rejected, {} skipped",
        entries.len(),
        rejected.len(),
        outcome.skipped.len(),
    );

    Ok(CatalogBuild {
        entries,
        skipped: outcome.skipped,
        rejected,
    })
}
