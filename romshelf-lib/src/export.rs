//! Writing catalog snapshots to storage and reading them back.

use romshelf_catalog::{from_text, to_text, CatalogEntry, CatalogSnapshot};
use romshelf_core::path::dirname;
use romshelf_core::RomError;

use crate::fs::{FileAccessor, FileSystem};

/// Write `entries` as a snapshot at `path`, creating its directory if
/// missing. Returns the path written.
///
/// Any failure is reported as a `FileSystem` error on `path` wrapping the
/// original cause. Concurrent exports to the same path are not coordinated;
/// the last writer wins.
pub async fn export_catalog<F: FileSystem>(
    fs: &FileAccessor<F>,
    path: &str,
    entries: &[CatalogEntry],
) -> Result<String, RomError> {
    let dir = dirname(path);
    match fs.stat(&dir).await {
        Ok(info) if info.is_directory => {}
        Ok(_) => return Err(export_error(path, RomError::NotADirectory(dir))),
        Err(RomError::NotFound(_)) => {
            log::debug!("Creating export directory {}", dir);
            fs.make_directory(&dir, true)
                .await
                .map_err(|e| export_error(path, e))?;
        }
        Err(e) => return Err(export_error(path, e)),
    }

    let text = to_text(entries);
    fs.write_text(path, &text)
        .await
        .map_err(|e| export_error(path, e))?;

    log::info!("Exported {} games to {}", entries.len(), path);
    Ok(path.to_string())
}

/// Read and parse a snapshot previously written by [`export_catalog`].
pub async fn import_catalog<F: FileSystem>(
    fs: &FileAccessor<F>,
    path: &str,
) -> Result<CatalogSnapshot, RomError> {
    let text = fs.read_text(path).await?;
    let snapshot =
        from_text(&text).map_err(|e| RomError::wrap(path, "invalid catalog snapshot", e))?;
    log::debug!("Imported {} games from {}", snapshot.games.len(), path);
    Ok(snapshot)
}

fn export_error(path: &str, cause: RomError) -> RomError {
    RomError::wrap(path, "failed to export catalog", cause)
}
