//! Data model types for the persisted game catalog.
//!
//! A snapshot is written fresh on every export and read back wholesale;
//! nothing here is merged incrementally.

use romshelf_core::Platform;
use serde::{Deserialize, Serialize};

/// Snapshot format version written to `metadata.version`.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Number of checksum characters folded into a catalog id.
pub const ID_CHECKSUM_PREFIX: usize = 8;

// ── Entry ───────────────────────────────────────────────────────────────────

/// One discovered game, the externally visible unit of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub platform: Platform,
    /// ISO-8601 modification time of the newest file.
    pub last_modified: String,
    /// Files in discovery order. Never empty.
    pub files: Vec<CatalogFile>,
    pub release: ReleaseInfo,
}

/// A single ROM file belonging to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub path: String,
    pub size: u64,
    pub checksum: String,
}

/// Release details shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub title: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default, alias = "releaseYear")]
    pub release_year: Option<u32>,
}

impl ReleaseInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Deterministic catalog id for a game.
///
/// `"{title}-{platform}-{checksum prefix}"`, lower-cased with spaces turned
/// into hyphens. Two files sharing title, platform and checksum prefix get
/// the same id; callers must not treat ids as unique keys.
pub fn catalog_id(title: &str, platform: Platform, checksum: &str) -> String {
    let prefix: String = checksum.chars().take(ID_CHECKSUM_PREFIX).collect();
    format!("{}-{}-{}", title, platform.short_name(), prefix)
        .to_lowercase()
        .replace(' ', "-")
}

// ── Snapshot ────────────────────────────────────────────────────────────────

/// Root object of a persisted catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub metadata: SnapshotMetadata,
    #[serde(default)]
    pub games: Vec<CatalogEntry>,
}

/// Header block of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub scan_date: String,
    pub total_games: usize,
    pub version: String,
}
