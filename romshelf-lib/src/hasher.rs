//! Content fingerprints used to tell ROM files apart within one scan.
//!
//! These are CRC-32 values rendered as 8 lower-case hex digits. They are
//! stable across runs but carry no cryptographic guarantee.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Files above this size are fingerprinted instead of read.
pub const DEFAULT_CONTENT_LIMIT: u64 = 64 * 1024 * 1024;

/// Default cap on whole-file reads held in memory at once.
pub const DEFAULT_CONTENT_READS: usize = 2;

/// How a file's checksum is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumMode {
    /// CRC-32 of the file bytes.
    #[default]
    Content,
    /// CRC-32 of size, modification time and filename length. No read.
    Fingerprint,
}

/// Checksum mode plus the size above which content hashing is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumPolicy {
    pub mode: ChecksumMode,
    pub content_limit_bytes: u64,
}

impl Default for ChecksumPolicy {
    fn default() -> Self {
        Self {
            mode: ChecksumMode::Content,
            content_limit_bytes: DEFAULT_CONTENT_LIMIT,
        }
    }
}

impl ChecksumPolicy {
    pub fn fingerprint() -> Self {
        Self {
            mode: ChecksumMode::Fingerprint,
            ..Self::default()
        }
    }

    /// Whether a file of `size` bytes should have its content hashed.
    pub fn reads_content(&self, size: u64) -> bool {
        self.mode == ChecksumMode::Content && size <= self.content_limit_bytes
    }
}

/// CRC-32 of a byte buffer.
pub fn content_checksum(data: &[u8]) -> String {
    format!("{:08x}", crc32fast::hash(data))
}

/// CRC-32 of `{size}:{modified millis}:{filename length}`.
pub fn fingerprint_checksum(size: u64, modified_at: DateTime<Utc>, filename_len: usize) -> String {
    let key = format!("{}:{}:{}", size, modified_at.timestamp_millis(), filename_len);
    content_checksum(key.as_bytes())
}
