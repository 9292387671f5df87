//! ROM discovery and catalog building.
//!
//! Everything here talks to storage through the [`FileSystem`] capability:
//! [`LocalFileSystem`] for real disks, [`MemoryFileSystem`] for tests and
//! previews. [`FileAccessor`] maps raw I/O failures onto [`RomError`].
//!
//! [`RomError`]: romshelf_core::RomError

pub mod export;
pub mod fs;
pub mod hasher;
pub mod local;
pub mod memory;
pub mod metadata;
pub mod pipeline;
pub mod scanner;
pub mod settings;

pub use export::{export_catalog, import_catalog};
pub use fs::{FileAccessor, FileInfo, FileSystem, RawStat};
pub use hasher::{ChecksumMode, ChecksumPolicy};
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
pub use metadata::{LocalRomMetadata, MetadataAssembler};
pub use pipeline::{build_catalog, CatalogBuild, RejectedRecord, ScanOptions};
pub use scanner::{scan, scan_with_report, RawFileRecord, ScanOutcome, Scanner, SkippedEntry};
pub use settings::{load_settings, save_settings, Settings, SettingsError};
