use super::*;
use std::io::ErrorKind;

use romshelf_core::FsOperation;

use crate::hasher::ChecksumMode;
use crate::memory::MemoryFileSystem;

fn when() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 500_000_000).unwrap()
}

fn record(path: &str, extension: &str, size: u64) -> RawFileRecord {
    RawFileRecord {
        filename: path.rsplit('/').next().unwrap().to_string(),
        path: path.to_string(),
        extension: extension.to_string(),
        size_bytes: size,
        modified_at: when(),
    }
}

fn rom_fs() -> FileAccessor<MemoryFileSystem> {
    let mut fs = MemoryFileSystem::new();
    fs.add_file_at("/roms/Super Mario Bros (USA).nes", "123456789", when())
        .add_file_at("/roms/disc.iso", "iso", when());
    FileAccessor::new(fs)
}

#[tokio::test]
async fn parses_known_rom() {
    let fs = rom_fs();
    let assembler = MetadataAssembler::new(&fs, ChecksumPolicy::default());
    let meta = assembler
        .parse(&record("/roms/Super Mario Bros (USA).nes", ".nes", 9))
        .await
        .unwrap();

    assert_eq!(meta.platform, Platform::Nes);
    assert_eq!(meta.title, "Super Mario Bros");
    assert_eq!(meta.checksum, "cbf43926");
    assert_eq!(meta.file_size, 9);
    assert_eq!(meta.id(), "super-mario-bros-nes-cbf43926");
}

#[tokio::test]
async fn unknown_platform_is_an_error() {
    let fs = rom_fs();
    let assembler = MetadataAssembler::new(&fs, ChecksumPolicy::default());
    let err = assembler
        .parse(&record("/roms/disc.iso", ".iso", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, RomError::UnknownPlatform(ext) if ext == ".iso"));
}

#[tokio::test]
async fn fingerprint_mode_skips_reading() {
    let mut mem = MemoryFileSystem::new();
    mem.add_file_at("/roms/game.gb", "data", when())
        .fail("/roms/game.gb", FsOperation::Read, ErrorKind::PermissionDenied);
    let fs = FileAccessor::new(mem);
    let rec = record("/roms/game.gb", ".gb", 4);

    let assembler = MetadataAssembler::new(&fs, ChecksumPolicy::fingerprint());
    let meta = assembler.parse(&rec).await.unwrap();
    assert_eq!(meta.checksum, fingerprint_checksum(4, when(), "game.gb".len()));
}

#[tokio::test]
async fn unreadable_content_falls_back_to_fingerprint() {
    let mut mem = MemoryFileSystem::new();
    mem.add_file_at("/roms/game.gb", "data", when())
        .fail("/roms/game.gb", FsOperation::Read, ErrorKind::PermissionDenied);
    let fs = FileAccessor::new(mem);
    let rec = record("/roms/game.gb", ".gb", 4);

    let assembler = MetadataAssembler::new(&fs, ChecksumPolicy::default());
    let meta = assembler.parse(&rec).await.unwrap();
    assert_eq!(meta.checksum, fingerprint_checksum(4, when(), 7));
}

#[tokio::test]
async fn oversized_files_are_fingerprinted() {
    let fs = rom_fs();
    let policy = ChecksumPolicy {
        mode: ChecksumMode::Content,
        content_limit_bytes: 4,
    };
    let assembler = MetadataAssembler::new(&fs, policy);
    let rec = record("/roms/Super Mario Bros (USA).nes", ".nes", 9);
    let meta = assembler.parse(&rec).await.unwrap();
    assert_eq!(
        meta.checksum,
        fingerprint_checksum(9, when(), rec.filename.len())
    );
}

#[tokio::test]
async fn distinct_contents_get_distinct_checksums() {
    let mut mem = MemoryFileSystem::new();
    mem.add_file_at("/roms/a.nes", "first rom", when())
        .add_file_at("/roms/b.nes", "second rom", when());
    let fs = FileAccessor::new(mem);
    let assembler = MetadataAssembler::new(&fs, ChecksumPolicy::default());

    let a = assembler.parse(&record("/roms/a.nes", ".nes", 9)).await.unwrap();
    let b = assembler.parse(&record("/roms/b.nes", ".nes", 10)).await.unwrap();
    let again = assembler.parse(&record("/roms/a.nes", ".nes", 9)).await.unwrap();
    assert_ne!(a.checksum, b.checksum);
    assert_eq!(a, again);
}

#[test]
fn catalog_entry_has_one_file_and_iso_timestamp() {
    let meta = LocalRomMetadata {
        filename: "Tetris (World).gb".to_string(),
        path: "/roms/gb/Tetris (World).gb".to_string(),
        platform: Platform::GameBoy,
        title: "Tetris".to_string(),
        file_size: 32768,
        modified_at: when(),
        checksum: "46df91ad".to_string(),
    };
    let entry = meta.to_catalog_entry();

    assert_eq!(entry.id, "tetris-gb-46df91ad");
    assert_eq!(entry.platform, Platform::GameBoy);
    assert_eq!(entry.last_modified, "2023-11-14T22:13:20.500Z");
    assert_eq!(entry.files.len(), 1);
    assert_eq!(entry.files[0].path, meta.path);
    assert_eq!(entry.files[0].size, 32768);
    assert_eq!(entry.release.title, "Tetris");
    assert!(entry.release.genre.is_none());
}

/// Wraps the in-memory capability and tracks how many reads overlap.
struct OverlapCounter {
    inner: MemoryFileSystem,
    active: std::cell::Cell<usize>,
    peak: std::cell::Cell<usize>,
}

impl FileSystem for OverlapCounter {
    async fn list_directory(&self, path: &str) -> std::io::Result<Vec<String>> {
        self.inner.list_directory(path).await
    }

    async fn stat(&self, path: &str) -> std::io::Result<crate::fs::RawStat> {
        self.inner.stat(path).await
    }

    async fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self.active.set(self.active.get() + 1);
        self.peak.set(self.peak.get().max(self.active.get()));
        tokio::task::yield_now().await;
        let data = self.inner.read(path).await;
        self.active.set(self.active.get() - 1);
        data
    }

    async fn read_text(&self, path: &str) -> std::io::Result<String> {
        self.inner.read_text(path).await
    }

    async fn write_text(&self, path: &str, content: &str) -> std::io::Result<()> {
        self.inner.write_text(path, content).await
    }

    async fn make_directory(&self, path: &str, recursive: bool) -> std::io::Result<()> {
        self.inner.make_directory(path, recursive).await
    }
}

#[tokio::test]
async fn content_reads_are_capped() {
    let mut inner = MemoryFileSystem::new();
    let records: Vec<RawFileRecord> = (0..12)
        .map(|i| {
            let path = format!("/roms/game{i}.nes");
            inner.add_file_at(&path, vec![i as u8; 32], when());
            record(&path, ".nes", 32)
        })
        .collect();
    let fs = FileAccessor::new(OverlapCounter {
        inner,
        active: Default::default(),
        peak: Default::default(),
    });

    let assembler =
        MetadataAssembler::new(&fs, ChecksumPolicy::default()).with_max_content_reads(3);
    let parsed = futures::future::join_all(records.iter().map(|r| assembler.parse(r))).await;

    assert!(parsed.iter().all(|r| r.is_ok()));
    assert!(fs.inner().peak.get() <= 3, "peak was {}", fs.inner().peak.get());
    assert!(fs.inner().peak.get() > 1);
}
