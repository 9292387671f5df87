use super::*;
use std::io::ErrorKind;

use romshelf_core::FsOperation;

use crate::memory::MemoryFileSystem;

fn accessor(fs: MemoryFileSystem) -> FileAccessor<MemoryFileSystem> {
    FileAccessor::new(fs)
}

fn filenames(records: &[RawFileRecord]) -> Vec<&str> {
    records.iter().map(|r| r.filename.as_str()).collect()
}

#[tokio::test]
async fn empty_root_yields_no_records() {
    let mut fs = MemoryFileSystem::new();
    fs.add_dir("/test/empty");
    let fs = accessor(fs);

    let records = scan(&fs, &["/test/empty"], &[".nes"]).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn flat_directory_in_listing_order() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/mario.nes", vec![0u8; 1024])
        .add_file("/roms/zelda.nes", vec![0u8; 2048])
        .add_file("/roms/pokemon.gb", vec![0u8; 512]);
    let fs = accessor(fs);

    let records = scan(&fs, &["/roms"], &[".nes", ".gb"]).await.unwrap();
    assert_eq!(filenames(&records), vec!["mario.nes", "zelda.nes", "pokemon.gb"]);
    assert_eq!(records[0].size_bytes, 1024);
    assert_eq!(records[1].size_bytes, 2048);
    assert_eq!(records[2].size_bytes, 512);
    assert_eq!(records[2].path, "/roms/pokemon.gb");
    assert_eq!(records[2].extension, ".gb");
}

#[tokio::test]
async fn nested_tree_returns_every_match() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/readme.txt", "hello")
        .add_file("/roms/nes/a.nes", "a")
        .add_file("/roms/nes/cover.png", "png")
        .add_file("/roms/nes/hacks/b.nes", "b")
        .add_file("/roms/nes/hacks/deeper/still/c.nes", "c")
        .add_file("/roms/snes/d.sfc", "d")
        .add_file("/roms/snes/notes.md5", "x")
        .add_dir("/roms/empty");
    let fs = accessor(fs);

    let records = scan(&fs, &["/roms"], &[".nes", ".sfc"]).await.unwrap();
    assert_eq!(records.len(), 4);
    for record in &records {
        let stat = fs.stat(&record.path).await.unwrap();
        assert!(!stat.is_directory);
        assert!(record.path.ends_with(&record.filename));
    }
    assert_eq!(filenames(&records), vec!["a.nes", "b.nes", "c.nes", "d.sfc"]);
}

#[tokio::test]
async fn extension_filter_is_case_insensitive() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/LOUD.NES", "x")
        .add_file("/roms/quiet.nes", "y")
        .add_file("/roms/noext", "z")
        .add_file("/roms/.nes", "hidden");
    let fs = accessor(fs);

    let records = scan(&fs, &["/roms"], &["NES"]).await.unwrap();
    assert_eq!(filenames(&records), vec!["LOUD.NES", "quiet.nes"]);
    assert_eq!(records[0].extension, ".NES");
}

#[tokio::test]
async fn missing_root_is_empty_not_error() {
    let fs = accessor(MemoryFileSystem::new());
    let records = scan(&fs, &["/does/not/exist"], &[".nes"]).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn file_root_is_treated_as_empty() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/mario.nes", "x");
    let fs = accessor(fs);

    let records = scan(&fs, &["/roms/mario.nes"], &[".nes"]).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn failing_entry_stat_is_isolated() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/a.nes", "a")
        .add_file("/roms/b.nes", "b")
        .add_file("/roms/c.nes", "c")
        .fail("/roms/b.nes", FsOperation::Stat, ErrorKind::PermissionDenied);
    let fs = accessor(fs);

    let outcome = scan_with_report(&fs, &["/roms"], &[".nes"]).await.unwrap();
    assert_eq!(filenames(&outcome.records), vec!["a.nes", "c.nes"]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].path, "/roms/b.nes");
    assert!(matches!(
        outcome.skipped[0].error,
        RomError::PermissionDenied {
            operation: FsOperation::Stat,
            ..
        }
    ));
}

#[tokio::test]
async fn failing_subdirectory_stat_skips_only_that_subtree() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/good/a.nes", "a")
        .add_file("/roms/bad/b.nes", "b")
        .fail("/roms/bad", FsOperation::Stat, ErrorKind::Other);
    let fs = accessor(fs);

    let outcome = scan_with_report(&fs, &["/roms"], &[".nes"]).await.unwrap();
    assert_eq!(filenames(&outcome.records), vec!["a.nes"]);
    assert_eq!(outcome.skipped.len(), 1);
}

#[tokio::test]
async fn unlistable_subdirectory_fails_the_scan() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/ok/a.nes", "a")
        .add_file("/roms/locked/b.nes", "b")
        .add_file("/roms/also_ok/c.nes", "c")
        .fail("/roms/locked", FsOperation::List, ErrorKind::PermissionDenied);
    let fs = accessor(fs);

    let err = scan(&fs, &["/roms"], &[".nes"]).await.unwrap_err();
    match err {
        RomError::PermissionDenied { path, operation } => {
            assert_eq!(path, "/roms/locked");
            assert_eq!(operation, FsOperation::List);
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn unlistable_root_fails_even_when_other_roots_succeed() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/a/one.nes", "1")
        .add_file("/b/two.nes", "2")
        .fail("/b", FsOperation::List, ErrorKind::PermissionDenied);
    let fs = accessor(fs);

    let result = scan(&fs, &["/a", "/b"], &[".nes"]).await;
    assert!(matches!(result, Err(RomError::PermissionDenied { .. })));
}

#[tokio::test]
async fn multiple_roots_concatenate_in_order() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/first/z.gb", "z")
        .add_file("/second/a.gb", "a");
    let fs = accessor(fs);

    let records = scan(&fs, &["/first", "/missing", "/second"], &[".gb"])
        .await
        .unwrap();
    assert_eq!(filenames(&records), vec!["z.gb", "a.gb"]);
}

#[tokio::test]
async fn concurrency_of_one_still_completes() {
    let mut fs = MemoryFileSystem::new();
    for i in 0..20 {
        fs.add_file(&format!("/roms/dir{}/game{}.nes", i % 4, i), "x");
    }
    let fs = accessor(fs);

    let outcome = Scanner::new(&fs, &[".nes"])
        .with_max_concurrency(0)
        .scan(&["/roms"])
        .await
        .unwrap();
    assert_eq!(outcome.records.len(), 20);
}

#[tokio::test]
async fn directory_links_are_not_followed() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/roms/a.nes", "a")
        .add_link("/roms/loop", "/roms")
        .add_link("/roms/again", "/roms")
        .add_file("/other/b.nes", "b")
        .add_link("/roms/other", "/other");
    let fs = accessor(fs);

    let outcome = scan_with_report(&fs, &["/roms"], &[".nes"]).await.unwrap();
    assert_eq!(filenames(&outcome.records), vec!["a.nes"]);
    assert!(outcome.skipped.is_empty());
}

#[tokio::test]
async fn file_links_are_reported_like_files() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/store/zelda.nes", vec![0u8; 64])
        .add_link("/roms/zelda.nes", "/store/zelda.nes")
        .add_link("/roms/gone.nes", "/store/missing.nes");
    let fs = accessor(fs);

    let outcome = scan_with_report(&fs, &["/roms"], &[".nes"]).await.unwrap();
    assert_eq!(filenames(&outcome.records), vec!["zelda.nes"]);
    assert_eq!(outcome.records[0].path, "/roms/zelda.nes");
    assert_eq!(outcome.records[0].size_bytes, 64);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].path, "/roms/gone.nes");
    assert!(outcome.skipped[0].error.is_not_found());
}

#[tokio::test]
async fn linked_root_is_walked() {
    let mut fs = MemoryFileSystem::new();
    fs.add_file("/storage/roms/mario.nes", "m")
        .add_link("/roms", "/storage/roms");
    let fs = accessor(fs);

    let records = scan(&fs, &["/roms"], &[".nes"]).await.unwrap();
    assert_eq!(filenames(&records), vec!["mario.nes"]);
    assert_eq!(records[0].path, "/roms/mario.nes");
}

#[test]
fn extension_set_normalizes() {
    let set = extension_set(&["NES", ".Gb", "", "."]);
    assert_eq!(set.len(), 2);
    assert!(set.contains(".nes"));
    assert!(set.contains(".gb"));
}
