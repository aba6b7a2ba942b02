// tests/scan_stream.rs

mod common;

use common::create_file;
use fsbundle::{scan, CancellationToken, ScanLimits};
use tempfile::tempdir;

#[test]
fn test_gitignored_files_never_emitted() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    create_file(temp.path(), ".gitignore", b"*.log\n");
    create_file(temp.path(), "keep.txt", b"keep");
    create_file(temp.path(), "nested/also.txt", b"also");
    create_file(temp.path(), "app.log", b"log");
    create_file(temp.path(), "nested/deep.log", b"log");

    let token = CancellationToken::new();
    let handle = scan(temp.path(), &[], ScanLimits::default(), &token)?;

    let mut names = Vec::new();
    for batch in handle.batches().iter() {
        names.extend(batch.files.iter().map(|f| f.name.clone()));
        if batch.is_complete {
            break;
        }
    }

    assert!(!names.iter().any(|n| n.ends_with(".log")));
    assert!(names.contains(&"keep.txt".to_string()));
    assert!(names.contains(&"also.txt".to_string()));
    Ok(())
}

#[test]
fn test_caller_patterns_exclude_like_gitignore() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    create_file(temp.path(), "keep.txt", b"keep");
    create_file(temp.path(), "scratch.tmp", b"tmp");

    let token = CancellationToken::new();
    let handle = scan(
        temp.path(),
        &["*.tmp".to_string()],
        ScanLimits::default(),
        &token,
    )?;

    let mut names = Vec::new();
    for batch in handle.batches().iter() {
        names.extend(batch.files.iter().map(|f| f.name.clone()));
        if batch.is_complete {
            break;
        }
    }
    assert_eq!(names, vec!["keep.txt".to_string()]);
    Ok(())
}

#[test]
fn test_cancelled_scan_emits_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    for i in 0..20 {
        create_file(temp.path(), &format!("dir{}/file.txt", i), b"x");
    }

    let token = CancellationToken::new();
    token.cancel();
    let handle = scan(temp.path(), &[], ScanLimits::default(), &token)?;

    // The scan thread observes cancellation at its first scheduling step and
    // exits without emitting; the channel closes with no batches.
    let batches: Vec<_> = handle.batches().iter().collect();
    assert!(batches.is_empty());
    Ok(())
}

#[test]
fn test_classification_recorded_on_batch_records() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    create_file(temp.path(), "doc.txt", b"text");
    create_file(temp.path(), "photo.png", &[0x89, 0x50, 0x4E, 0x47]);
    create_file(temp.path(), "module.dylib", b"native");

    let token = CancellationToken::new();
    let handle = scan(temp.path(), &[], ScanLimits::default(), &token)?;

    let mut records = Vec::new();
    for batch in handle.batches().iter() {
        records.extend(batch.files);
        if batch.is_complete {
            break;
        }
    }

    let doc = records.iter().find(|r| r.name == "doc.txt").unwrap();
    assert!(!doc.is_binary && !doc.is_skipped);
    assert_eq!(doc.file_type, "TXT");
    assert!(!doc.is_content_loaded);

    let photo = records.iter().find(|r| r.name == "photo.png").unwrap();
    assert!(photo.is_binary && !photo.is_skipped);

    let module = records.iter().find(|r| r.name == "module.dylib").unwrap();
    assert!(module.is_binary && module.is_skipped);
    assert_eq!(module.error.as_deref(), Some("Special file type skipped"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_does_not_abort() -> Result<(), Box<dyn std::error::Error>> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir()?;
    create_file(temp.path(), "visible.txt", b"v");
    create_file(temp.path(), "locked/hidden.txt", b"h");

    let locked = temp.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    let token = CancellationToken::new();
    let handle = scan(temp.path(), &[], ScanLimits::default(), &token)?;

    let mut names = Vec::new();
    let mut completed = false;
    for batch in handle.batches().iter() {
        names.extend(batch.files.iter().map(|f| f.name.clone()));
        if batch.is_complete {
            completed = true;
            break;
        }
    }

    // Restore permissions so the tempdir can clean up.
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

    assert!(completed, "scan must reach its terminal batch");
    assert!(names.contains(&"visible.txt".to_string()));
    assert!(!names.contains(&"hidden.txt".to_string()));
    Ok(())
}
