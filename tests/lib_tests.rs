//! End-to-end tests against the host filesystem. Expected totals come from an independent
//! sequential walk (walkdir, no link following) summing link-aware allocated blocks.
#![cfg(unix)]

use anyhow::Result;
use pardu::engine::run_with_opts;
use pardu::{DuOpts, Opts, RunStatus, TraversalError, disk_usage};
use std::ffi::CString;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{MetadataExt, PermissionsExt, symlink};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

fn opts(threads: usize) -> DuOpts {
    DuOpts {
        num_threads: Some(threads),
        report_denied: false,
    }
}

/// Sequential reference total: directories, files and symlinks; special files contribute 0.
fn oracle_blocks(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let ft = e.file_type();
            ft.is_dir() || ft.is_file() || ft.is_symlink()
        })
        .map(|e| fs::symlink_metadata(e.path()).map(|m| m.blocks()).unwrap_or(0))
        .sum()
}

/// A few levels of directories with files of assorted sizes.
fn build_tree(root: &Path) -> Result<()> {
    for (i, dir) in ["a", "a/b", "a/b/c", "d", "d/e", "empty"].iter().enumerate() {
        let dir = root.join(dir);
        fs::create_dir_all(&dir)?;
        for j in 0..3 {
            let len = (i + 1) * (j + 1) * 3000;
            fs::write(dir.join(format!("f{j}.bin")), vec![0xA5u8; len])?;
        }
    }
    fs::write(root.join("top.txt"), b"hello")?;
    Ok(())
}

fn mkfifo(path: &Path) -> Result<()> {
    let c = CString::new(path.as_os_str().as_bytes())?;
    let rc = unsafe { libc::mkfifo(c.as_ptr(), 0o644) };
    anyhow::ensure!(rc == 0, "mkfifo failed: {}", std::io::Error::last_os_error());
    Ok(())
}

// --- totals against the oracle ---

#[test]
fn test_matches_sequential_walk_for_thread_counts() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let expected = oracle_blocks(tmp.path());
    assert!(expected > 0);

    for threads in [1, 2, 4] {
        let report = disk_usage(&[tmp.path().to_path_buf()], &opts(threads))?;
        assert_eq!(report.totals[0].blocks, expected, "threads = {threads}");
        assert_eq!(report.status, RunStatus::Success);
    }
    Ok(())
}

#[test]
fn test_default_thread_count_matches() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let report = disk_usage(&[tmp.path().to_path_buf()], &DuOpts::default())?;
    assert!(report.threads >= 1);
    assert_eq!(report.totals[0].blocks, oracle_blocks(tmp.path()));
    Ok(())
}

#[test]
fn test_symlinks_not_followed() -> Result<()> {
    let tmp = TempDir::new()?;
    let data = tmp.path().join("data");
    let scan = tmp.path().join("scan");
    fs::create_dir_all(&data)?;
    fs::create_dir_all(&scan)?;
    fs::write(data.join("big.bin"), vec![1u8; 256 * 1024])?;
    symlink(&data, scan.join("to_data"))?;
    symlink(data.join("big.bin"), scan.join("to_big"))?;
    symlink(scan.join("missing"), scan.join("dangling"))?;

    let report = disk_usage(std::slice::from_ref(&scan), &opts(3))?;
    let expected = oracle_blocks(&scan);
    assert_eq!(report.totals[0].blocks, expected);
    assert!(report.totals[0].blocks < fs::metadata(data.join("big.bin"))?.blocks());
    Ok(())
}

#[test]
fn test_multiple_inputs_in_order() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let inputs = vec![
        tmp.path().join("d"),
        tmp.path().join("top.txt"),
        tmp.path().join("a"),
        tmp.path().join("empty"),
    ];
    let report = disk_usage(&inputs, &opts(4))?;
    assert_eq!(report.totals.len(), inputs.len());
    for (total, input) in report.totals.iter().zip(&inputs) {
        assert_eq!(&total.path, input);
        assert_eq!(total.blocks, oracle_blocks(input), "{}", input.display());
    }
    assert_eq!(
        report.totals[1].blocks,
        fs::symlink_metadata(&inputs[1])?.blocks()
    );
    Ok(())
}

#[test]
fn test_nested_input_counted_in_both() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let outer = tmp.path().join("a");
    let inner = tmp.path().join("a/b");
    let report = disk_usage(&[outer.clone(), inner.clone()], &opts(2))?;
    assert_eq!(report.totals[0].blocks, oracle_blocks(&outer));
    assert_eq!(report.totals[1].blocks, oracle_blocks(&inner));
    Ok(())
}

// --- special files and errors ---

#[test]
fn test_fifo_contributes_nothing() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let before = oracle_blocks(tmp.path());
    mkfifo(&tmp.path().join("a/pipe"))?;

    let report = disk_usage(&[tmp.path().to_path_buf()], &opts(2))?;
    assert_eq!(report.totals[0].blocks, before);
    assert_eq!(report.status, RunStatus::Success);
    Ok(())
}

#[test]
fn test_nonexistent_path_is_error() -> Result<()> {
    let tmp = TempDir::new()?;
    let missing = tmp.path().join("does-not-exist");
    let err = disk_usage(&[missing.clone()], &opts(2)).unwrap_err();
    match err.downcast_ref::<TraversalError>() {
        Some(TraversalError::Metadata { path, .. }) => assert_eq!(path, &missing),
        other => panic!("expected Metadata error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_unreadable_directory_counted_as_leaf() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let locked = tmp.path().join("d/e");
    let visible = oracle_blocks(tmp.path()) - oracle_blocks(&locked)
        + fs::symlink_metadata(&locked)?.blocks();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;
    // Permission bits do not bind root.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        eprintln!("skipping: directory still readable after chmod 000");
        return Ok(());
    }

    let result = disk_usage(&[tmp.path().to_path_buf()], &opts(3));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
    let report = result?;

    assert_eq!(report.totals[0].blocks, visible);
    assert_eq!(report.status, RunStatus::Failure);
    assert_eq!(report.denied, vec![locked]);
    Ok(())
}

#[test]
fn test_empty_input_list() -> Result<()> {
    let report = disk_usage(&[], &opts(4))?;
    assert!(report.totals.is_empty());
    assert_eq!(report.status, RunStatus::Success);
    Ok(())
}

#[test]
fn test_zero_threads_is_error() -> Result<()> {
    let tmp = TempDir::new()?;
    let err = disk_usage(&[tmp.path().to_path_buf()], &opts(0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TraversalError>(),
        Some(TraversalError::InvalidThreadCount(0))
    ));
    Ok(())
}

// --- CLI-level run ---

#[test]
fn test_run_with_opts_matches_lib() -> Result<()> {
    let tmp = TempDir::new()?;
    build_tree(tmp.path())?;
    let paths: Vec<PathBuf> = vec![tmp.path().join("a"), tmp.path().join("d")];
    let cli_opts = Opts {
        num_threads: Some(2),
        ..Default::default()
    };
    let via_cli = run_with_opts(&paths, &cli_opts)?;
    let via_lib = disk_usage(&paths, &opts(2))?;
    assert_eq!(via_cli.totals, via_lib.totals);
    Ok(())
}
