//! Options, settings file, CLI parsing and output formatting.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use pardu::engine::{Cli, build_opts, parse_jobs, write_line, write_report};
use pardu::pipeline::aggregate_statuses;
use pardu::utils::{
    WorkerThreadLimits, apply_file_to_opts, crate_level, load_pardu_toml, parse_pardu_toml,
};
use pardu::{DuOpts, DuReport, Opts, OriginTotal, RunStatus, WorkerStatus, resolve_threads};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_settings(dir: &TempDir, body: &str) -> Result<()> {
    fs::write(dir.path().join(".pardu.toml"), body)?;
    Ok(())
}

fn sample_report() -> DuReport {
    DuReport {
        totals: vec![
            OriginTotal {
                path: PathBuf::from("A"),
                blocks: 5,
            },
            OriginTotal {
                path: PathBuf::from("some dir/x"),
                blocks: 0,
            },
        ],
        status: RunStatus::Failure,
        denied: vec![PathBuf::from("A/C")],
        threads: 4,
    }
}

// --- settings file ---

#[test]
fn test_parse_settings_file() -> Result<()> {
    let file = parse_pardu_toml("[settings]\njobs = 3\nprogress = true\n")?;
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.num_threads, Some(3));
    assert!(opts.progress);
    assert!(!opts.verbose);
    assert!(!opts.json);
    Ok(())
}

#[test]
fn test_empty_settings_file_changes_nothing() -> Result<()> {
    let file = parse_pardu_toml("")?;
    let mut opts = Opts {
        num_threads: Some(9),
        verbose: true,
        ..Default::default()
    };
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.num_threads, Some(9));
    assert!(opts.verbose);
    Ok(())
}

#[test]
fn test_unknown_setting_rejected() {
    assert!(parse_pardu_toml("[settings]\nthreads = 2\n").is_err());
}

#[test]
fn test_malformed_settings_file_ignored() -> Result<()> {
    let tmp = TempDir::new()?;
    write_settings(&tmp, "[settings\njobs = ")?;
    assert!(load_pardu_toml(tmp.path()).is_none());
    Ok(())
}

#[test]
fn test_missing_settings_file() -> Result<()> {
    let tmp = TempDir::new()?;
    assert!(load_pardu_toml(tmp.path()).is_none());
    Ok(())
}

// --- precedence: defaults < file < CLI ---

#[test]
fn test_build_opts_defaults() -> Result<()> {
    let tmp = TempDir::new()?;
    let cli = Cli::try_parse_from(["pardu"])?;
    let opts = build_opts(&cli, tmp.path());
    assert_eq!(cli.paths, vec![PathBuf::from(".")]);
    assert_eq!(opts.num_threads, None);
    assert!(opts.report_denied);
    assert!(!opts.progress && !opts.json && !opts.verbose && !opts.trace);
    Ok(())
}

#[test]
fn test_file_overrides_defaults() -> Result<()> {
    let tmp = TempDir::new()?;
    write_settings(&tmp, "[settings]\njobs = 2\njson = true\n")?;
    let cli = Cli::try_parse_from(["pardu", "x"])?;
    let opts = build_opts(&cli, tmp.path());
    assert_eq!(opts.num_threads, Some(2));
    assert!(opts.json);
    Ok(())
}

#[test]
fn test_cli_overrides_file() -> Result<()> {
    let tmp = TempDir::new()?;
    write_settings(&tmp, "[settings]\njobs = 2\njson = true\nverbose = true\n")?;
    let cli = Cli::try_parse_from(["pardu", "-j", "7", "--json", "false", "a", "b"])?;
    let opts = build_opts(&cli, tmp.path());
    assert_eq!(opts.num_threads, Some(7));
    assert!(!opts.json);
    assert!(opts.verbose);
    assert_eq!(cli.paths, vec![PathBuf::from("a"), PathBuf::from("b")]);
    Ok(())
}

#[test]
fn test_bare_flag_means_true() -> Result<()> {
    let cli = Cli::try_parse_from(["pardu", "dir", "-v", "-p"])?;
    assert_eq!(cli.verbose, Some(true));
    assert_eq!(cli.progress, Some(true));
    assert_eq!(cli.trace, None);
    Ok(())
}

// --- thread count ---

#[test]
fn test_parse_jobs() {
    assert_eq!(parse_jobs("4"), Ok(4));
    assert_eq!(
        parse_jobs("four"),
        Err("number of threads was not a number: four".to_string())
    );
    assert_eq!(
        parse_jobs("-1"),
        Err("number of threads was not a number: -1".to_string())
    );
    assert_eq!(
        parse_jobs("0"),
        Err("number of threads must be at least 1".to_string())
    );
}

#[test]
fn test_cli_rejects_bad_jobs() {
    assert!(Cli::try_parse_from(["pardu", "-j", "0"]).is_err());
    assert!(Cli::try_parse_from(["pardu", "--jobs", "x"]).is_err());
}

#[test]
fn test_thread_limits_pick() {
    let limits = WorkerThreadLimits {
        all_threads: 8,
        floor: 1,
    };
    assert_eq!(limits.pick(None), 8);
    assert_eq!(limits.pick(Some(3)), 3);
    let none_available = WorkerThreadLimits {
        all_threads: 0,
        floor: 1,
    };
    assert_eq!(none_available.pick(None), 1);
}

#[test]
fn test_resolve_threads() {
    assert_eq!(resolve_threads(Some(0)), 0);
    assert_eq!(resolve_threads(Some(1)), 1);
    assert!(resolve_threads(None) >= 1);
}

#[test]
fn test_du_opts_into_opts() {
    let lib = DuOpts {
        num_threads: Some(5),
        report_denied: true,
    };
    let opts = Opts::from(&lib);
    assert_eq!(opts.num_threads, Some(5));
    assert!(opts.report_denied);
    assert!(!opts.progress);
}

// --- logging ---

#[test]
fn test_crate_level() {
    assert_eq!(crate_level(false, false), LevelFilter::Info);
    assert_eq!(crate_level(true, false), LevelFilter::Debug);
    assert_eq!(crate_level(false, true), LevelFilter::Trace);
    assert_eq!(crate_level(true, true), LevelFilter::Trace);
}

// --- status ---

#[test]
fn test_aggregate_statuses() {
    assert_eq!(aggregate_statuses(Vec::new()), RunStatus::Success);
    assert_eq!(
        aggregate_statuses([WorkerStatus::Success, WorkerStatus::Success]),
        RunStatus::Success
    );
    assert_eq!(
        aggregate_statuses([WorkerStatus::Success, WorkerStatus::Failure]),
        RunStatus::Failure
    );
    assert_eq!(aggregate_statuses([WorkerStatus::Aborted]), RunStatus::Failure);
}

#[test]
fn test_run_status_merge() {
    assert_eq!(RunStatus::Success.merge(RunStatus::Success), RunStatus::Success);
    assert_eq!(RunStatus::Failure.merge(RunStatus::Success), RunStatus::Failure);
    assert_eq!(RunStatus::Success.merge(RunStatus::Failure), RunStatus::Failure);
    assert!(!RunStatus::Failure.is_success());
}

// --- output ---

#[test]
fn test_write_line() -> Result<()> {
    let t = OriginTotal {
        path: PathBuf::from("some dir/x"),
        blocks: 42,
    };
    let mut out = Vec::new();
    write_line(&mut out, &t)?;
    assert_eq!(out, b"42\tsome dir/x\n");
    Ok(())
}

#[cfg(unix)]
fn non_utf8_path(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(unix)]
#[test]
fn test_write_line_keeps_raw_path_bytes() -> Result<()> {
    let t = OriginTotal {
        path: non_utf8_path(b"dir\xff"),
        blocks: 8,
    };
    let mut out = Vec::new();
    write_line(&mut out, &t)?;
    assert_eq!(out, b"8\tdir\xff\n");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_write_report_json_non_utf8_paths() -> Result<()> {
    let report = DuReport {
        totals: vec![OriginTotal {
            path: non_utf8_path(b"dir\xff"),
            blocks: 8,
        }],
        status: RunStatus::Failure,
        denied: vec![non_utf8_path(b"dir\xff/locked\xfe")],
        threads: 1,
    };
    let mut out = Vec::new();
    write_report(&mut out, &report, true)?;
    let v: serde_json::Value = serde_json::from_slice(&out)?;
    assert_eq!(v["totals"][0]["path"], "dir\u{FFFD}");
    assert_eq!(v["totals"][0]["blocks"], 8);
    assert_eq!(v["denied"][0], "dir\u{FFFD}/locked\u{FFFD}");
    Ok(())
}

#[test]
fn test_write_report_plain() -> Result<()> {
    let mut out = Vec::new();
    write_report(&mut out, &sample_report(), false)?;
    assert_eq!(String::from_utf8(out)?, "5\tA\n0\tsome dir/x\n");
    Ok(())
}

#[test]
fn test_write_report_json() -> Result<()> {
    let mut out = Vec::new();
    write_report(&mut out, &sample_report(), true)?;
    let v: serde_json::Value = serde_json::from_slice(&out)?;
    assert_eq!(v["status"], "failure");
    assert_eq!(v["threads"], 4);
    assert_eq!(v["totals"][0]["path"], "A");
    assert_eq!(v["totals"][0]["blocks"], 5);
    assert_eq!(v["denied"][0], "A/C");
    Ok(())
}
