//! CLI command handler: measure every PATH, print totals, report the run status.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::engine::arg_parser::Cli;
use crate::engine::output::write_report;
use crate::engine::progress::start_progress;
use crate::pipeline::{
    LocalFs, LogObserver, NoopObserver, ObserverSet, PipelineConfig, TraversalObserver,
    run_pipeline, summarize_denied,
};
use crate::utils::{apply_file_to_opts, load_pardu_toml, setup_logging};
use crate::{DuReport, Opts, RunStatus, resolve_threads};

/// Overwrite opts with every flag given on the command line.
pub fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if let Some(jobs) = cli.jobs {
        opts.num_threads = Some(jobs);
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if let Some(v) = cli.trace {
        opts.trace = v;
    }
    if let Some(v) = cli.progress {
        opts.progress = v;
    }
    if let Some(v) = cli.json {
        opts.json = v;
    }
}

/// Defaults, then `.pardu.toml` in `config_dir`, then CLI flags.
pub fn build_opts(cli: &Cli, config_dir: &Path) -> Opts {
    let mut opts = Opts {
        report_denied: true,
        ..Default::default()
    };
    if let Some(file) = load_pardu_toml(config_dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    opts
}

fn setup_opts(cli: &Cli) -> Opts {
    let opts = build_opts(cli, Path::new("."));
    setup_logging(opts.verbose, opts.trace);
    opts
}

/// Run the pipeline over `paths` on the host filesystem with full CLI options
/// (trace observer, progress counter).
pub fn run_with_opts(paths: &[PathBuf], opts: &Opts) -> Result<DuReport> {
    let config = PipelineConfig {
        num_threads: resolve_threads(opts.num_threads),
        report_denied: opts.report_denied,
    };
    debug!(
        "{} CONFIG: {:?}, {:?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts,
        config
    );

    let mut observers: Vec<Box<dyn TraversalObserver>> = Vec::new();
    if opts.trace {
        observers.push(Box::new(LogObserver));
    }
    let progress = opts.progress.then(|| {
        let (observer, handle) = start_progress();
        observers.push(Box::new(observer));
        handle
    });
    let observer: Box<dyn TraversalObserver> = if observers.is_empty() {
        Box::new(NoopObserver)
    } else {
        Box::new(ObserverSet(observers))
    };

    // The observer is dropped with the pipeline state, which closes the progress channel.
    let report = run_pipeline(paths, &config, LocalFs, observer);
    if let Some(handle) = progress {
        handle.finish();
    }
    Ok(report?)
}

/// Measure every PATH and print one total per line. Returns the run status for the exit code.
pub fn handle_run(cli: &Cli) -> Result<RunStatus> {
    let opts = setup_opts(cli);
    let report = run_with_opts(&cli.paths, &opts)?;
    summarize_denied(&report.denied, opts.verbose);
    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &report, opts.json)?;
    debug!("Run status: {:?}", report.status);
    Ok(report.status)
}
