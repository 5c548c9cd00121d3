use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const PATH: &'static str = ".";
}

/// Parallel disk usage: allocated blocks under each PATH.
#[derive(Clone, Debug, Parser)]
#[command(name = "pardu")]
#[command(about = "Sum allocated blocks under each PATH using a pool of worker threads.")]
pub struct Cli {
    /// Paths to measure. Default: current directory.
    #[arg(value_name = "PATH", default_value = DefaultArgs::PATH, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Number of worker threads. Default: available threads (capped by the open-file limit).
    #[arg(long, short = 'j', value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Trace every queue push/pop and classification (very noisy).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub trace: Option<bool>,

    /// Show a counter of sized entries on stderr.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Print the report as JSON.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,
}

/// Worker count must be a plain positive integer.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("number of threads was not a number: {s}"));
    }
    let n: usize = s
        .parse()
        .map_err(|e| format!("invalid number of threads {s}: {e}"))?;
    if n < 1 {
        return Err("number of threads must be at least 1".to_string());
    }
    Ok(n)
}
