//! CLI-facing glue: argument parsing, run handler, result printing and progress display.

pub mod arg_parser;
pub mod handlers;
pub mod output;
pub mod progress;

// Re-export commonly used functions
pub use arg_parser::{Cli, parse_jobs};
pub use handlers::{apply_cli_to_opts, build_opts, handle_run, run_with_opts};
pub use output::{write_line, write_report};
pub use progress::{ProgressHandle, ProgressObserver, start_progress};
