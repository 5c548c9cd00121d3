pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod pardu_toml;

pub use config::*;
pub use fd_limit::{
    FDS_PER_WORKER, determine_threads_given_fd_limit, max_open_fds, max_workers_by_fd_limit,
};
pub use logger::{crate_level, setup_logging};
pub use pardu_toml::{ParduToml, apply_file_to_opts, load_pardu_toml, parse_pardu_toml};
