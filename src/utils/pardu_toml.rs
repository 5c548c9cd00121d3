//! Load `.pardu.toml` from a directory (CLI only). Lib callers pass [`DuOpts`](crate::DuOpts) instead.

use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct ParduToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    jobs: Option<usize>,
    verbose: Option<bool>,
    trace: Option<bool>,
    progress: Option<bool>,
    json: Option<bool>,
}

/// Parse settings file contents.
pub fn parse_pardu_toml(s: &str) -> Result<ParduToml, toml::de::Error> {
    toml::from_str(s)
}

/// Load the settings file from `dir` if present. Returns None if the file is missing,
/// unreadable or malformed (malformed files are reported as a warning).
pub fn load_pardu_toml(dir: &Path) -> Option<ParduToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_pardu_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &ParduToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(jobs) = s.jobs {
        opts.num_threads = Some(jobs);
    }
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, trace => trace);
    apply_file_opt!(s, opts, progress => progress);
    apply_file_opt!(s, opts, json => json);
}
