//! Result printing: one `<blocks>\t<path>` line per input path, in input order, or JSON.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::{DuReport, OriginTotal};

/// Path bytes exactly as the OS gave them, so names that are not UTF-8 round-trip.
#[cfg(unix)]
fn write_path<W: Write>(out: &mut W, path: &Path) -> std::io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    out.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(out: &mut W, path: &Path) -> std::io::Result<()> {
    write!(out, "{}", path.display())
}

/// Write `<blocks>\t<path>\n`.
pub fn write_line<W: Write>(out: &mut W, total: &OriginTotal) -> std::io::Result<()> {
    write!(out, "{}\t", total.blocks)?;
    write_path(out, &total.path)?;
    writeln!(out)
}

pub fn write_report<W: Write>(out: &mut W, report: &DuReport, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report).context("serialize report")?;
        writeln!(out).context("write report")?;
    } else {
        for total in &report.totals {
            write_line(out, total).context("write report")?;
        }
    }
    out.flush().context("flush report")
}
