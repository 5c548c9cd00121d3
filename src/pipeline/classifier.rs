//! Resource classification: what a path is, whether it may be read, and how many blocks it
//! occupies. Metadata is always link-aware; symlinks are never dereferenced.
//!
//! Raw filesystem access goes through [`FsProbe`] so the engine can run against the host
//! filesystem ([`LocalFs`]) or any other source of stat-like metadata.

use std::ffi::OsString;
use std::fs::{self, ReadDir};
use std::io;
use std::path::Path;

use crate::error::TraversalError;

/// Size unit used when the platform reports no allocated-block count.
pub const FALLBACK_BLOCK_SIZE: u64 = 512;

/// File type as reported by link-aware metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Symlink,
    /// Character/block device, FIFO, socket.
    Special,
    /// Mode bits matched nothing known.
    Other,
}

/// Link-aware metadata for one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatInfo {
    pub kind: FileKind,
    /// Allocated blocks, not logical length.
    pub blocks: u64,
}

/// Filesystem primitives consumed by the engine.
pub trait FsProbe: Send + Sync {
    /// Open directory handle, yielding child names. May yield `.` and `..`; callers skip them.
    type Dir: Iterator<Item = io::Result<OsString>>;

    /// Link-aware metadata (`lstat`).
    fn stat(&self, path: &Path) -> io::Result<StatInfo>;

    /// Whether the current process may read `path`.
    fn is_readable(&self, path: &Path) -> bool;

    fn open_dir(&self, path: &Path) -> io::Result<Self::Dir>;
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

/// Child-name iterator over a [`ReadDir`].
#[derive(Debug)]
pub struct LocalDir(ReadDir);

impl Iterator for LocalDir {
    type Item = io::Result<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.map(|e| e.file_name()))
    }
}

impl FsProbe for LocalFs {
    type Dir = LocalDir;

    fn stat(&self, path: &Path) -> io::Result<StatInfo> {
        let meta = fs::symlink_metadata(path)?;
        Ok(StatInfo {
            kind: file_kind(&meta.file_type()),
            blocks: allocated_blocks(&meta),
        })
    }

    #[cfg(unix)]
    fn is_readable(&self, path: &Path) -> bool {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;
        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        unsafe { libc::access(c_path.as_ptr(), libc::R_OK) == 0 }
    }

    #[cfg(not(unix))]
    fn is_readable(&self, _path: &Path) -> bool {
        true
    }

    fn open_dir(&self, path: &Path) -> io::Result<LocalDir> {
        fs::read_dir(path).map(LocalDir)
    }
}

#[cfg(unix)]
fn file_kind(ft: &fs::FileType) -> FileKind {
    use std::os::unix::fs::FileTypeExt;
    if ft.is_symlink() {
        FileKind::Symlink
    } else if ft.is_dir() {
        FileKind::Directory
    } else if ft.is_file() {
        FileKind::Regular
    } else if ft.is_char_device() || ft.is_block_device() || ft.is_fifo() || ft.is_socket() {
        FileKind::Special
    } else {
        FileKind::Other
    }
}

#[cfg(not(unix))]
fn file_kind(ft: &fs::FileType) -> FileKind {
    if ft.is_symlink() {
        FileKind::Symlink
    } else if ft.is_dir() {
        FileKind::Directory
    } else if ft.is_file() {
        FileKind::Regular
    } else {
        FileKind::Other
    }
}

#[cfg(unix)]
fn allocated_blocks(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.blocks()
}

#[cfg(not(unix))]
fn allocated_blocks(meta: &fs::Metadata) -> u64 {
    meta.len().div_ceil(FALLBACK_BLOCK_SIZE)
}

/// What the worker does with a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
    Symlink,
    /// Devices, FIFOs, sockets: no size, no traversal.
    Ignorable,
    /// Should never happen for a stat-able path; the run is aborted.
    Unknown,
}

impl From<FileKind> for ResourceKind {
    fn from(k: FileKind) -> Self {
        match k {
            FileKind::Regular => ResourceKind::File,
            FileKind::Directory => ResourceKind::Directory,
            FileKind::Symlink => ResourceKind::Symlink,
            FileKind::Special => ResourceKind::Ignorable,
            FileKind::Other => ResourceKind::Unknown,
        }
    }
}

/// Classification of one path, computed fresh and never persisted.
#[derive(Debug)]
pub struct ResourceDescriptor<D> {
    pub kind: ResourceKind,
    pub permission_denied: bool,
    /// Present only for a directory that was opened for enumeration.
    pub handle: Option<D>,
    blocks: u64,
}

impl<D> ResourceDescriptor<D> {
    /// Allocated blocks of the object itself (never its children).
    pub fn size(&self) -> u64 {
        self.blocks
    }
}

/// Result of looking up a path.
#[derive(Debug)]
pub enum Lookup<D> {
    Resource(ResourceDescriptor<D>),
    /// `stat` itself was refused (parent not searchable). Nothing to size.
    Inaccessible,
}

/// Classify `path` without following symlinks.
///
/// Readable directories come back with an open handle; unreadable ones come back as
/// `Directory` with `permission_denied` set and no handle. Metadata failures other than
/// permission denial are fatal.
pub fn classify<P: FsProbe>(
    probe: &P,
    path: &Path,
) -> Result<Lookup<P::Dir>, TraversalError> {
    let stat = match probe.stat(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Ok(Lookup::Inaccessible),
        Err(e) => return Err(TraversalError::metadata(path, e)),
    };
    let kind = ResourceKind::from(stat.kind);
    let readable = probe.is_readable(path);

    let mut desc = ResourceDescriptor {
        kind,
        permission_denied: !readable,
        handle: None,
        blocks: stat.blocks,
    };

    if kind == ResourceKind::Directory && readable {
        match probe.open_dir(path) {
            Ok(dir) => desc.handle = Some(dir),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => desc.permission_denied = true,
            Err(e) => return Err(TraversalError::read_dir(path, e)),
        }
    }
    Ok(Lookup::Resource(desc))
}

/// `.` and `..` pseudo-entries.
pub fn is_dot_entry(name: &std::ffi::OsStr) -> bool {
    name == "." || name == ".."
}
