// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `FileSystem` port.
//!
//! Spec §1 treats the POSIX syscalls (`lstat`, `readlinkat`, `open`,
//! `read`, `write`, `utimensat`, `lchown`, `chmod`, `mkdir`, `symlinkat`,
//! `remove_all`) as an opaque "filesystem effectful" capability. This
//! trait is that capability, expressed so the scheduler and the worker
//! pools can be exercised against an in-memory fake instead of a real
//! filesystem. `treesync`'s infrastructure layer provides the one
//! production implementation, backed by `nix`.
//!
//! Every method is synchronous and blocking — the workers that call it
//! run on plain OS threads, not an async executor, so there's nothing to
//! `.await`.

use std::ffi::OsString;
use std::io;
use std::path::Path;

use crate::value_objects::{PosixStat, Timespec};

/// One entry yielded by [`FileSystem::read_dir`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub file_name: OsString,
}

/// Abstracts the POSIX operations a tree-sync run performs.
///
/// Implementations must be `Send + Sync`: the scheduler hands out `Arc<dyn
/// FileSystem>` to every reader and writer thread.
pub trait FileSystem: Send + Sync {
    /// `lstat(2)`. Returns `Ok(PosixStat::ABSENT)` (not an error) when the
    /// path simply doesn't exist; returns `Err` for any other failure
    /// (permission denied, broken path component, ...).
    fn lstat(&self, path: &Path) -> io::Result<PosixStat>;

    /// `readlinkat(2)`, capped at 4096 bytes plus a terminator per spec
    /// §6. Returns the raw target bytes (no terminator), since a link
    /// target need not be valid UTF-8.
    fn read_link(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads up to `len` bytes starting at `offset` from a regular file,
    /// opened `O_RDONLY | O_NOFOLLOW`. A short read (source truncated
    /// concurrently, for instance) is not an error at this layer — it
    /// simply returns fewer bytes than requested; the caller decides
    /// whether that's a logged failure.
    fn read_chunk(&self, path: &Path, offset: u64, len: u64) -> io::Result<Vec<u8>>;

    /// Creates (or truncates) a regular file at `path` with the given
    /// mode, sized to `size` bytes. Sparse/zero-filled allocation is
    /// acceptable per spec §4.3.
    fn create_regular(&self, path: &Path, mode: u32, size: u64) -> io::Result<()>;

    /// Writes `data` at `offset` into an existing regular file, opened
    /// `O_WRONLY` and positioned explicitly (no append semantics).
    /// Returns the number of bytes actually written.
    fn write_chunk(&self, path: &Path, offset: u64, data: &[u8]) -> io::Result<usize>;

    fn mkdir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// `symlinkat(2)`: creates a symlink at `path` pointing at `target`.
    fn symlink(&self, target: &[u8], path: &Path) -> io::Result<()>;

    /// Recursively removes whatever is at `path` (file, empty or
    /// non-empty directory, or symlink).
    fn remove_all(&self, path: &Path) -> io::Result<()>;

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// `utimensat(AT_SYMLINK_NOFOLLOW)`.
    fn set_times(&self, path: &Path, atime: Timespec, mtime: Timespec) -> io::Result<()>;

    /// `lchown(2)`.
    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> io::Result<()>;

    /// `chmod(2)`. Never called by treesync on a symlink target.
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;
}
