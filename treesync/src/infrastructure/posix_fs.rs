// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The production [`FileSystem`] implementation, backed directly by
//! POSIX syscalls via the `nix` crate.
//!
//! Mirrors `fastsync`'s `ModReader`/`ModWriter`, which call these
//! same syscalls (`lstat`, `readlinkat`, chunked positioned I/O,
//! `mkdir`, `symlinkat`, `utimensat`, `lchown`, `chmod`) directly
//! against raw file descriptors. Here the descriptor juggling for
//! positioned chunk I/O goes through `std::fs::File` and
//! `std::os::unix::fs::FileExt`, which wrap the same `pread`/`pwrite`
//! calls without the manual `lseek` bookkeeping the C++ original needed.

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::path::Path;

use nix::errno::Errno;
use nix::sys::stat::{fchmodat, utimensat, FchmodatFlags, FileStat, Mode, UtimensatFlags};
use nix::unistd::{fchownat, mkdir as nix_mkdir, symlinkat, FchownatFlags, Gid, Uid};

use treesync_domain::{DirEntry, FileSystem, PosixStat, Timespec};

pub struct PosixFileSystem;

impl PosixFileSystem {
    pub fn new() -> Self {
        PosixFileSystem
    }
}

impl Default for PosixFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn to_io_error(err: Errno) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}

fn stat_to_posix(stat: FileStat) -> PosixStat {
    PosixStat {
        mode: stat.st_mode as u32,
        size: stat.st_size as u64,
        uid: stat.st_uid,
        gid: stat.st_gid,
        atime: Timespec::new(stat.st_atime as i64, stat.st_atime_nsec as i64),
        mtime: Timespec::new(stat.st_mtime as i64, stat.st_mtime_nsec as i64),
        ino: stat.st_ino,
    }
}

impl FileSystem for PosixFileSystem {
    fn lstat(&self, path: &Path) -> io::Result<PosixStat> {
        match nix::sys::stat::lstat(path) {
            Ok(stat) => Ok(stat_to_posix(stat)),
            Err(Errno::ENOENT) => Ok(PosixStat::ABSENT),
            Err(e) => Err(to_io_error(e)),
        }
    }

    fn read_link(&self, path: &Path) -> io::Result<Vec<u8>> {
        let target = std::fs::read_link(path)?;
        let mut bytes = target.as_os_str().as_bytes().to_vec();
        bytes.truncate(4096);
        Ok(bytes)
    }

    fn read_chunk(&self, path: &Path, offset: u64, len: u64) -> io::Result<Vec<u8>> {
        let file = OpenOptions::new().read(true).custom_flags(libc::O_NOFOLLOW).open(path)?;
        let mut buf = vec![0u8; len as usize];
        let read = file.read_at(&mut buf, offset)?;
        buf.truncate(read);
        Ok(buf)
    }

    fn create_regular(&self, path: &Path, mode: u32, size: u64) -> io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode & 0o7777)
            .custom_flags(libc::O_NOFOLLOW)
            .open(path)?;
        file.set_len(size)
    }

    fn write_chunk(&self, path: &Path, offset: u64, data: &[u8]) -> io::Result<usize> {
        let file = OpenOptions::new().write(true).custom_flags(libc::O_NOFOLLOW).open(path)?;
        file.write_at(data, offset)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> io::Result<()> {
        nix_mkdir(path, Mode::from_bits_truncate(mode & 0o7777)).map_err(to_io_error)
    }

    fn symlink(&self, target: &[u8], path: &Path) -> io::Result<()> {
        let target_path: &Path = OsStr::from_bytes(target).as_ref();
        symlinkat(target_path, None, path).map_err(to_io_error)
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(DirEntry { file_name: entry?.file_name() });
        }
        Ok(entries)
    }

    fn set_times(&self, path: &Path, atime: Timespec, mtime: Timespec) -> io::Result<()> {
        let atime = nix::sys::time::TimeSpec::new(atime.sec, atime.nsec);
        let mtime = nix::sys::time::TimeSpec::new(mtime.sec, mtime.nsec);
        utimensat(None, path, &atime, &mtime, UtimensatFlags::NoFollowSymlink).map_err(to_io_error)
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> io::Result<()> {
        fchownat(None, path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)), FchownatFlags::NoFollowSymlink)
            .map_err(to_io_error)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        fchmodat(None, path, Mode::from_bits_truncate(mode & 0o7777), FchmodatFlags::FollowSymlink).map_err(to_io_error)
    }
}
