// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use super::EntryKind;

/// A POSIX timestamp with second and nanosecond components, mirroring
/// `struct timespec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: i64,
}

impl Timespec {
    pub const fn new(sec: i64, nsec: i64) -> Self {
        Self { sec, nsec }
    }
}

/// A cached `lstat(2)` result.
///
/// `ino == 0` is the sentinel for "this path does not exist" — the same
/// convention the job model uses for an absent destination, so a missing
/// entry never needs to be represented as `Option<PosixStat>` at the call
/// sites that only care about existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PosixStat {
    pub mode: u32,
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub atime: Timespec,
    pub mtime: Timespec,
    pub ino: u64,
}

impl PosixStat {
    /// The "does not exist" value: zero inode, otherwise zeroed.
    pub const ABSENT: PosixStat = PosixStat {
        mode: 0,
        size: 0,
        uid: 0,
        gid: 0,
        atime: Timespec::new(0, 0),
        mtime: Timespec::new(0, 0),
        ino: 0,
    };

    pub fn exists(&self) -> bool {
        self.ino != 0
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mode(self.mode)
    }

    /// The short-circuit test from spec §4.4: a regular file or symlink
    /// job is destroyed right after INIT, with no CHUNK or ATTRIBUTES
    /// work, when the destination already agrees with the source on
    /// type, size, `mtime.tv_sec` (seconds only — see Open Questions),
    /// uid, and gid.
    pub fn matches_for_short_circuit(&self, other: &PosixStat) -> bool {
        self.exists()
            && other.exists()
            && self.kind() == other.kind()
            && self.size == other.size
            && self.mtime.sec == other.mtime.sec
            && self.uid == other.uid
            && self.gid == other.gid
    }

    /// Whether destination timestamps need `utimensat` to converge.
    pub fn times_differ(&self, dest: &PosixStat) -> bool {
        self.mtime != dest.mtime || self.atime != dest.atime
    }

    /// Whether destination ownership needs `lchown` to converge.
    pub fn owner_differs(&self, dest: &PosixStat) -> bool {
        self.uid != dest.uid || self.gid != dest.gid
    }

    /// Whether destination mode needs `chmod` to converge. Symlink mode
    /// is never adjusted: most platforms have no meaningful per-link
    /// permission bits.
    pub fn mode_differs(&self, dest: &PosixStat) -> bool {
        !self.kind().is_symlink() && self.mode != dest.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(kind_mode: u32, size: u64, mtime_sec: i64, uid: u32, gid: u32) -> PosixStat {
        PosixStat {
            mode: kind_mode,
            size,
            uid,
            gid,
            atime: Timespec::new(mtime_sec, 0),
            mtime: Timespec::new(mtime_sec, 0),
            ino: 1,
        }
    }

    #[test]
    fn absent_never_short_circuits() {
        let src = stat(0o100644, 10, 100, 0, 0);
        assert!(!src.matches_for_short_circuit(&PosixStat::ABSENT));
        assert!(!PosixStat::ABSENT.matches_for_short_circuit(&src));
    }

    #[test]
    fn short_circuit_ignores_nanoseconds() {
        let mut src = stat(0o100644, 10, 100, 0, 0);
        let mut dest = src;
        src.mtime.nsec = 500;
        dest.mtime.nsec = 999;
        assert!(src.matches_for_short_circuit(&dest));
    }

    #[test]
    fn short_circuit_requires_same_type() {
        let src = stat(0o100644, 10, 100, 0, 0);
        let dest = stat(0o040755, 10, 100, 0, 0);
        assert!(!src.matches_for_short_circuit(&dest));
    }

    #[test]
    fn mode_differs_is_false_for_symlinks() {
        let src = stat(0o120777, 5, 1, 0, 0);
        let mut dest = src;
        dest.mode = 0o120700;
        assert!(!src.mode_differs(&dest));
    }
}
