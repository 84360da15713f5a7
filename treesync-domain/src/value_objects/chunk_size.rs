// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;

/// The fixed-size byte range a regular file is split into for CHUNK
/// tasks.
///
/// `ChunkSize` is process-wide: every job in a run shares the same
/// value, set once from the CLI's `CHUNK_MB` argument (or the 64 MiB
/// default) before the scheduler starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSize {
    bytes: u64,
}

/// One megabyte, as the CLI's `CHUNK_MB` multiplier.
const MIB: u64 = 1024 * 1024;

impl ChunkSize {
    /// Default chunk size: 64 MiB.
    pub const DEFAULT: ChunkSize = ChunkSize { bytes: 64 * MIB };

    /// Builds a chunk size directly from a byte count. Rejects zero: a
    /// zero-size chunk would divide a non-empty file into infinitely many
    /// chunks.
    pub fn from_bytes(bytes: u64) -> Result<Self, String> {
        if bytes == 0 {
            return Err("chunk size must be greater than zero".to_string());
        }
        Ok(Self { bytes })
    }

    /// Builds a chunk size from the CLI's `CHUNK_MB` argument.
    pub fn from_mb(mb: u64) -> Result<Self, String> {
        if mb == 0 {
            return Err("CHUNK_MB must be a positive integer".to_string());
        }
        Ok(Self { bytes: mb * MIB })
    }

    pub fn bytes(self) -> u64 {
        self.bytes
    }

    /// Number of chunks a file of the given size is split into:
    /// `ceil(size / chunk_size)`. A zero-byte file has zero chunks.
    pub fn chunk_count(self, file_size: u64) -> usize {
        if file_size == 0 {
            return 0;
        }
        ((file_size + self.bytes - 1) / self.bytes) as usize
    }

    /// Byte offset of chunk `index` within the file.
    pub fn offset_of(self, index: usize) -> u64 {
        index as u64 * self.bytes
    }

    /// Length of chunk `index` for a file of `file_size` bytes: the full
    /// chunk size, except for the final (possibly short) chunk.
    pub fn length_of(self, index: usize, file_size: u64) -> u64 {
        let start = self.offset_of(index);
        self.bytes.min(file_size.saturating_sub(start))
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize::DEFAULT
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MiB", self.bytes / MIB)
    }
}
