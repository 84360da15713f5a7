// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use std::path::PathBuf;

use super::{ChunkSize, WorkerCount};

/// A validated, ready-to-run configuration: the CLI's `SOURCE DEST
/// [READERS [WRITERS [CHUNK_MB]]]` contract after parsing and bounds
/// checking, independent of how `clap` happened to phrase the failure.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub readers: WorkerCount,
    pub writers: WorkerCount,
    pub chunk_size: ChunkSize,
}

impl RunConfig {
    pub fn new(source: PathBuf, dest: PathBuf, readers: WorkerCount, writers: WorkerCount, chunk_size: ChunkSize) -> Self {
        Self {
            source,
            dest,
            readers,
            writers,
            chunk_size,
        }
    }

    /// Queue capacity per spec §4.1: `2 * max(readers, writers)`, so each
    /// worker can hold one in-flight item and still find another ready.
    pub fn queue_capacity(&self) -> usize {
        2 * self.readers.get().max(self.writers.get())
    }
}
