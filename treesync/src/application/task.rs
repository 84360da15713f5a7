// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The unit of work that flows open -> read -> written.
//!
//! A `Task` is the "exclusive handle" spec §4 describes: rather than
//! sharing a `Job` behind a lock, the scheduler copies out exactly the
//! fields a phase needs, hands the `Task` to a reader and then a writer
//! in sequence, and folds the results back into its own `Job` record
//! once the task reappears on the written queue. No two threads ever
//! touch the same `Task` at once, so no lock is needed on it either.

use std::path::PathBuf;

use treesync_domain::{JobId, PosixStat};

/// Which phase of a job this task carries out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Init,
    Chunk(usize),
    Attributes,
}

/// One unit of pipeline work.
///
/// `source_stat` and `dest_stat` start out as whatever the scheduler
/// last cached on the `Job` (meaningless for a fresh INIT task, which
/// is why the reader fills `source_stat` in rather than trusting it).
/// `payload` carries chunk bytes or a symlink target, depending on
/// `kind`. `outcome` is the phase's error report, folded into the
/// job's `JobLog` on completion.
pub struct Task {
    pub kind: TaskKind,
    pub job: JobId,
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    pub source_stat: PosixStat,
    pub dest_stat: PosixStat,
    pub payload: Vec<u8>,
    pub outcome: TaskOutcome,
}

impl Task {
    pub fn init(job: JobId, source_path: PathBuf, dest_path: PathBuf) -> Self {
        Task {
            kind: TaskKind::Init,
            job,
            source_path,
            dest_path,
            source_stat: PosixStat::ABSENT,
            dest_stat: PosixStat::ABSENT,
            payload: Vec::new(),
            outcome: TaskOutcome::default(),
        }
    }

    pub fn chunk(
        job: JobId,
        index: usize,
        source_path: PathBuf,
        dest_path: PathBuf,
        source_stat: PosixStat,
    ) -> Self {
        Task {
            kind: TaskKind::Chunk(index),
            job,
            source_path,
            dest_path,
            source_stat,
            dest_stat: PosixStat::ABSENT,
            payload: Vec::new(),
            outcome: TaskOutcome::default(),
        }
    }

    pub fn attributes(
        job: JobId,
        source_path: PathBuf,
        dest_path: PathBuf,
        source_stat: PosixStat,
        dest_stat: PosixStat,
    ) -> Self {
        Task {
            kind: TaskKind::Attributes,
            job,
            source_path,
            dest_path,
            source_stat,
            dest_stat,
            payload: Vec::new(),
            outcome: TaskOutcome::default(),
        }
    }

    pub fn chunk_index(&self) -> Option<usize> {
        match self.kind {
            TaskKind::Chunk(idx) => Some(idx),
            _ => None,
        }
    }
}

/// Phase-local error flags, one per `Job::Log` field from the original
/// `fastsync` job model. Never fatal; folded into `JobLog` and only
/// ever reported, never consulted for scheduling decisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskOutcome {
    pub stat_source: bool,
    pub source_type: bool,
    pub readlink: bool,
    pub delete_old: bool,
    pub create_dest: bool,
    pub read_chunk: bool,
    pub write_chunk: bool,
    pub delete_dir_contents: bool,
    pub set_times: bool,
    pub set_owner: bool,
    pub set_mode: bool,
}

impl TaskOutcome {
    pub fn has_any_error(&self) -> bool {
        self.stat_source
            || self.source_type
            || self.readlink
            || self.delete_old
            || self.create_dest
            || self.read_chunk
            || self.write_chunk
            || self.delete_dir_contents
            || self.set_times
            || self.set_owner
            || self.set_mode
    }
}
