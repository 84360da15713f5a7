// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The per-entry job record and its phase state machine.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::value_objects::{ChunkSize, JobId, PhaseState, PosixStat};

/// Per-phase failure flags, reported to the user but never consulted by
/// scheduling logic (spec §7).
///
/// One-to-one with the original implementation's `Job::Log` struct: every
/// field here is a fact about *this* job only, never a signal that
/// changes what the scheduler does next.
#[derive(Debug, Clone, Default)]
pub struct JobLog {
    pub stat_source: bool,
    pub source_type: bool,
    pub readlink: bool,
    pub delete_old: bool,
    pub create_dest: bool,
    pub read_chunk: Vec<bool>,
    pub write_chunk: Vec<bool>,
    pub delete_dir_contents: bool,
    pub set_times: bool,
    pub set_owner: bool,
    pub set_mode: bool,
}

impl JobLog {
    pub fn has_any_error(&self) -> bool {
        self.stat_source
            || self.source_type
            || self.readlink
            || self.delete_old
            || self.create_dest
            || self.read_chunk.iter().any(|&e| e)
            || self.write_chunk.iter().any(|&e| e)
            || self.delete_dir_contents
            || self.set_times
            || self.set_owner
            || self.set_mode
    }
}

/// One filesystem entry to be synchronized: a file, directory, or
/// symlink, together with its place in the INIT/CHUNK*/ATTRIBUTES phase
/// machine and its position in the scheduler's dependency graph.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub source_path: PathBuf,
    pub dest_path: PathBuf,

    pub source_stat: PosixStat,
    pub dest_stat: PosixStat,

    pub init_state: PhaseState,
    pub chunk_state: Vec<PhaseState>,
    pub attrib_state: PhaseState,

    /// Children that must reach ATTRIBUTES=DONE (and be destroyed) before
    /// this job's own ATTRIBUTES phase may be scheduled. Non-empty only
    /// for directory jobs.
    pub dependencies: HashSet<JobId>,
    /// Inverse of `dependencies`: jobs that are waiting on this one.
    /// Non-empty only for jobs that have a parent directory still open
    /// (i.e. every job but the root, while it is in flight).
    pub dependents: HashSet<JobId>,

    pub log: JobLog,
}

impl Job {
    /// Creates a fresh job in the OPEN/OPEN/OPEN state. `chunk_state` is
    /// left empty; it's sized once INIT reports the source's type and
    /// size (`set_source_stat`).
    pub fn new(id: JobId, source_path: PathBuf, dest_path: PathBuf) -> Self {
        Self {
            id,
            source_path,
            dest_path,
            source_stat: PosixStat::ABSENT,
            dest_stat: PosixStat::ABSENT,
            init_state: PhaseState::Open,
            chunk_state: Vec::new(),
            attrib_state: PhaseState::Open,
            dependencies: HashSet::new(),
            dependents: HashSet::new(),
            log: JobLog::default(),
        }
    }

    /// Records the INIT-phase stat result and, for a regular file, sizes
    /// `chunk_state` (and the matching error vectors) to
    /// `chunk_size.chunk_count(size)` entries, all OPEN. Non-regular
    /// entries get zero chunks, satisfying invariant I3 vacuously.
    pub fn set_source_stat(&mut self, stat: PosixStat, chunk_size: ChunkSize) {
        self.source_stat = stat;
        let chunk_count = if stat.kind().is_regular() {
            chunk_size.chunk_count(stat.size)
        } else {
            0
        };
        self.chunk_state = vec![PhaseState::Open; chunk_count];
        self.log.read_chunk = vec![false; chunk_count];
        self.log.write_chunk = vec![false; chunk_count];
    }

    pub fn is_directory(&self) -> bool {
        self.source_stat.kind().is_directory()
    }

    pub fn is_regular_or_symlink(&self) -> bool {
        let kind = self.source_stat.kind();
        kind.is_regular() || kind.is_symlink()
    }

    /// I2: a job's INIT task may be emitted exactly once, while OPEN.
    pub fn ready_for_init(&self) -> bool {
        self.init_state.is_open()
    }

    /// I2/I3: the index of the next chunk eligible for scheduling, if
    /// any — the first OPEN chunk, provided every chunk before it is
    /// DONE and INIT itself is DONE. Returns `None` if INIT isn't done
    /// yet, there are no chunks, or an earlier chunk is still in flight
    /// (SCHEDULED) — in which case the caller must wait, not skip ahead.
    pub fn next_schedulable_chunk(&self) -> Option<usize> {
        if !self.init_state.is_done() {
            return None;
        }
        for (idx, state) in self.chunk_state.iter().enumerate() {
            match state {
                PhaseState::Done => continue,
                PhaseState::Open => return Some(idx),
                PhaseState::Scheduled => return None,
            }
        }
        None
    }

    /// I2: ATTRIBUTES may be scheduled once INIT and every chunk are
    /// DONE and every dependency (child) has been resolved.
    pub fn ready_for_attributes(&self) -> bool {
        self.attrib_state.is_open()
            && self.init_state.is_done()
            && self.chunk_state.iter().all(|s| s.is_done())
            && self.dependencies.is_empty()
    }

    pub fn all_chunks_done(&self) -> bool {
        self.chunk_state.iter().all(|s| s.is_done())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular_stat(size: u64) -> PosixStat {
        PosixStat {
            mode: 0o100644,
            size,
            ino: 1,
            ..PosixStat::ABSENT
        }
    }

    fn dir_stat() -> PosixStat {
        PosixStat {
            mode: 0o040755,
            ino: 1,
            ..PosixStat::ABSENT
        }
    }

    #[test]
    fn new_job_starts_open_with_no_chunks() {
        let job = Job::new(JobId::new(1), "a".into(), "b".into());
        assert!(job.ready_for_init());
        assert_eq!(job.next_schedulable_chunk(), None);
        assert!(!job.ready_for_attributes()); // INIT not done yet
    }

    #[test]
    fn regular_file_gets_chunked_after_init() {
        let mut job = Job::new(JobId::new(1), "a".into(), "b".into());
        job.set_source_stat(regular_stat(200 * 1024 * 1024), ChunkSize::DEFAULT);
        job.init_state = PhaseState::Done;
        assert_eq!(job.chunk_state.len(), 4);
        assert_eq!(job.next_schedulable_chunk(), Some(0));
    }

    #[test]
    fn chunks_are_scheduled_strictly_in_order() {
        let mut job = Job::new(JobId::new(1), "a".into(), "b".into());
        job.set_source_stat(regular_stat(3 * ChunkSize::DEFAULT.bytes()), ChunkSize::DEFAULT);
        job.init_state = PhaseState::Done;
        job.chunk_state[0] = PhaseState::Scheduled;
        // chunk 1 cannot be scheduled while chunk 0 is still in flight.
        assert_eq!(job.next_schedulable_chunk(), None);
        job.chunk_state[0] = PhaseState::Done;
        assert_eq!(job.next_schedulable_chunk(), Some(1));
    }

    #[test]
    fn directory_attributes_wait_on_dependencies() {
        let mut job = Job::new(JobId::new(1), "a".into(), "b".into());
        job.set_source_stat(dir_stat(), ChunkSize::DEFAULT);
        job.init_state = PhaseState::Done;
        job.dependencies.insert(JobId::new(2));
        assert!(!job.ready_for_attributes());
        job.dependencies.clear();
        assert!(job.ready_for_attributes());
    }

    #[test]
    fn dependency_and_dependent_sets_are_independent_views() {
        let mut parent = Job::new(JobId::new(1), "a".into(), "b".into());
        let mut child = Job::new(JobId::new(2), "a/c".into(), "b/c".into());
        parent.dependencies.insert(child.id);
        child.dependents.insert(parent.id);
        assert!(parent.dependencies.contains(&child.id));
        assert!(child.dependents.contains(&parent.id));
    }
}
