// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The scheduler: owns the job arena, drives the dependency graph, and
//! is the single writer of the stable stdout protocol (spec §6).
//!
//! Based on `fastsync`'s `main.cpp` driving loop, generalized from a
//! sequential depth-first walk into a producer/consumer loop: a single
//! thread that either drains a completed task off the written queue or
//! finds the next emittable task and pushes it, never both in the same
//! iteration.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace, warn};
use treesync_domain::{FileSystem, Job, JobId, JobIdGenerator, RunConfig};

use crate::application::task::{Task, TaskKind};
use crate::infrastructure::{BoundedQueue, PopResult};

/// Drives one tree-sync run to completion. Single-threaded by
/// construction: nothing about the job arena is `Sync`, and nothing
/// needs it to be, since only this loop ever touches it.
pub struct Scheduler {
    jobs: BTreeMap<JobId, Job>,
    ids: JobIdGenerator,
    config: RunConfig,
    fs: Arc<dyn FileSystem>,
}

impl Scheduler {
    pub fn new(config: RunConfig, fs: Arc<dyn FileSystem>) -> Self {
        Scheduler { jobs: BTreeMap::new(), ids: JobIdGenerator::new(), config, fs }
    }

    /// Runs the scheduler loop to completion: seeds the root job, then
    /// alternates between draining the written queue and emitting new
    /// work until the job arena is empty, finally closing the open
    /// queue so the reader pool winds down.
    pub fn run(
        mut self,
        open: &BoundedQueue<Task>,
        written: &BoundedQueue<Task>,
    ) {
        let root_id = self.ids.next_id();
        let root = Job::new(root_id, self.config.source.clone(), self.config.dest.clone());
        self.jobs.insert(root_id, root);

        while !self.jobs.is_empty() {
            if written.len() > 0 {
                if let PopResult::Item(task) = written.pop() {
                    self.handle_completion(task);
                }
                continue;
            }
            if self.try_emit_one(open) {
                continue;
            }
            if let PopResult::Item(task) = written.pop() {
                self.handle_completion(task);
            }
        }

        open.fill_with_sentinels();
    }

    /// Scans the arena in `JobId` order for the first job with an
    /// emittable task (spec §4.4 step 2: INIT, else the next chunk,
    /// else ATTRIBUTES, first match wins, scan stops on the first
    /// push). Returns whether a task was pushed.
    fn try_emit_one(&mut self, open: &BoundedQueue<Task>) -> bool {
        for (&id, job) in self.jobs.iter_mut() {
            if job.ready_for_init() {
                job.init_state = treesync_domain::PhaseState::Scheduled;
                trace!(job = %id, path = %job.source_path.display(), "scheduling INIT");
                open.push(Task::init(id, job.source_path.clone(), job.dest_path.clone()));
                return true;
            }
            if let Some(index) = job.next_schedulable_chunk() {
                job.chunk_state[index] = treesync_domain::PhaseState::Scheduled;
                trace!(job = %id, index, "scheduling CHUNK");
                open.push(Task::chunk(id, index, job.source_path.clone(), job.dest_path.clone(), job.source_stat));
                return true;
            }
            if job.ready_for_attributes() {
                job.attrib_state = treesync_domain::PhaseState::Scheduled;
                trace!(job = %id, "scheduling ATTRIBUTES");
                open.push(Task::attributes(id, job.source_path.clone(), job.dest_path.clone(), job.source_stat, job.dest_stat));
                return true;
            }
        }
        false
    }

    fn handle_completion(&mut self, task: Task) {
        match task.kind {
            TaskKind::Init => self.complete_init(task),
            TaskKind::Chunk(index) => self.complete_chunk(task, index),
            TaskKind::Attributes => self.complete_attributes(task),
        }
    }

    fn complete_init(&mut self, task: Task) {
        let id = task.job;
        {
            let job = self.jobs.get_mut(&id).expect("job removed before its INIT completed");
            job.set_source_stat(task.source_stat, self.config.chunk_size);
            job.dest_stat = task.dest_stat;
            job.init_state = treesync_domain::PhaseState::Done;
            job.log.stat_source = task.outcome.stat_source;
            job.log.source_type = task.outcome.source_type;
            job.log.readlink = task.outcome.readlink;
            job.log.delete_old = task.outcome.delete_old;
            job.log.create_dest = task.outcome.create_dest;
        }

        println!("I {}", self.jobs[&id].source_path.display());
        debug!(job = %id, "INIT complete");

        if self.jobs[&id].is_directory() {
            self.discover_children(id);
        }

        self.report_if_failed(id);

        let job = &self.jobs[&id];
        if job.is_regular_or_symlink() && job.source_stat.matches_for_short_circuit(&job.dest_stat) {
            trace!(job = %id, "short-circuit: destination already matches");
            self.destroy_job(id);
        }
    }

    fn discover_children(&mut self, parent_id: JobId) {
        let (source_path, dest_path) = {
            let job = &self.jobs[&parent_id];
            (job.source_path.clone(), job.dest_path.clone())
        };
        let entries = match self.fs.read_dir(&source_path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(job = %parent_id, %err, "could not list directory; treating it as childless");
                return;
            }
        };

        let mut child_ids = HashSet::with_capacity(entries.len());
        for entry in entries {
            let child_id = self.ids.next_id();
            let child = Job::new(
                child_id,
                source_path.join(&entry.file_name),
                dest_path.join(&entry.file_name),
            );
            self.jobs.insert(child_id, child);
            child_ids.insert(child_id);
        }

        for &child_id in &child_ids {
            if let Some(child) = self.jobs.get_mut(&child_id) {
                child.dependents.insert(parent_id);
            }
        }
        if let Some(parent) = self.jobs.get_mut(&parent_id) {
            parent.dependencies.extend(child_ids);
        }
    }

    fn complete_chunk(&mut self, task: Task, index: usize) {
        let id = task.job;
        let job = self.jobs.get_mut(&id).expect("job removed before its chunk completed");
        job.chunk_state[index] = treesync_domain::PhaseState::Done;
        job.log.read_chunk[index] = task.outcome.read_chunk;
        job.log.write_chunk[index] = task.outcome.write_chunk;
        println!("C{} {}", index, job.source_path.display());
        trace!(job = %id, index, "CHUNK complete");
        self.report_if_failed(id);
    }

    fn complete_attributes(&mut self, task: Task) {
        let id = task.job;
        {
            let job = self.jobs.get_mut(&id).expect("job removed before its ATTRIBUTES completed");
            job.dest_stat = task.dest_stat;
            job.attrib_state = treesync_domain::PhaseState::Done;
            job.log.delete_dir_contents = task.outcome.delete_dir_contents;
            job.log.set_times = task.outcome.set_times;
            job.log.set_owner = task.outcome.set_owner;
            job.log.set_mode = task.outcome.set_mode;
        }
        println!("A {}", self.jobs[&id].source_path.display());
        debug!(job = %id, "ATTRIBUTES complete");
        self.report_if_failed(id);
        self.destroy_job(id);
    }

    /// Removes a job from the arena and dissolves the dependency edge
    /// with its parent, if any (I1 is restored in the same step that
    /// breaks it — there is never an instant where an edge names a job
    /// no longer in the arena).
    fn destroy_job(&mut self, id: JobId) {
        if let Some(job) = self.jobs.remove(&id) {
            for dependent_id in &job.dependents {
                if let Some(dependent) = self.jobs.get_mut(dependent_id) {
                    dependent.dependencies.remove(&id);
                }
            }
        }
    }

    fn report_if_failed(&self, id: JobId) {
        if let Some(job) = self.jobs.get(&id) {
            if job.log.has_any_error() {
                warn!(job = %id, path = %job.source_path.display(), log = ?job.log, "job reported one or more errors");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;

    use treesync_domain::{ChunkSize, DirEntry, PosixStat, Timespec, WorkerCount};

    /// An in-memory stand-in for the production POSIX adapter, proving
    /// the scheduler and worker pools are testable against the
    /// `FileSystem` port alone, with no real filesystem involved.
    #[derive(Clone)]
    enum Node {
        Regular { data: Vec<u8>, mode: u32 },
        Directory { mode: u32 },
    }

    struct FakeFileSystem {
        nodes: Mutex<HashMap<std::path::PathBuf, Node>>,
    }

    impl FakeFileSystem {
        fn new() -> Self {
            FakeFileSystem { nodes: Mutex::new(HashMap::new()) }
        }
    }

    fn stat_for(node: &Node) -> PosixStat {
        match node {
            Node::Regular { data, mode } => PosixStat {
                mode: mode | 0o100_000,
                size: data.len() as u64,
                uid: 0,
                gid: 0,
                atime: Timespec::new(1_000, 0),
                mtime: Timespec::new(1_000, 0),
                ino: 1,
            },
            Node::Directory { mode } => PosixStat {
                mode: mode | 0o040_000,
                size: 0,
                uid: 0,
                gid: 0,
                atime: Timespec::new(1_000, 0),
                mtime: Timespec::new(1_000, 0),
                ino: 1,
            },
        }
    }

    impl FileSystem for FakeFileSystem {
        fn lstat(&self, path: &std::path::Path) -> io::Result<PosixStat> {
            Ok(self.nodes.lock().unwrap().get(path).map(stat_for).unwrap_or(PosixStat::ABSENT))
        }
        fn read_link(&self, _path: &std::path::Path) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "no symlinks in this fixture"))
        }
        fn read_chunk(&self, path: &std::path::Path, offset: u64, len: u64) -> io::Result<Vec<u8>> {
            match self.nodes.lock().unwrap().get(path) {
                Some(Node::Regular { data, .. }) => {
                    let start = (offset as usize).min(data.len());
                    let end = (start + len as usize).min(data.len());
                    Ok(data[start..end].to_vec())
                }
                _ => Ok(Vec::new()),
            }
        }
        fn create_regular(&self, path: &std::path::Path, mode: u32, size: u64) -> io::Result<()> {
            self.nodes.lock().unwrap().insert(path.to_path_buf(), Node::Regular { data: vec![0u8; size as usize], mode });
            Ok(())
        }
        fn write_chunk(&self, path: &std::path::Path, offset: u64, data: &[u8]) -> io::Result<usize> {
            let mut nodes = self.nodes.lock().unwrap();
            match nodes.get_mut(path) {
                Some(Node::Regular { data: existing, .. }) => {
                    let start = offset as usize;
                    let end = start + data.len();
                    if existing.len() < end {
                        existing.resize(end, 0);
                    }
                    existing[start..end].copy_from_slice(data);
                    Ok(data.len())
                }
                _ => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            }
        }
        fn mkdir(&self, path: &std::path::Path, mode: u32) -> io::Result<()> {
            self.nodes.lock().unwrap().insert(path.to_path_buf(), Node::Directory { mode });
            Ok(())
        }
        fn symlink(&self, _target: &[u8], _path: &std::path::Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no symlinks in this fixture"))
        }
        fn remove_all(&self, path: &std::path::Path) -> io::Result<()> {
            let mut nodes = self.nodes.lock().unwrap();
            let prefix = path.to_path_buf();
            nodes.retain(|p, _| p != &prefix && !p.starts_with(&prefix));
            Ok(())
        }
        fn read_dir(&self, path: &std::path::Path) -> io::Result<Vec<DirEntry>> {
            let nodes = self.nodes.lock().unwrap();
            Ok(nodes
                .keys()
                .filter(|p| p.parent() == Some(path))
                .map(|p| DirEntry { file_name: p.file_name().unwrap().to_os_string() })
                .collect())
        }
        fn set_times(&self, _path: &std::path::Path, _atime: Timespec, _mtime: Timespec) -> io::Result<()> {
            Ok(())
        }
        fn set_owner(&self, _path: &std::path::Path, _uid: u32, _gid: u32) -> io::Result<()> {
            Ok(())
        }
        fn set_mode(&self, path: &std::path::Path, mode: u32) -> io::Result<()> {
            if let Some(Node::Regular { mode: m, .. }) = self.nodes.lock().unwrap().get_mut(path) {
                *m = mode;
            }
            Ok(())
        }
    }

    #[test]
    fn mirrors_a_small_tree_over_the_fake_filesystem() {
        let fake = Arc::new(FakeFileSystem::new());
        fake.nodes.lock().unwrap().insert("/src".into(), Node::Directory { mode: 0o755 });
        fake.nodes.lock().unwrap().insert("/src/a".into(), Node::Regular { data: b"hello".to_vec(), mode: 0o644 });

        let config = RunConfig::new(
            "/src".into(),
            "/dst".into(),
            WorkerCount::new(1).unwrap(),
            WorkerCount::new(1).unwrap(),
            ChunkSize::from_bytes(3).unwrap(),
        );
        let capacity = config.queue_capacity();
        let open = BoundedQueue::<Task>::new(capacity);
        let read = BoundedQueue::<Task>::new(capacity);
        let written = BoundedQueue::<Task>::new(capacity);

        crossbeam::thread::scope(|scope| {
            let reader_fs: &dyn FileSystem = fake.as_ref();
            let reader_open = &open;
            let reader_read = &read;
            let chunk_size = config.chunk_size;
            scope.spawn(move |_| crate::infrastructure::reader::run(reader_fs, chunk_size, reader_open, reader_read));

            let writer_fs: &dyn FileSystem = fake.as_ref();
            let writer_read = &read;
            let writer_written = &written;
            scope.spawn(move |_| crate::infrastructure::writer::run(writer_fs, chunk_size, writer_read, writer_written));

            let scheduler_fs: Arc<dyn FileSystem> = fake.clone();
            let scheduler = Scheduler::new(config.clone(), scheduler_fs);
            scheduler.run(&open, &written);
            read.fill_with_sentinels();
        })
        .unwrap();

        let nodes = fake.nodes.lock().unwrap();
        match nodes.get(std::path::Path::new("/dst/a")) {
            Some(Node::Regular { data, .. }) => assert_eq!(data, b"hello"),
            other => panic!("expected a regular file at /dst/a, found {}", other.is_some()),
        }
        assert!(matches!(nodes.get(std::path::Path::new("/dst")), Some(Node::Directory { .. })));
    }
}
