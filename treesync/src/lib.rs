// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # treesync
//!
//! Mirrors a source directory tree onto a destination tree: a
//! producer/consumer pipeline of a scheduler thread, a pool of reader
//! threads, and a pool of writer threads, connected by bounded blocking
//! queues (spec §4). Every entry — regular file, directory, or
//! symlink — is synchronized through INIT, zero or more CHUNK phases,
//! and ATTRIBUTES, in that order; a directory's ATTRIBUTES phase waits
//! on every child entry first.
//!
//! This crate wires the `treesync-domain` job model and `FileSystem`
//! port to the one production filesystem adapter and drives the run;
//! `treesync-bootstrap` owns argument parsing and logging setup before
//! [`run`] is ever called.

pub mod application;
pub mod infrastructure;

use std::sync::Arc;

use treesync_domain::{FileSystem, RunConfig, SyncError};

use application::{Scheduler, Task};
use infrastructure::{BoundedQueue, PosixFileSystem};

/// Runs one tree-sync pass to completion.
///
/// Spawns `config.readers` reader threads and `config.writers` writer
/// threads around a scheduler running on the calling thread, using
/// `crossbeam::thread::scope` so the pools can borrow `fs` and the
/// queues directly instead of wrapping them in `Arc` for 'static
/// closures. Returns once every job has reached ATTRIBUTES=DONE (or
/// been short-circuited) and every worker thread has exited.
///
/// Fails fast, before spawning any thread, if the source root cannot
/// even be `lstat`'d — every other failure in a run is per-job and
/// goes through `JobLog` instead.
pub fn run(config: RunConfig) -> Result<(), SyncError> {
    let fs: Arc<dyn FileSystem> = Arc::new(PosixFileSystem::new());

    let root_stat = fs.lstat(&config.source).map_err(|source| SyncError::SourceUnavailable {
        path: config.source.display().to_string(),
        source,
    })?;
    if !root_stat.exists() {
        return Err(SyncError::SourceUnavailable {
            path: config.source.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    let capacity = config.queue_capacity();
    let open = BoundedQueue::<Task>::new(capacity);
    let read = BoundedQueue::<Task>::new(capacity);
    let written = BoundedQueue::<Task>::new(capacity);
    let chunk_size = config.chunk_size;
    let reader_count = config.readers.get();
    let writer_count = config.writers.get();

    crossbeam::thread::scope(|scope| {
        for _ in 0..reader_count {
            let fs = fs.as_ref();
            let open = &open;
            let read = &read;
            scope.spawn(move |_| infrastructure::reader::run(fs, chunk_size, open, read));
        }
        for _ in 0..writer_count {
            let fs = fs.as_ref();
            let read = &read;
            let written = &written;
            scope.spawn(move |_| infrastructure::writer::run(fs, chunk_size, read, written));
        }

        let scheduler = Scheduler::new(config.clone(), fs.clone());
        scheduler.run(&open, &written);

        // `written` has no sentinel protocol of its own; nothing ever
        // pops it once the scheduler stops, so it should already be
        // empty here (every completion was drained before the job
        // arena went empty). Drop whatever remains rather than leave
        // it sitting unclaimed once the pools wind down.
        written.drain_and_discard();
        read.fill_with_sentinels();
    })
    .expect("a reader or writer thread panicked");

    Ok(())
}
