// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Reader worker body. Mirrors `fastsync`'s `ModReader`
//! (see `examples/original_source/src/ModReader.cpp`).
//!
//! A reader only ever looks at the *source* side of a job: it stats and
//! classifies entries during INIT, reads symlink targets, and reads
//! chunk payloads during CHUNK. It never writes anything to the
//! destination tree.

use treesync_domain::{ChunkSize, EntryKind, FileSystem};

use crate::application::{Task, TaskKind};

/// Runs one reader thread: pops from `open`, processes, pushes to
/// `read`, until `open` is closed.
pub fn run(
    fs: &dyn FileSystem,
    chunk_size: ChunkSize,
    open: &crate::infrastructure::BoundedQueue<Task>,
    read: &crate::infrastructure::BoundedQueue<Task>,
) {
    loop {
        let mut task = match open.pop() {
            crate::infrastructure::PopResult::Item(task) => task,
            crate::infrastructure::PopResult::Closed => break,
        };
        process(fs, chunk_size, &mut task);
        read.push(task);
    }
}

fn process(fs: &dyn FileSystem, chunk_size: ChunkSize, task: &mut Task) {
    match task.kind {
        TaskKind::Init => process_init(fs, task),
        TaskKind::Chunk(index) => process_chunk(fs, chunk_size, task, index),
        TaskKind::Attributes => {}
    }
}

fn process_init(fs: &dyn FileSystem, task: &mut Task) {
    match fs.lstat(&task.source_path) {
        Ok(stat) => task.source_stat = stat,
        Err(_) => {
            task.outcome.stat_source = true;
            return;
        }
    }

    match task.source_stat.kind() {
        EntryKind::Regular | EntryKind::Directory => {}
        EntryKind::Symlink => match fs.read_link(&task.source_path) {
            Ok(target) => task.payload = target,
            Err(_) => task.outcome.readlink = true,
        },
        EntryKind::Other => task.outcome.source_type = true,
    }
}

fn process_chunk(fs: &dyn FileSystem, chunk_size: ChunkSize, task: &mut Task, index: usize) {
    let offset = chunk_size.offset_of(index);
    let len = chunk_size.length_of(index, task.source_stat.size);
    match fs.read_chunk(&task.source_path, offset, len) {
        Ok(data) => {
            if (data.len() as u64) < len {
                task.outcome.read_chunk = true;
            }
            task.payload = data;
        }
        Err(_) => {
            task.outcome.read_chunk = true;
            task.payload = Vec::new();
        }
    }
}
