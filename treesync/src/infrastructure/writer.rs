// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Writer worker body. Based on `fastsync`'s `ModWriter`
//! (see `examples/original_source/src/ModWriter.cpp`).
//!
//! A writer only ever touches the *destination* side of a job. It's
//! the only side of the pipeline that mutates the destination tree;
//! the reader pool never does.

use treesync_domain::{ChunkSize, EntryKind, FileSystem, PosixStat};

use crate::application::{Task, TaskKind};

pub fn run(
    fs: &dyn FileSystem,
    chunk_size: ChunkSize,
    read: &crate::infrastructure::BoundedQueue<Task>,
    written: &crate::infrastructure::BoundedQueue<Task>,
) {
    loop {
        let mut task = match read.pop() {
            crate::infrastructure::PopResult::Item(task) => task,
            crate::infrastructure::PopResult::Closed => break,
        };
        process(fs, chunk_size, &mut task);
        written.push(task);
    }
}

fn process(fs: &dyn FileSystem, chunk_size: ChunkSize, task: &mut Task) {
    match task.kind {
        TaskKind::Init => process_init(fs, task),
        TaskKind::Chunk(index) => process_chunk(fs, chunk_size, task, index),
        TaskKind::Attributes => process_attributes(fs, task),
    }
}

/// Creates or truncates the destination entry so its type and, for
/// regular files, size match the source. Per the re-stat contract:
/// every destructive operation (`remove_all`, `mkdir`, `create_regular`,
/// `symlink`) is followed by a fresh `lstat` before the next branch
/// reads `task.dest_stat`.
fn process_init(fs: &dyn FileSystem, task: &mut Task) {
    let source_kind = task.source_stat.kind();
    if matches!(source_kind, EntryKind::Other) {
        task.dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
        return;
    }

    let mut dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);

    if dest_stat.exists() && dest_stat.kind() != source_kind {
        if fs.remove_all(&task.dest_path).is_err() {
            task.outcome.delete_old = true;
        }
        dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
    }

    match source_kind {
        EntryKind::Regular => {
            let needs_create = !dest_stat.exists()
                || dest_stat.size != task.source_stat.size
                || dest_stat.mtime != task.source_stat.mtime;
            if needs_create {
                if fs.create_regular(&task.dest_path, task.source_stat.mode, task.source_stat.size).is_err() {
                    task.outcome.create_dest = true;
                }
                dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
            }
        }
        EntryKind::Directory => {
            if !dest_stat.exists() {
                if fs.mkdir(&task.dest_path, task.source_stat.mode).is_err() {
                    task.outcome.create_dest = true;
                }
                dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
            }
        }
        EntryKind::Symlink => {
            let needs_create = !dest_stat.exists()
                || dest_stat.size != task.source_stat.size
                || dest_stat.mtime != task.source_stat.mtime;
            if needs_create {
                if dest_stat.exists() {
                    if fs.remove_all(&task.dest_path).is_err() {
                        task.outcome.delete_old = true;
                    }
                    dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
                }
                if !task.payload.is_empty() {
                    if fs.symlink(&task.payload, &task.dest_path).is_err() {
                        task.outcome.create_dest = true;
                    }
                    dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
                }
            }
        }
        EntryKind::Other => unreachable!("handled above"),
    }

    task.dest_stat = dest_stat;
}

fn process_chunk(fs: &dyn FileSystem, chunk_size: ChunkSize, task: &mut Task, index: usize) {
    if task.payload.is_empty() {
        return;
    }
    let offset = chunk_size.offset_of(index);
    match fs.write_chunk(&task.dest_path, offset, &task.payload) {
        Ok(written) if written == task.payload.len() => {}
        _ => task.outcome.write_chunk = true,
    }
}

/// Prunes destination children absent from the source directory, then
/// brings timestamps, ownership, and mode in line with the source.
/// Mode is never touched on a symlink (`PosixStat::mode_differs`
/// always reports `false` there). Everything here is skipped when
/// `source_stat` is absent: a reader-side stat failure during INIT
/// (permission denied, source removed mid-run) must not reset a
/// previously-good destination's attributes to all-zero values.
fn process_attributes(fs: &dyn FileSystem, task: &mut Task) {
    let mut dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);

    if task.source_stat.exists() {
        if dest_stat.kind().is_directory() {
            if let Ok(entries) = fs.read_dir(&task.dest_path) {
                for entry in entries {
                    let child_source = task.source_path.join(&entry.file_name);
                    let child_dest = task.dest_path.join(&entry.file_name);
                    let still_present = matches!(fs.lstat(&child_source), Ok(stat) if stat.exists());
                    if !still_present && fs.remove_all(&child_dest).is_err() {
                        task.outcome.delete_dir_contents = true;
                    }
                }
            }
            dest_stat = fs.lstat(&task.dest_path).unwrap_or(PosixStat::ABSENT);
        }

        if task.source_stat.times_differ(&dest_stat) {
            if fs.set_times(&task.dest_path, task.source_stat.atime, task.source_stat.mtime).is_err() {
                task.outcome.set_times = true;
            }
        }
        if task.source_stat.owner_differs(&dest_stat) {
            if fs.set_owner(&task.dest_path, task.source_stat.uid, task.source_stat.gid).is_err() {
                task.outcome.set_owner = true;
            }
        }
        if task.source_stat.mode_differs(&dest_stat) {
            if fs.set_mode(&task.dest_path, task.source_stat.mode).is_err() {
                task.outcome.set_mode = true;
            }
        }
    }

    task.dest_stat = fs.lstat(&task.dest_path).unwrap_or(dest_stat);
}
