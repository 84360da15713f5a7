// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # treesync Domain
//!
//! Pure business logic for the tree-synchronizer: the job/task model, the
//! value objects that describe a run, and the `FileSystem` port that the
//! scheduler and workers talk to. Nothing in this crate touches a real
//! filesystem or spawns a thread — that belongs to `treesync`'s
//! infrastructure layer.
//!
//! ## Module Structure
//!
//! - [`value_objects`] — `JobId`, `ChunkSize`, `WorkerCount`, `PosixStat`,
//!   `EntryKind`, `PhaseState`, `RunConfig`.
//! - [`entities`] — `Job`, the per-entry state machine and dependency node.
//! - [`services`] — the `FileSystem` port abstracting POSIX syscalls.
//! - [`error`] — `SyncError`, the startup-time fatal error type.

pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

pub use entities::{Job, JobLog};
pub use error::SyncError;
pub use services::{DirEntry, FileSystem};
pub use value_objects::{ChunkSize, EntryKind, JobId, JobIdGenerator, PhaseState, PosixStat, RunConfig, Timespec, WorkerCount};
