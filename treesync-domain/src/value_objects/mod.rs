// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Value objects: small, immutable, self-validating types that give the
//! job/task model its vocabulary instead of passing raw `usize`/`u64`
//! around.

mod chunk_size;
mod entry_kind;
mod job_id;
mod phase_state;
mod posix_stat;
mod run_config;
mod worker_count;

pub use chunk_size::ChunkSize;
pub use entry_kind::EntryKind;
pub use job_id::{JobId, JobIdGenerator};
pub use phase_state::PhaseState;
pub use posix_stat::{PosixStat, Timespec};
pub use run_config::RunConfig;
pub use worker_count::WorkerCount;
