// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Everything that actually touches the outside world: the POSIX
//! filesystem adapter, the bounded queues connecting the pipeline
//! stages, and the reader/writer worker-pool bodies.

pub mod posix_fs;
pub mod queue;
pub mod reader;
pub mod writer;

pub use posix_fs::PosixFileSystem;
pub use queue::{BoundedQueue, PopResult};
