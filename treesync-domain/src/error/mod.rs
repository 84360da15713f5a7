// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Startup-time fatal errors.
//!
//! These are distinct from the per-job [`crate::JobLog`] flags: a
//! `SyncError` prevents a run from ever starting a scheduler, while a
//! `Log` flag records a failure inside an otherwise-successful run and
//! never aborts the pipeline.

mod sync_error;

pub use sync_error::SyncError;
