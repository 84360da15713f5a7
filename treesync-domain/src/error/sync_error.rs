// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use thiserror::Error;

/// Fatal errors that stop a run before (or while starting) the scheduler.
///
/// Every variant maps to one of the two non-zero exit codes the CLI
/// contract defines: usage/argument problems exit 2, everything else that
/// prevents a run from beginning exits 1. See `treesync-bootstrap`'s CLI
/// module for the mapping.
#[derive(Debug, Error)]
pub enum SyncError {
    /// SOURCE or DEST was not provided, or a numeric argument failed to
    /// parse / was not positive.
    #[error("usage: {0}")]
    Usage(String),

    /// The source root could not be `lstat`'d at all.
    #[error("source path '{path}' is not accessible: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure encountered before the pipeline has a chance
    /// to run (e.g. the destination's parent directory does not exist).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
