// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface
//!
//! Implements the fixed contract from spec §6:
//!
//! ```text
//! treesync SOURCE DEST [READERS [WRITERS [CHUNK_MB]]]
//! ```
//!
//! Parsing is two steps, same split as the rest of this codebase keeps
//! between "can clap even make sense of the tokens" and "do the resulting
//! values satisfy treesync's own rules": [`Cli::parse_from_args`] handles
//! the former, [`Cli::into_run_config`] the latter (positive integers,
//! a readable source root).

use std::path::PathBuf;

use clap::Parser;
use treesync_domain::{ChunkSize, RunConfig, SyncError, WorkerCount};

/// Raw CLI arguments, before validation.
#[derive(Debug, Parser)]
#[command(name = "treesync", about = "Mirror a source directory tree onto a destination")]
pub struct Cli {
    /// Path to the source tree.
    pub source: PathBuf,

    /// Path to the destination tree (created if absent).
    pub dest: PathBuf,

    /// Number of reader threads (default: 1).
    pub readers: Option<i64>,

    /// Number of writer threads (default: 8).
    pub writers: Option<i64>,

    /// Chunk size in megabytes (default: 64).
    pub chunk_mb: Option<i64>,

    /// Increase diagnostic verbosity (stderr only; repeatable).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parses `argv`, mapping clap's usage failures onto
    /// [`SyncError::Usage`] with exit code 2 (spec §6).
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::try_parse_from(args).map_err(|e| SyncError::Usage(e.to_string()))
    }

    /// Validates the parsed arguments into a [`RunConfig`]. Checked here,
    /// not at the clap layer, because the positivity rule and the
    /// MB-to-bytes conversion are treesync's business, not clap's.
    pub fn into_run_config(self) -> Result<RunConfig, SyncError> {
        let readers = positive(self.readers, WorkerCount::DEFAULT_READERS.get() as i64, "READERS")
            .and_then(|n| WorkerCount::new(n).map_err(SyncError::Usage))?;
        let writers = positive(self.writers, WorkerCount::DEFAULT_WRITERS.get() as i64, "WRITERS")
            .and_then(|n| WorkerCount::new(n).map_err(SyncError::Usage))?;
        let chunk_mb = positive(self.chunk_mb, 64, "CHUNK_MB")?;
        let chunk_size = ChunkSize::from_mb(chunk_mb as u64).map_err(SyncError::Usage)?;

        Ok(RunConfig::new(self.source, self.dest, readers, writers, chunk_size))
    }
}

/// Resolves an optional positional integer argument to its default, or
/// rejects it if the caller supplied a non-positive value.
fn positive(value: Option<i64>, default: i64, name: &str) -> Result<usize, SyncError> {
    match value {
        None => Ok(default as usize),
        Some(n) if n > 0 => Ok(n as usize),
        Some(_) => Err(SyncError::Usage(format!("{name} must be a positive integer"))),
    }
}

/// Parses `argv` and validates it into a [`RunConfig`] in one call, the
/// entry point `treesync`'s `main` uses.
pub fn parse_args<I, T>(args: I) -> Result<(RunConfig, u8), SyncError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from_args(args)?;
    let verbose = cli.verbose;
    let config = cli.into_run_config()?;
    Ok((config, verbose))
}

/// Maps a [`SyncError`] to the process exit code spec §6 assigns it:
/// usage problems exit 2, everything else that stops a run before the
/// scheduler starts exits 1.
pub fn exit_code_for(error: &SyncError) -> i32 {
    match error {
        SyncError::Usage(_) => 2,
        SyncError::SourceUnavailable { .. } | SyncError::Io(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<(RunConfig, u8), SyncError> {
        let mut full = vec!["treesync"];
        full.extend_from_slice(args);
        parse_args(full)
    }

    #[test]
    fn minimal_args_use_defaults() {
        let (config, verbose) = parse(&["/src", "/dst"]).unwrap();
        assert_eq!(config.source, PathBuf::from("/src"));
        assert_eq!(config.dest, PathBuf::from("/dst"));
        assert_eq!(config.readers.get(), 1);
        assert_eq!(config.writers.get(), 8);
        assert_eq!(config.chunk_size.bytes(), 64 * 1024 * 1024);
        assert_eq!(verbose, 0);
    }

    #[test]
    fn full_args_are_respected() {
        let (config, _) = parse(&["/src", "/dst", "2", "4", "16"]).unwrap();
        assert_eq!(config.readers.get(), 2);
        assert_eq!(config.writers.get(), 4);
        assert_eq!(config.chunk_size.bytes(), 16 * 1024 * 1024);
    }

    #[test]
    fn missing_dest_is_a_usage_error() {
        let err = parse(&["/src"]).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn zero_readers_is_a_usage_error() {
        let err = parse(&["/src", "/dst", "0"]).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn negative_chunk_mb_is_a_usage_error() {
        let err = parse(&["/src", "/dst", "1", "1", "-5"]).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }
}
