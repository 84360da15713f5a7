// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Wires up the `tracing` subscriber used for internal diagnostics.
//!
//! This is entirely separate from the stable `I`/`C<idx>`/`A` protocol
//! lines treesync prints to stdout (spec §6) — those are plain
//! `println!`s from the scheduler, never routed through `tracing`. This
//! subscriber only carries the operator-facing diagnostic channel, and
//! always writes to stderr.

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber.
///
/// `verbosity` (CLI `-v` count) sets a floor on top of whatever
/// `RUST_LOG` requests: 0 -> warn, 1 -> info, 2 -> debug, 3+ -> trace.
/// `RUST_LOG`, when set, always wins for the modules it names.
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("treesync={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
