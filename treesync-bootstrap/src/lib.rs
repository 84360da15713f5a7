// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Module
//!
//! Sits outside the domain/application/infrastructure layers and owns the
//! pieces that only make sense at process start: CLI parsing and
//! validation, and wiring up the `tracing` subscriber. Nothing in this
//! crate spawns a worker thread or touches the job graph — that's
//! `treesync`'s job once it receives a validated [`RunConfig`].

pub mod cli;
pub mod logger;

pub use cli::parse_args;
pub use logger::init_logging;
