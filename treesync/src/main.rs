// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Process entry point: parse arguments, set up logging, run the
//! pipeline, translate failures into the exit codes spec §6 assigns.

use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args_os();
    let (config, verbosity) = match treesync_bootstrap::parse_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("treesync: {err}");
            return ExitCode::from(treesync_bootstrap::cli::exit_code_for(&err) as u8);
        }
    };

    treesync_bootstrap::init_logging(verbosity);
    if let Err(err) = treesync::run(config) {
        eprintln!("treesync: {err}");
        return ExitCode::from(treesync_bootstrap::cli::exit_code_for(&err) as u8);
    }
    ExitCode::SUCCESS
}
