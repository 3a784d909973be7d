//! Breadbasket CLI

use std::process::ExitCode;

use breadbasket::observability::init_logging;
use clap::Parser;

use crate::cli::Cli;

mod cli;

fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = init_logging(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }
    }

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "command errors are shown to the user, not logged"
            )]
            {
                eprintln!("{error}");
            }

            ExitCode::FAILURE
        }
    }
}
