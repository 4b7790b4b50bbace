//! Till command-line client

use std::process::ExitCode;

use clap::Parser;

mod cli;

/// Till entry point
#[tokio::main(flavor = "current_thread")]
pub async fn main() -> ExitCode {
    till::config::load_dotenv();

    let cli = cli::Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        // Already shown as a notification.
        Err(cli::CliError::App(_)) => ExitCode::FAILURE,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "top-level failures are reported on stderr, logging may not be initialised"
            )]
            {
                eprintln!("error: {error}");
            }

            ExitCode::FAILURE
        }
    }
}
