use std::process::ExitCode;

use clap::Parser;
use dlfast_core::logging;
use dlfast_core::scheduler::BatchError;

mod cli;

use crate::cli::console::{Console, DisplayMode};
use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging as early as possible; the log file is optional.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    let cli = Cli::parse();
    let console = Console::new(DisplayMode::detect(), cli.quiet);

    match cli.run(console).await {
        Ok(()) => ExitCode::SUCCESS,
        // Batch failures were already summarized per item.
        Err(err) => match err.downcast_ref::<BatchError>() {
            Some(batch) => ExitCode::from(batch.exit_code()),
            None => {
                console.error(&format!("{:#}", err));
                ExitCode::FAILURE
            }
        },
    }
}
