//! `trainjob` - training job CLI for Kubernetes clusters.

use std::process::ExitCode;

use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use trainjob_cli::cli::{self, Cli, Invocation};
use trainjob_cli::ui;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit with code 2 from inside clap
    let matches = Cli::command().get_matches();
    let invocation = match Invocation::from_matches(&matches) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };

    let filter = if invocation.cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn,trainjob_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli::run(invocation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err.to_string());
            ExitCode::from(err.exit_code())
        }
    }
}
