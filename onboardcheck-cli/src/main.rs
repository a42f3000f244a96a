mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::load_config(&cli).await?;

    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("warning: {e}");
    }

    tracing::debug!(command = ?cli.command, "onboardcheck starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        None | Some(Commands::Run) => commands::run::execute(&config, &cli.run.only, &writer).await,
        Some(Commands::State(args)) => commands::state::execute(args, &config, &writer),
        Some(Commands::Steps) => commands::steps::execute(&config, &writer),
    }
}
