mod calculator;
mod cli;
mod enrich;
mod error;
mod fmt;
mod importer;
mod models;
mod pipeline;
mod reference;
mod settings;
mod shaper;
mod table;
mod writer;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Process {
            file,
            input_format,
            reference,
            output_dir,
            format,
            divisor,
            shift_minutes,
            preview,
        } => cli::process::run(cli::process::ProcessArgs {
            file,
            input_format,
            reference,
            output_dir,
            format,
            divisor,
            shift_minutes,
            preview,
        }),
        Commands::Factors { reference } => cli::factors::list(reference),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        tracing::debug!("{e}");
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}
