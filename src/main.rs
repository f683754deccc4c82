mod aggregator;
mod categories;
mod categorizer;
mod cli;
mod error;
mod fmt;
mod history;
mod importer;
mod models;
mod partition;
mod reports;
mod rules;
mod settings;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose || settings::load_settings().verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Run {
            file,
            format,
            sheet,
            header_row,
            dry_run,
        } => cli::run::run(cli::run::RunArgs {
            file,
            format,
            sheet,
            header_row,
            dry_run,
        }),
        Commands::History => cli::history::run(),
        Commands::Report { command } => cli::report::dispatch(command),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
