use clap::Parser;
use colabmsa::cli::{commands, Cli, Commands};
use colabmsa::ColabMsaError;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // COLABMSA_LOG sets the level unless RUST_LOG is given; -v raises it
    let log_level = std::env::var("COLABMSA_LOG").unwrap_or_else(|_| match cli.verbose {
        0 => "info".to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<ColabMsaError>() {
            Some(ColabMsaError::Config(_)) => 2,
            Some(ColabMsaError::Io(_)) => 3,
            Some(ColabMsaError::Parse(_)) => 4,
            Some(ColabMsaError::Transport(_)) => 5,
            Some(ColabMsaError::Protocol { .. }) => 6,
            Some(ColabMsaError::Archive(_)) => 7,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::resolve_config(cli.config.as_deref(), cli.host_url.as_deref())?;

    match cli.command {
        Commands::Search(args) => commands::search::run(args, config),
        Commands::Hits(args) => commands::hits::run(args, config),
    }
}
