pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "colabmsa",
    version,
    about = "Remote MMseqs2 multiple sequence alignment client",
    long_about = "colabmsa submits protein sequences to the ColabFold MMseqs2 server, waits for \
                  the alignment, extracts the UniRef a3m from the result archive, and filters \
                  its hits by E-value."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to $COLABMSA_HOME/config.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Override the MSA server URL
    #[arg(long, env = "COLABMSA_HOST", global = true)]
    pub host_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align a FASTA query against UniRef with the remote MMseqs2 server
    Search(commands::search::SearchArgs),

    /// Filter the UniRef100 hits of an a3m alignment by E-value
    Hits(commands::hits::HitsArgs),
}
