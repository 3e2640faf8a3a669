use crate::bio::fasta::parse_fasta;
use crate::cli::output::{action, success, tree_item};
use crate::core::config::Config;
use crate::msa::RemoteJobClient;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SearchArgs {
    /// Input peptide FASTA file
    #[arg(short, long, value_name = "FILE")]
    pub query: PathBuf,

    /// Scratch directory for the downloaded archive
    #[arg(long, value_name = "DIR")]
    pub folder: PathBuf,

    /// Where the extracted a3m alignment is saved
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Label for this job, used to name intermediate files
    #[arg(long)]
    pub protid: String,

    /// Server processing mode
    #[arg(long)]
    pub mode: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn run(args: SearchArgs, mut config: Config) -> Result<()> {
    if let Some(mode) = &args.mode {
        config.job.mode = mode.clone();
    }
    if args.no_progress {
        config.job.show_progress = false;
    }

    let sequences = parse_fasta(&args.query)
        .with_context(|| format!("Failed to read query {}", args.query.display()))?;
    if sequences.is_empty() {
        return Err(crate::ColabMsaError::Parse(format!(
            "{} contains no sequences",
            args.query.display()
        ))
        .into());
    }

    action(&format!(
        "Aligning {} against UniRef via {}",
        args.protid, config.server.host_url
    ));
    tree_item(false, "Query", Some(&args.query.display().to_string()));
    tree_item(false, "Sequences", Some(&sequences.len().to_string()));
    tree_item(true, "Mode", Some(&config.job.mode));

    let residues: Vec<String> = sequences.iter().map(|s| s.residues()).collect();
    let client = RemoteJobClient::from_config(&config)?;
    client.run(&residues, &args.folder, &args.file, &args.protid)?;

    success(&format!("Alignment saved to {}", args.file.display()));
    Ok(())
}
