use crate::bio::hits::{process_hits, unique_ids};
use crate::cli::output::{success, tree_item, warning};
use crate::core::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct HitsArgs {
    /// Input MMseqs2 .a3m alignment file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output .txt file for the UniProt ids of kept hits
    #[arg(short, long, value_name = "FILE")]
    pub list: PathBuf,

    /// Output .csv file for the kept hits
    #[arg(short = 't', long, value_name = "FILE")]
    pub hits: PathBuf,

    /// Maximum E-value of a kept hit
    #[arg(short = 'e', long)]
    pub max_evalue: f64,
}

pub fn run(args: HitsArgs, config: Config) -> Result<()> {
    let kept = process_hits(
        &args.input,
        args.max_evalue,
        &args.list,
        &args.hits,
        &config.hits.header_prefix,
    )
    .with_context(|| format!("Failed to process hits in {}", args.input.display()))?;

    if kept.is_empty() {
        warning(&format!("No hits with E-value <= {}", args.max_evalue));
    }

    success("Hits filtered");
    tree_item(false, "Hits kept", Some(&kept.len().to_string()));
    tree_item(false, "Unique ids", Some(&unique_ids(&kept).len().to_string()));
    tree_item(false, "Table", Some(&args.hits.display().to_string()));
    tree_item(true, "Id list", Some(&args.list.display().to_string()));
    Ok(())
}
