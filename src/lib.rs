pub mod bio;
pub mod cli;
pub mod core;
pub mod msa;

pub use crate::core::config::Config;
pub use crate::msa::{JobStatus, RemoteJobClient};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColabMsaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Retry budget exhausted on a non-timeout transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The MSA server reported a failure for the job
    #[error("{message}")]
    Protocol { status: JobStatus, message: String },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ColabMsaError>;
