//! Client for the ColabFold MMseqs2 MSA server.
//!
//! A job goes through submit, poll and download; see [`RemoteJobClient::run`].

pub mod archive;
pub mod client;
pub mod request;
pub mod retry;
pub mod status;
pub mod transport;

pub use client::RemoteJobClient;
pub use request::SubmissionRequest;
pub use retry::RetryPolicy;
pub use status::{JobStatus, JobTicket};
pub use transport::{HttpTransport, MsaTransport, TransportError};
