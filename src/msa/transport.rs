use crate::core::config::ServerConfig;
use crate::msa::request::SubmissionRequest;
use crate::ColabMsaError;
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to exchange a request with the server at all. Server-reported
/// job failures are not transport errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Connection(e.to_string())
        }
    }
}

/// The three endpoints of the MSA server. Each call is a single attempt;
/// retrying is up to the caller.
pub trait MsaTransport {
    /// Submit a job, returning the raw response body
    fn submit(&self, request: &SubmissionRequest) -> Result<String, TransportError>;

    /// Fetch the status of a job, returning the raw response body
    fn status(&self, job_id: &str) -> Result<String, TransportError>;

    /// Fetch the result archive of a finished job
    fn download(&self, job_id: &str) -> Result<Vec<u8>, TransportError>;
}

/// Blocking HTTP implementation of [`MsaTransport`]
pub struct HttpTransport {
    client: Client,
    host_url: String,
    submission_endpoint: String,
    status_endpoint: String,
    download_endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ServerConfig) -> Result<Self, ColabMsaError> {
        let timeout = Duration::try_from_secs_f64(config.timeout_secs).map_err(|e| {
            ColabMsaError::Config(format!(
                "invalid server.timeout_secs {}: {}",
                config.timeout_secs, e
            ))
        })?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ColabMsaError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host_url: config.host_url.trim_end_matches('/').to_string(),
            submission_endpoint: config.submission_endpoint.trim_matches('/').to_string(),
            status_endpoint: config.status_endpoint.trim_matches('/').to_string(),
            download_endpoint: config.download_endpoint.trim_matches('/').to_string(),
        })
    }

    pub fn submission_url(&self) -> String {
        format!("{}/{}", self.host_url, self.submission_endpoint)
    }

    pub fn status_url(&self, job_id: &str) -> String {
        format!("{}/{}/{}", self.host_url, self.status_endpoint, job_id)
    }

    pub fn download_url(&self, job_id: &str) -> String {
        format!("{}/{}/{}", self.host_url, self.download_endpoint, job_id)
    }

    fn log_response(url: &str, response: &Response) {
        debug!("{} -> {}", url, response.status());
        if !response.status().is_success() {
            warn!("MSA server answered {} for {}", response.status(), url);
        }
    }
}

impl MsaTransport for HttpTransport {
    fn submit(&self, request: &SubmissionRequest) -> Result<String, TransportError> {
        let url = self.submission_url();
        let response = self.client.post(&url).form(&request.form()).send()?;
        Self::log_response(&url, &response);
        Ok(response.text()?)
    }

    fn status(&self, job_id: &str) -> Result<String, TransportError> {
        let url = self.status_url(job_id);
        let response = self.client.get(&url).send()?;
        Self::log_response(&url, &response);
        Ok(response.text()?)
    }

    fn download(&self, job_id: &str) -> Result<Vec<u8>, TransportError> {
        let url = self.download_url(job_id);
        let response = self.client.get(&url).send()?;
        Self::log_response(&url, &response);
        Ok(response.bytes()?.to_vec())
    }
}
