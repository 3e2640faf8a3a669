use serde::{Deserialize, Serialize};
use tracing::error;

/// Job state as reported by the MSA server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[serde(rename = "RATELIMIT")]
    RateLimit,
    Pending,
    Running,
    Complete,
    Error,
    Maintenance,
    /// Also used for any status string this client does not recognise
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// The submission has not been accepted yet and should be sent again
    pub fn needs_resubmit(&self) -> bool {
        matches!(self, JobStatus::Unknown | JobStatus::RateLimit)
    }

    /// The job is queued or running and should be polled again
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            JobStatus::Unknown | JobStatus::Pending | JobStatus::Running
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Error | JobStatus::Maintenance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unknown => "UNKNOWN",
            JobStatus::RateLimit => "RATELIMIT",
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Complete => "COMPLETE",
            JobStatus::Error => "ERROR",
            JobStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed body of a submission or status response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTicket {
    pub status: JobStatus,
    #[serde(default)]
    pub id: Option<String>,
}

impl JobTicket {
    pub fn new(status: JobStatus, id: Option<String>) -> Self {
        Self { status, id }
    }

    /// Parse a response body. Anything that is not a JSON ticket becomes an
    /// `ERROR` ticket; the body is logged.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<JobTicket>(body) {
            Ok(ticket) => ticket,
            Err(e) => {
                error!("Server didn't reply with json ({}): {}", e, body);
                JobTicket::new(JobStatus::Error, None)
            }
        }
    }
}
