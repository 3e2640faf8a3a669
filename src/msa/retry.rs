use crate::core::config::RetryConfig;
use crate::msa::transport::TransportError;
use crate::ColabMsaError;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Transport retry rules shared by every server call.
///
/// Timeouts are retried immediately and without limit. Any other failure
/// counts against `max_retries`, with `retry_delay` between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Result<Self, ColabMsaError> {
        let retry_delay = Duration::try_from_secs_f64(config.transport_retry_delay_secs)
            .map_err(|e| {
                ColabMsaError::Config(format!(
                    "invalid retry.transport_retry_delay_secs {}: {}",
                    config.transport_retry_delay_secs, e
                ))
            })?;
        Ok(Self {
            max_retries: config.max_transport_retries,
            retry_delay,
        })
    }

    /// Run `op` until it succeeds or the failure budget is spent.
    /// `action` describes the call for log messages, e.g. "submitting to MSA server".
    pub fn execute<T, F>(&self, action: &str, mut op: F) -> Result<T, ColabMsaError>
    where
        F: FnMut() -> Result<T, TransportError>,
    {
        let mut error_count = 0u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_timeout() => {
                    warn!("Timeout while {}. Retrying...", action);
                }
                Err(e) => {
                    error_count += 1;
                    if error_count > self.max_retries {
                        return Err(ColabMsaError::Transport(format!(
                            "giving up {} after {} retries: {}",
                            action, self.max_retries, e
                        )));
                    }
                    warn!(
                        "Error while {}. Retrying... ({}/{})",
                        action, error_count, self.max_retries
                    );
                    warn!("Error: {}", e);
                    thread::sleep(self.retry_delay);
                }
            }
        }
    }
}
