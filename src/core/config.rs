use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub retry: RetryConfig,
    pub job: JobConfig,
    pub hits: HitsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host_url: String,
    pub user_agent: String,
    pub submission_endpoint: String,
    /// Status requests go to `{host_url}/{status_endpoint}/{job_id}`
    pub status_endpoint: String,
    pub download_endpoint: String,
    /// Applied to both connecting and reading
    pub timeout_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after non-timeout transport failures (timeouts are unbounded)
    pub max_transport_retries: u32,
    pub transport_retry_delay_secs: f64,
    /// Wait between resubmissions and polls is `poll_min_secs` plus a
    /// random 0..=`poll_jitter_secs`
    pub poll_min_secs: u64,
    pub poll_jitter_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub mode: String,
    /// Header number of the first submitted sequence
    pub index_offset: usize,
    pub archive_name: String,
    /// Archive member holding the alignment
    pub member_name: String,
    /// Only used to size the progress bar
    pub seconds_per_sequence: u64,
    pub show_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitsConfig {
    pub header_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host_url: "https://api.colabfold.com".to_string(),
            user_agent: concat!("colabmsa/", env!("CARGO_PKG_VERSION")).to_string(),
            submission_endpoint: "ticket/msa".to_string(),
            status_endpoint: "ticket".to_string(),
            download_endpoint: "result/download".to_string(),
            timeout_secs: 6.02,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_transport_retries: 5,
            transport_retry_delay_secs: 5.0,
            poll_min_secs: 5,
            poll_jitter_secs: 5,
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            mode: "nofilter".to_string(),
            index_offset: 101,
            archive_name: "out.tar.gz".to_string(),
            member_name: "uniref.a3m".to_string(),
            seconds_per_sequence: 150,
            show_progress: true,
        }
    }
}

impl Default for HitsConfig {
    fn default() -> Self {
        Self {
            header_prefix: crate::bio::hits::DEFAULT_HEADER_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), crate::ColabMsaError> {
        if self.server.host_url.trim().is_empty() {
            return Err(crate::ColabMsaError::Config("server.host_url is empty".to_string()));
        }
        let timeout = self.server.timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(crate::ColabMsaError::Config(format!(
                "server.timeout_secs must be a positive number of seconds, got {}",
                timeout
            )));
        }
        let delay = self.retry.transport_retry_delay_secs;
        if !delay.is_finite() || delay < 0.0 {
            return Err(crate::ColabMsaError::Config(format!(
                "retry.transport_retry_delay_secs must be a non-negative number of seconds, got {}",
                delay
            )));
        }
        if self.job.member_name.is_empty() || self.job.archive_name.is_empty() {
            return Err(crate::ColabMsaError::Config(
                "job.member_name and job.archive_name must be set".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::ColabMsaError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::ColabMsaError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::ColabMsaError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::ColabMsaError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
