use crate::bio::UniqueSequences;
use crate::core::config::{Config, JobConfig};
use crate::msa::archive::{self, ExtractionPlan};
use crate::msa::request::SubmissionRequest;
use crate::msa::retry::RetryPolicy;
use crate::msa::status::{JobStatus, JobTicket};
use crate::msa::transport::{HttpTransport, MsaTransport};
use crate::ColabMsaError;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

const PROGRESS_TEMPLATE: &str =
    "{msg:>11} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}s (eta {eta})";

/// Drives one MSA job through submission, polling and download.
///
/// Every server call goes through the [`RetryPolicy`]. Server-reported
/// `ERROR` and `MAINTENANCE` are never retried.
///
/// Two waits are unbounded: resubmitting while the server answers
/// `UNKNOWN`/`RATELIMIT`, and polling a job that never leaves
/// `PENDING`/`RUNNING`. A server that keeps answering either way hangs the
/// caller.
pub struct RemoteJobClient<T: MsaTransport> {
    transport: T,
    retry: RetryPolicy,
    poll_min_secs: u64,
    poll_jitter_secs: u64,
    job: JobConfig,
}

impl RemoteJobClient<HttpTransport> {
    /// Client talking HTTP to the server named in `config`
    pub fn from_config(config: &Config) -> Result<Self, ColabMsaError> {
        config.validate()?;
        Self::new(HttpTransport::new(&config.server)?, config)
    }
}

impl<T: MsaTransport> RemoteJobClient<T> {
    pub fn new(transport: T, config: &Config) -> Result<Self, ColabMsaError> {
        config.validate()?;
        Ok(Self {
            transport,
            retry: RetryPolicy::from_config(&config.retry)?,
            poll_min_secs: config.retry.poll_min_secs,
            poll_jitter_secs: config.retry.poll_jitter_secs,
            job: config.job.clone(),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a job. A body that is not a JSON ticket reads as `ERROR`.
    pub fn submit(&self, request: &SubmissionRequest) -> Result<JobTicket, ColabMsaError> {
        let body = self
            .retry
            .execute("submitting to MSA server", || self.transport.submit(request))?;
        Ok(JobTicket::from_body(&body))
    }

    /// Fetch the current state of a submitted job
    pub fn poll(&self, job_id: &str) -> Result<JobTicket, ColabMsaError> {
        let body = self
            .retry
            .execute("fetching status from MSA server", || {
                self.transport.status(job_id)
            })?;
        Ok(JobTicket::from_body(&body))
    }

    /// Save the result archive of a finished job to `dest`.
    ///
    /// The body is written next to `dest` first and only renamed into place
    /// once it reads as a gzip tar, so `dest` never holds a partial file or
    /// an error page.
    pub fn download(&self, job_id: &str, dest: &Path) -> Result<(), ColabMsaError> {
        let bytes = self
            .retry
            .execute("fetching result from MSA server", || {
                self.transport.download(job_id)
            })?;

        let partial = partial_path(dest);
        fs::write(&partial, &bytes)?;
        if let Err(e) = archive::verify_archive(&partial) {
            discard(&partial);
            return Err(e);
        }
        fs::rename(&partial, dest)?;
        info!("Downloaded {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }

    /// Where [`run`](Self::run) keeps the downloaded archive
    pub fn archive_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.job.archive_name)
    }

    /// Align `sequences` and leave the alignment at `final_path`.
    ///
    /// If the archive from an earlier run is still in `output_dir`, no
    /// request is made and that archive is extracted instead.
    pub fn run<S: AsRef<str>>(
        &self,
        sequences: &[S],
        output_dir: &Path,
        final_path: &Path,
        job_label: &str,
    ) -> Result<(), ColabMsaError> {
        fs::create_dir_all(output_dir)?;
        let archive = self.archive_path(output_dir);

        if archive.is_file() {
            info!(
                "Reusing existing archive {}, skipping submission",
                archive.display()
            );
        } else {
            let unique = UniqueSequences::new(sequences.iter().map(AsRef::<str>::as_ref));
            if unique.is_empty() {
                return Err(ColabMsaError::Parse("no sequences to submit".to_string()));
            }
            if unique.len() < unique.input_len() {
                info!(
                    "Collapsed {} input sequences into {} unique",
                    unique.input_len(),
                    unique.len()
                );
            }

            let request = SubmissionRequest::new(&unique, &self.job.mode, self.job.index_offset);
            let estimate = self.job.seconds_per_sequence * unique.len() as u64;
            let progress = self.progress_bar(estimate);

            let job_id = match self.wait_for_job(&request, &progress, estimate) {
                Ok(id) => id,
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            };
            progress.finish_with_message(JobStatus::Complete.as_str());

            self.download(&job_id, &archive)?;
        }

        let plan = ExtractionPlan {
            archive: &archive,
            member: &self.job.member_name,
            job_dir: output_dir.join(job_label),
            job_label,
            final_path,
        };
        // A broken archive would otherwise be reused by every later run
        plan.execute().inspect_err(|_| {
            discard(&archive);
            if let Err(e) = fs::remove_dir_all(&plan.job_dir) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", plan.job_dir.display(), e);
                }
            }
        })
    }

    /// Submit until the server takes the job, then poll until it finishes.
    /// Returns the id of the completed job.
    fn wait_for_job(
        &self,
        request: &SubmissionRequest,
        progress: &ProgressBar,
        estimate: u64,
    ) -> Result<String, ColabMsaError> {
        loop {
            progress.set_message("SUBMIT");
            let mut ticket = self.submit(request)?;
            while ticket.status.needs_resubmit() {
                self.pause(ticket.status);
                ticket = self.submit(request)?;
            }

            if ticket.status.is_failure() {
                return Err(server_failure(ticket.status));
            }

            let job_id = ticket.id.clone().ok_or_else(|| ColabMsaError::Protocol {
                status: ticket.status,
                message: format!("MSA server answered {} without a job id", ticket.status),
            })?;
            info!("Submitted job {} ({})", job_id, ticket.status);
            progress.set_message(ticket.status.as_str());

            let mut running_secs = 0u64;
            while ticket.status.is_in_progress() {
                let waited = self.pause(ticket.status);
                ticket = self.poll(&job_id)?;
                progress.set_message(ticket.status.as_str());
                if ticket.status == JobStatus::Running {
                    running_secs += waited;
                    progress.inc(waited);
                }
            }

            match ticket.status {
                JobStatus::Complete => {
                    if running_secs < estimate {
                        progress.inc(estimate - running_secs);
                    }
                    info!("Job {} complete", job_id);
                    return Ok(job_id);
                }
                status if status.is_failure() => return Err(server_failure(status)),
                status => {
                    warn!("Job {} stopped with status {}, resubmitting", job_id, status);
                }
            }
        }
    }

    /// Sleep a randomised interval before the next request; returns the seconds slept
    fn pause(&self, reason: JobStatus) -> u64 {
        let secs = self.poll_min_secs + rand::thread_rng().gen_range(0..=self.poll_jitter_secs);
        info!("Sleeping for {}s. Reason: {}", secs, reason);
        thread::sleep(Duration::from_secs(secs));
        secs
    }

    fn progress_bar(&self, estimate: u64) -> ProgressBar {
        if !self.job.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(estimate);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("Removed unusable {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}

fn server_failure(status: JobStatus) -> ColabMsaError {
    let message = match status {
        JobStatus::Maintenance => {
            "MMseqs2 API is undergoing maintenance. Please try again in a few minutes.".to_string()
        }
        JobStatus::Error => "MMseqs2 API is giving errors. Please confirm your input is a valid \
                             protein sequence. If error persists, please try again an hour later."
            .to_string(),
        other => format!("MMseqs2 API reported {}", other),
    };
    ColabMsaError::Protocol { status, message }
}
