//! Common test utilities for colabmsa tests
//!
//! Provides a scripted in-memory MSA server and archive builders so client
//! lifecycle tests never touch the network or sleep.
#![allow(dead_code)]

use colabmsa::msa::{MsaTransport, SubmissionRequest, TransportError};
use colabmsa::Config;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use tar::{Builder, Header};

pub type Reply = Result<String, TransportError>;

/// A request the scripted server received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit(String),
    Status(String),
    Download(String),
}

/// Answers each endpoint from its own queue of replies. Running past the
/// end of a queue panics so an unexpected extra request fails the test.
pub struct ScriptedTransport {
    submissions: RefCell<VecDeque<Reply>>,
    statuses: RefCell<VecDeque<Reply>>,
    downloads: RefCell<VecDeque<Result<Vec<u8>, TransportError>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        ScriptedTransport {
            submissions: RefCell::new(VecDeque::new()),
            statuses: RefCell::new(VecDeque::new()),
            downloads: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn on_submit(self, reply: Reply) -> Self {
        self.submissions.borrow_mut().push_back(reply);
        self
    }

    pub fn on_status(self, reply: Reply) -> Self {
        self.statuses.borrow_mut().push_back(reply);
        self
    }

    pub fn on_download(self, reply: Result<Vec<u8>, TransportError>) -> Self {
        self.downloads.borrow_mut().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }
}

impl MsaTransport for ScriptedTransport {
    fn submit(&self, request: &SubmissionRequest) -> Result<String, TransportError> {
        self.calls.borrow_mut().push(Call::Submit(request.query()));
        self.submissions
            .borrow_mut()
            .pop_front()
            .expect("unexpected submission")
    }

    fn status(&self, job_id: &str) -> Result<String, TransportError> {
        self.calls.borrow_mut().push(Call::Status(job_id.to_string()));
        self.statuses
            .borrow_mut()
            .pop_front()
            .expect("unexpected status request")
    }

    fn download(&self, job_id: &str) -> Result<Vec<u8>, TransportError> {
        self.calls.borrow_mut().push(Call::Download(job_id.to_string()));
        self.downloads
            .borrow_mut()
            .pop_front()
            .expect("unexpected download")
    }
}

/// JSON ticket body as the server sends it
pub fn ticket(status: &str, id: Option<&str>) -> Reply {
    Ok(match id {
        Some(id) => format!(r#"{{"id": "{}", "status": "{}"}}"#, id, status),
        None => format!(r#"{{"status": "{}"}}"#, status),
    })
}

/// Defaults with every wait set to zero and the progress bar hidden
pub fn instant_config() -> Config {
    let mut config = Config::default();
    config.retry.poll_min_secs = 0;
    config.retry.poll_jitter_secs = 0;
    config.retry.transport_retry_delay_secs = 0.0;
    config.job.show_progress = false;
    config
}

/// A gzip-compressed tar holding the given members
pub fn tar_gz(members: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in members {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, name, data.as_bytes())
            .expect("Failed to append tar member");
    }
    builder
        .into_inner()
        .expect("Failed to finish tar")
        .finish()
        .expect("Failed to finish gzip")
}

/// Result archive shaped like the server's, with `alignment` as uniref.a3m
pub fn result_archive(alignment: &str) -> Vec<u8> {
    tar_gz(&[
        ("uniref.a3m", alignment),
        ("bfd.mgnify30.metaeuk30.smag30.a3m", ">101\nMKT\n"),
        ("pdb70.m8", ""),
    ])
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, contents).expect("Failed to write file");
}
