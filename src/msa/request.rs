use crate::bio::UniqueSequences;

/// A job submission: distinct sequences, the server processing mode and the
/// number the first sequence is named after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub sequences: Vec<String>,
    pub mode: String,
    pub index_offset: usize,
}

impl SubmissionRequest {
    pub fn new(sequences: &UniqueSequences, mode: &str, index_offset: usize) -> Self {
        Self {
            sequences: sequences.iter().map(str::to_string).collect(),
            mode: mode.to_string(),
            index_offset,
        }
    }

    /// The `q` form field: every sequence under a synthetic numeric header
    pub fn query(&self) -> String {
        self.sequences
            .iter()
            .enumerate()
            .map(|(i, seq)| format!(">{}\n{}\n", self.index_offset + i, seq))
            .collect()
    }

    pub fn form(&self) -> [(&'static str, String); 2] {
        [("q", self.query()), ("mode", self.mode.clone())]
    }
}
