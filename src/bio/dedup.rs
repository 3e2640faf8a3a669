use indexmap::IndexSet;

/// Distinct sequences in first-seen order, plus the position of every input
/// sequence within that list.
///
/// The MSA server names each submitted entry `offset + index`, so
/// [`UniqueSequences::job_indices`] recovers the server-side name of every
/// original input, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueSequences {
    unique: IndexSet<String>,
    positions: Vec<usize>,
}

impl UniqueSequences {
    pub fn new<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = IndexSet::new();
        let positions = sequences
            .into_iter()
            .map(|seq| unique.insert_full(seq.into()).0)
            .collect();

        Self { unique, positions }
    }

    /// Number of distinct sequences
    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    /// Number of input sequences before deduplication
    pub fn input_len(&self) -> usize {
        self.positions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.unique.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.unique.get_index(index).map(String::as_str)
    }

    /// For input `i`, the index of its entry among the unique sequences
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn job_indices(&self, offset: usize) -> Vec<usize> {
        self.positions.iter().map(|p| offset + p).collect()
    }
}
