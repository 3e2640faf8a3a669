pub mod dedup;
pub mod fasta;
pub mod hits;
pub mod sequence;

pub use dedup::UniqueSequences;
pub use hits::{process_hits, Hit};
pub use sequence::Sequence;
