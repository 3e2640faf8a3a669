//! Hit extraction from MMseqs2 a3m alignments.
//!
//! The server annotates every aligned database entry with a header of the
//! form `>UniRef100_<ID>\t<score>\t<identity>\t<evalue>...`. Only those
//! headers matter here; the aligned residues are ignored.

use crate::ColabMsaError;
use indexmap::IndexSet;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const DEFAULT_HEADER_PREFIX: &str = ">UniRef100";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    #[serde(rename = "UniRef ID")]
    pub uniref_id: String,
    #[serde(rename = "Score")]
    pub score: i64,
    #[serde(rename = "Identity")]
    pub identity: f64,
    #[serde(rename = "E-Value")]
    pub evalue: f64,
}

impl Hit {
    /// Parse a hit header line. `line_no` is only used for error messages.
    pub fn parse_header(line: &str, line_no: usize) -> Result<Self, ColabMsaError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(ColabMsaError::Parse(format!(
                "line {}: expected id, score, identity and e-value, found {} field(s)",
                line_no,
                fields.len()
            )));
        }

        let uniref_id = fields[0]
            .split('_')
            .nth(1)
            .ok_or_else(|| {
                ColabMsaError::Parse(format!("line {}: malformed hit id '{}'", line_no, fields[0]))
            })?
            .to_string();

        let score = fields[1].parse::<i64>().map_err(|e| {
            ColabMsaError::Parse(format!("line {}: bad score '{}': {}", line_no, fields[1], e))
        })?;
        let identity = parse_float(fields[2], "identity", line_no)?;
        let evalue = parse_float(fields[3], "e-value", line_no)?;

        Ok(Hit {
            uniref_id,
            score,
            identity,
            evalue,
        })
    }
}

fn parse_float(field: &str, what: &str, line_no: usize) -> Result<f64, ColabMsaError> {
    field.parse::<f64>().map_err(|e| {
        ColabMsaError::Parse(format!("line {}: bad {} '{}': {}", line_no, what, field, e))
    })
}

/// Read every hit header starting with `prefix`, in file order
pub fn read_hits<R: BufRead>(reader: R, prefix: &str) -> Result<Vec<Hit>, ColabMsaError> {
    let mut hits = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with(prefix) {
            hits.push(Hit::parse_header(&line, idx + 1)?);
        }
    }
    Ok(hits)
}

/// Keep hits at or below the E-value cutoff
pub fn filter_by_evalue(hits: Vec<Hit>, max_evalue: f64) -> Vec<Hit> {
    hits.into_iter().filter(|h| h.evalue <= max_evalue).collect()
}

/// Distinct hit ids in first-seen order
pub fn unique_ids(hits: &[Hit]) -> Vec<&str> {
    hits.iter()
        .map(|h| h.uniref_id.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

pub fn write_hits_csv<W: Write>(writer: W, hits: &[Hit]) -> Result<(), ColabMsaError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written by hand so an empty table still carries its columns
    csv_writer
        .write_record(["UniRef ID", "Score", "Identity", "E-Value"])
        .map_err(csv_error)?;
    for hit in hits {
        csv_writer.serialize(hit).map_err(csv_error)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_id_list<W: Write>(mut writer: W, ids: &[&str]) -> Result<(), ColabMsaError> {
    writeln!(writer, "{}", ids.join("\n"))?;
    writer.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> ColabMsaError {
    ColabMsaError::Other(format!("Failed to write CSV: {}", e))
}

/// Filter the hits of an a3m file and write the hit table and id list.
///
/// Returns the hits that passed the cutoff.
pub fn process_hits(
    a3m_path: &Path,
    max_evalue: f64,
    list_path: &Path,
    hits_path: &Path,
    prefix: &str,
) -> Result<Vec<Hit>, ColabMsaError> {
    let reader = BufReader::new(File::open(a3m_path)?);
    let all_hits = read_hits(reader, prefix)?;
    let total = all_hits.len();
    let kept = filter_by_evalue(all_hits, max_evalue);

    info!(
        "Kept {} of {} hits with E-value <= {}",
        kept.len(),
        total,
        max_evalue
    );

    write_hits_csv(BufWriter::new(File::create(hits_path)?), &kept)?;
    write_id_list(BufWriter::new(File::create(list_path)?), &unique_ids(&kept))?;

    Ok(kept)
}
