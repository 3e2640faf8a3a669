use crate::bio::sequence::Sequence;
use crate::ColabMsaError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending, space1},
    combinator::{eof, map_res, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parse a FASTA header line. The id ends at the first space or tab; the
/// rest of the line, if any, is the description.
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map_res(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        std::str::from_utf8,
    )(input)?;
    let (input, description) = opt(preceded(
        space1,
        map_res(not_line_ending, std::str::from_utf8),
    ))(input)?;
    // A header on the last line may have no terminator
    let (input, _) = alt((line_ending, eof))(input)?;
    let description = description.map(str::trim_end).filter(|d| !d.is_empty());
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase());
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], Sequence> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let mut seq = Sequence::new(id.to_string(), sequence);
    if let Some(desc) = description {
        seq = seq.with_description(desc.to_string());
    }

    Ok((input, seq))
}

/// Parse FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<Sequence>, ColabMsaError> {
    let mut input = data;
    let mut sequences = Vec::new();

    while !input.is_empty() {
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        if input[0] != b'>' {
            return Err(ColabMsaError::Parse(
                "FASTA data must start with a '>' header".to_string(),
            ));
        }

        match parse_record(input) {
            Ok((remaining, seq)) => {
                if !seq.is_empty() {
                    sequences.push(seq);
                }
                input = remaining;
            }
            Err(e) => {
                return Err(ColabMsaError::Parse(format!("Failed to parse FASTA: {:?}", e)));
            }
        }
    }

    Ok(sequences)
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>, ColabMsaError> {
    let path = path.as_ref();

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)
    } else {
        parse_fasta_uncompressed(path)
    }
}

fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<Sequence>, ColabMsaError> {
    let file = File::open(path)?;
    // Zero-length files cannot be mapped
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_from_bytes(&mmap[..])
}

fn parse_fasta_gzip(path: &Path) -> Result<Vec<Sequence>, ColabMsaError> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;

    parse_fasta_from_bytes(&buffer)
}
