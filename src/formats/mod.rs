//! Sequence input.
//!
//! Input is either FASTA or a bare sequence (one record, whitespace
//! ignored). The format is detected from the first non-empty line:
//! a `>` header means FASTA, anything else is taken as a bare sequence.
//! The path `-` reads standard input.

pub mod fasta;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::model::Sequence;

/// Identifier given to a sequence that has no FASTA header.
pub const DEFAULT_RECORD_ID: &str = "input";

/// Detected input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Fasta,
    Raw,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Fasta => write!(f, "FASTA"),
            InputFormat::Raw => write!(f, "raw sequence"),
        }
    }
}

/// Errors that can occur while reading input.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty input")]
    EmptyInput,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),
}

/// Result type for input parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Detects the input format by examining the content.
pub fn detect_format_from_content(content: &str) -> Option<InputFormat> {
    let first = content.lines().map(str::trim).find(|line| !line.is_empty())?;
    if first.starts_with('>') {
        Some(InputFormat::Fasta)
    } else {
        Some(InputFormat::Raw)
    }
}

/// Builds a single record from a literal sequence.
pub fn sequence_from_literal(literal: &str) -> Sequence {
    let data: String = literal.chars().filter(|c| !c.is_whitespace()).collect();
    Sequence::new(DEFAULT_RECORD_ID, data)
}

/// Parses in-memory content, detecting the format.
pub fn parse_content(content: &str) -> ParseResult<Vec<Sequence>> {
    match detect_format_from_content(content) {
        Some(InputFormat::Fasta) => Ok(fasta::parse_fasta_str(content)?),
        Some(InputFormat::Raw) => Ok(vec![sequence_from_literal(content)]),
        None => Err(ParseError::EmptyInput),
    }
}

/// Reads all records from a file, or from standard input when `path` is `-`.
pub fn read_sequences<P: AsRef<Path>>(path: P) -> ParseResult<Vec<Sequence>> {
    let path = path.as_ref();
    let mut content = String::new();

    if path == Path::new("-") {
        io::stdin().lock().read_to_string(&mut content)?;
    } else {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len() as usize;
        if file_size == 0 {
            return Err(ParseError::EmptyInput);
        }
        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        content.reserve(file_size);
        reader.read_to_string(&mut content)?;
    }

    let records = parse_content(&content)?;
    debug!(path = %path.display(), records = records.len(), "read input");
    Ok(records)
}
