//! FASTA reading and writing.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ATGGCTAAACTG...
//! >another_sequence
//! ATGTGGTAA...
//! ```
//!
//! Sequence lines are concatenated with internal whitespace removed. Case is
//! preserved; analysis normalizes it later. A header with no sequence lines
//! yields an empty record rather than being dropped.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::model::Sequence;

/// Line width used when writing FASTA.
pub const FASTA_LINE_WIDTH: usize = 60;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No FASTA records found")]
    EmptyFile,

    #[error("Empty sequence identifier at line {0}")]
    EmptyIdentifier(usize),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Accumulates records line by line.
#[derive(Default)]
struct RecordBuilder {
    records: Vec<Sequence>,
    current_id: Option<String>,
    current_seq: Vec<u8>,
}

impl RecordBuilder {
    fn push_line(&mut self, line: &str, line_number: usize) -> FastaResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(header) = line.strip_prefix('>') {
            self.finish_record();
            // Identifier is everything before the first space
            let id = header.split_whitespace().next().unwrap_or("");
            if id.is_empty() {
                return Err(FastaError::EmptyIdentifier(line_number));
            }
            self.current_id = Some(id.to_string());
        } else {
            if self.current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }
            self.current_seq
                .extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
        Ok(())
    }

    fn finish_record(&mut self) {
        if let Some(id) = self.current_id.take() {
            let data = std::mem::take(&mut self.current_seq);
            self.records.push(Sequence::from_bytes(id, data));
        }
    }

    fn finish(mut self) -> FastaResult<Vec<Sequence>> {
        self.finish_record();
        if self.records.is_empty() {
            return Err(FastaError::EmptyFile);
        }
        Ok(self.records)
    }
}

/// Parses FASTA content from a reader.
pub fn parse_fasta<R: BufRead>(reader: R) -> FastaResult<Vec<Sequence>> {
    let mut builder = RecordBuilder::default();
    for (index, line) in reader.lines().enumerate() {
        builder.push_line(&line?, index + 1)?;
    }
    builder.finish()
}

/// Parses FASTA content from a string.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<Sequence>> {
    parse_fasta(content.as_bytes())
}

/// Writes records as FASTA, wrapping sequence lines at `width` columns
/// (0 disables wrapping).
pub fn write_fasta<'a, W, I>(writer: &mut W, records: I, width: usize) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Sequence>,
{
    for record in records {
        writeln!(writer, ">{}", record.id)?;
        if width == 0 {
            writeln!(writer, "{}", record.as_str())?;
            continue;
        }
        for chunk in record.data.as_bytes().chunks(width) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let records = parse_fasta_str(">seq1\nACGT\n>seq2\nTGCA\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].as_str(), "ACGT");
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].as_str(), "TGCA");
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let records = parse_fasta_str(">seq1\nACGT\nTG CA\nAAAA\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_str(), "ACGTTGCAAAAA");
    }

    #[test]
    fn test_parse_with_description_and_blank_lines() {
        let records = parse_fasta_str("\n>seq1 a description\nacgt\n\n>seq2\n\nTGCA\n").unwrap();
        assert_eq!(records[0].id, "seq1");
        // Case is preserved
        assert_eq!(records[0].as_str(), "acgt");
        assert_eq!(records[1].as_str(), "TGCA");
    }

    #[test]
    fn test_header_without_sequence_is_kept() {
        let records = parse_fasta_str(">empty\n>seq\nATG\n").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_empty());
        assert_eq!(records[1].as_str(), "ATG");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_fasta_str(""), Err(FastaError::EmptyFile)));
        assert!(matches!(parse_fasta_str("\n  \n"), Err(FastaError::EmptyFile)));
        assert!(matches!(
            parse_fasta_str("ACGT\n>seq1\nTGCA\n"),
            Err(FastaError::SequenceWithoutHeader(1))
        ));
        assert!(matches!(
            parse_fasta_str(">seq1\nACGT\n> \nTT\n"),
            Err(FastaError::EmptyIdentifier(3))
        ));
    }

    #[test]
    fn test_reader_crlf() {
        let content = ">a desc\r\nATG\r\nGCT\r\n>b\r\nTAA\r\n";
        let records = parse_fasta(io::Cursor::new(content)).unwrap();
        assert_eq!(records, vec![Sequence::new("a", "ATGGCT"), Sequence::new("b", "TAA")]);
        assert_eq!(records, parse_fasta_str(content).unwrap());
    }

    #[test]
    fn test_write_fasta_wraps() {
        let records = vec![Sequence::new("long", "A".repeat(130)), Sequence::new("short", "ATG")];
        let mut out = Vec::new();
        write_fasta(&mut out, &records, FASTA_LINE_WIDTH).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ">long");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines[4], ">short");
        assert_eq!(lines[5], "ATG");

        let mut out = Vec::new();
        write_fasta(&mut out, &records[1..], 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">short\nATG\n");
    }

    #[test]
    fn test_write_then_parse() {
        let records = vec![Sequence::new("r1", "ATGC".repeat(40))];
        let mut out = Vec::new();
        write_fasta(&mut out, &records, 60).unwrap();
        assert_eq!(parse_fasta(out.as_slice()).unwrap(), records);
    }
}
