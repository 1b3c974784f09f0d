//! Data model shared by the validator, the optimizer and the CLI.
//!
//! This module contains:
//! - Input records (identifier + raw sequence)
//! - Validation issues and sequence statistics
//! - ORFs, repeats and palindromes found by the scanners
//! - Codon optimization results
//!
//! Every result type is serializable so that callers can persist or
//! transmit it as-is. Positions are 1-based and inclusive throughout.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single input sequence with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    /// The raw sequence data, as read
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Creates a sequence from raw bytes, replacing invalid UTF-8.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        let data = String::from_utf8(data)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        Self { id: id.into(), data }
    }

    /// Returns the sequence data.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Severity class of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A finding about a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Machine-readable tag, e.g. `invalid_characters`
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ValidationIssue {
    fn new(severity: Severity, kind: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind: kind.to_string(),
            message: message.into(),
            positions: None,
            details: None,
        }
    }

    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn warning(kind: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn info(kind: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, kind, message)
    }

    pub fn with_positions(mut self, positions: Vec<usize>) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Strand on which an ORF was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// An open reading frame, in forward-strand coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orf {
    pub start: usize,
    pub end: usize,
    /// Nucleotide span, `end - start + 1`
    pub length: usize,
    /// +1..+3 forward, -1..-3 reverse
    pub frame: i8,
    pub direction: Direction,
    pub protein_sequence: String,
    pub protein_length: usize,
}

/// A repeated unit and the places it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatUnit {
    pub sequence: String,
    pub length: usize,
    pub count: usize,
    /// Sorted `(start, end)` pairs
    pub occurrences: Vec<(usize, usize)>,
}

/// A substring equal to its own reverse complement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palindrome {
    pub sequence: String,
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

/// Structural and compositional statistics of a sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequenceStatistics {
    pub length: usize,
    /// G+C percentage, two decimals; 0 for proteins
    pub gc_content: f64,
    pub invalid_bases: usize,
    pub has_start_codon: bool,
    pub has_stop_codon: bool,
    pub open_reading_frames: Vec<Orf>,
    pub repeats: Vec<RepeatUnit>,
    pub palindromes: Vec<Palindrome>,
}

/// Outcome of validating one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
    pub stats: SequenceStatistics,
}

impl ValidationResult {
    /// Iterates over all issues, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// Finds the first issue with the given type tag.
    pub fn find(&self, kind: &str) -> Option<&ValidationIssue> {
        self.issues().find(|i| i.kind == kind)
    }
}

/// A codon replaced by the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodonChange {
    /// 1-based codon (amino acid) position
    pub position: usize,
    pub amino_acid: char,
    pub original: String,
    pub optimized: String,
}

/// Outcome of optimizing one coding sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodonOptimizationResult {
    pub original_sequence: String,
    pub optimized_sequence: String,
    pub cai_before: f64,
    pub cai_after: f64,
    pub gc_content_before: f64,
    pub gc_content_after: f64,
    pub changes_made: usize,
    /// Display name of the target organism
    pub organism: String,
    pub codon_changes: Vec<CodonChange>,
}
