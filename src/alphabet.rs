//! Sequence alphabets and nucleotide helpers.
//!
//! This module provides:
//! - The three supported sequence types and their alphabets
//! - Normalization (trim + upper-case) applied before any analysis
//! - GC content and strand-aware reverse complement

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// DNA bases, sorted.
pub const DNA_BASES: &[u8] = b"ACGT";
/// RNA bases, sorted.
pub const RNA_BASES: &[u8] = b"ACGU";
/// The 20 standard amino acids, sorted.
pub const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Kind of biological sequence submitted for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    #[default]
    Dna,
    Rna,
    Protein,
}

impl SequenceType {
    /// Returns the allowed (upper-case) symbols for this sequence type.
    pub fn alphabet(self) -> &'static [u8] {
        match self {
            SequenceType::Dna => DNA_BASES,
            SequenceType::Rna => RNA_BASES,
            SequenceType::Protein => AMINO_ACIDS,
        }
    }

    /// Checks whether a character belongs to the alphabet.
    pub fn is_valid_symbol(self, c: char) -> bool {
        c.is_ascii() && self.alphabet().contains(&(c as u8))
    }

    /// Returns true for DNA and RNA.
    pub fn is_nucleotide(self) -> bool {
        matches!(self, SequenceType::Dna | SequenceType::Rna)
    }

    /// Human-readable noun for the symbols ("DNA bases", "amino acids").
    pub fn symbol_noun(self) -> &'static str {
        match self {
            SequenceType::Dna => "DNA bases",
            SequenceType::Rna => "RNA bases",
            SequenceType::Protein => "amino acids",
        }
    }

    /// Describes the alphabet for error messages, e.g. "A, C, G, T".
    pub fn describe_alphabet(self) -> String {
        let letters = self
            .alphabet()
            .iter()
            .map(|&b| (b as char).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            SequenceType::Protein => format!("the 20 standard ({})", letters),
            _ => letters,
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceType::Dna => write!(f, "dna"),
            SequenceType::Rna => write!(f, "rna"),
            SequenceType::Protein => write!(f, "protein"),
        }
    }
}

impl FromStr for SequenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dna" => Ok(SequenceType::Dna),
            "rna" => Ok(SequenceType::Rna),
            "protein" | "aa" => Ok(SequenceType::Protein),
            other => Err(format!("unknown sequence type '{}'", other)),
        }
    }
}

/// Trims surrounding whitespace and upper-cases the sequence.
pub fn normalize(sequence: &str) -> String {
    sequence.trim().to_uppercase()
}

/// Percentage of G and C characters (case-insensitive) over all characters.
///
/// Returns 0.0 for an empty sequence.
pub fn gc_content(sequence: &str) -> f64 {
    let mut total = 0usize;
    let mut gc = 0usize;
    for c in sequence.chars() {
        total += 1;
        if matches!(c, 'G' | 'C' | 'g' | 'c') {
            gc += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    gc as f64 / total as f64 * 100.0
}

/// Rounds to two decimals, the precision reported in statistics.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Watson-Crick complement of a single base. Unknown symbols are returned unchanged.
pub fn complement(base: u8, rna: bool) -> u8 {
    match (base, rna) {
        (b'A', false) => b'T',
        (b'A', true) => b'U',
        (b'T', _) | (b'U', _) => b'A',
        (b'C', _) => b'G',
        (b'G', _) => b'C',
        (other, _) => other,
    }
}

/// Reverse complement of an upper-case nucleotide sequence.
pub fn reverse_complement(sequence: &[u8], rna: bool) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b, rna)).collect()
}
