//! Genetic code definition and translation logic.
//!
//! This module provides:
//! - The standard genetic code (NCBI table 1), built once per process
//! - Codon to amino acid translation
//! - The inverse mapping from amino acid to its synonymous codons
//!
//! Both the validator and the optimizer translate through this table.

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

/// Symbol used for stop codons.
pub const STOP: char = '*';

/// NCBI amino-acid string of the standard code, in TCAG codon order.
const STANDARD_NCBIEAA: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// A codon could not be translated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid codon '{codon}' at nucleotide {position}")]
pub struct TranslationError {
    /// The offending triplet as found in the input
    pub codon: String,
    /// 1-based nucleotide position of the codon's first base
    pub position: usize,
}

/// A genetic code table for translating codons to amino acids.
#[derive(Debug, Clone)]
pub struct GeneticCode {
    /// Name of the genetic code
    pub name: String,
    /// Codon (DNA, upper-case) to amino acid mapping, 64 entries
    codon_table: HashMap<String, char>,
    /// Amino acid to synonymous codons, in NCBI codon order
    synonyms: HashMap<char, Vec<String>>,
}

impl GeneticCode {
    /// Creates a genetic code from an NCBI 64-character amino-acid string.
    fn new(name: &str, ncbieaa: &str) -> Self {
        let bases = ['T', 'C', 'A', 'G'];
        let mut codon_table = HashMap::with_capacity(64);
        let mut synonyms: HashMap<char, Vec<String>> = HashMap::new();

        // NCBI order: TTT, TTC, TTA, TTG, TCT, TCC, ... (Base1, Base2, Base3)
        let mut aas = ncbieaa.chars();
        for &b1 in &bases {
            for &b2 in &bases {
                for &b3 in &bases {
                    let codon: String = [b1, b2, b3].iter().collect();
                    let aa = aas.next().unwrap_or('X');
                    synonyms.entry(aa).or_default().push(codon.clone());
                    codon_table.insert(codon, aa);
                }
            }
        }

        Self {
            name: name.to_string(),
            codon_table,
            synonyms,
        }
    }

    /// Returns the process-wide standard genetic code.
    pub fn standard() -> &'static GeneticCode {
        static STANDARD: OnceLock<GeneticCode> = OnceLock::new();
        STANDARD.get_or_init(|| GeneticCode::new("Standard", STANDARD_NCBIEAA))
    }

    /// Translates a single codon to an amino acid.
    ///
    /// Case-insensitive; `U` is read as `T`. Returns `None` for anything that
    /// is not a triplet of A, C, G, T/U.
    pub fn translate_codon(&self, codon: &str) -> Option<char> {
        if codon.len() != 3 {
            return None;
        }
        let codon_dna: String = codon
            .chars()
            .map(|c| match c.to_ascii_uppercase() {
                'U' => 'T',
                other => other,
            })
            .collect();
        self.codon_table.get(codon_dna.as_str()).copied()
    }

    /// Byte-slice variant of [`translate_codon`](Self::translate_codon).
    pub fn translate_codon_bytes(&self, codon: &[u8]) -> Option<char> {
        std::str::from_utf8(codon)
            .ok()
            .and_then(|c| self.translate_codon(c))
    }

    /// Translates a whole coding sequence, codon by codon, from frame 0.
    ///
    /// Trailing bases that do not form a complete codon are ignored. Fails on
    /// the first unrecognized codon.
    pub fn translate(&self, sequence: &str) -> Result<Vec<char>, TranslationError> {
        let bytes = sequence.as_bytes();
        let mut protein = Vec::with_capacity(bytes.len() / 3);
        for (i, codon) in bytes.chunks_exact(3).enumerate() {
            match self.translate_codon_bytes(codon) {
                Some(aa) => protein.push(aa),
                None => {
                    return Err(TranslationError {
                        codon: String::from_utf8_lossy(codon).into_owned(),
                        position: i * 3 + 1,
                    })
                }
            }
        }
        Ok(protein)
    }

    /// Returns the codons encoding `aa` (empty for unknown symbols).
    pub fn synonymous_codons(&self, aa: char) -> &[String] {
        self.synonyms.get(&aa).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over all amino acids (and the stop symbol) with their codons.
    pub fn amino_acids(&self) -> impl Iterator<Item = (char, &[String])> {
        self.synonyms.iter().map(|(&aa, codons)| (aa, codons.as_slice()))
    }

    /// Returns true if the codon is ATG (or AUG).
    pub fn is_start(&self, codon: &[u8]) -> bool {
        matches!(codon, b"ATG" | b"AUG")
    }

    /// Returns true if the codon translates to a stop.
    pub fn is_stop(&self, codon: &[u8]) -> bool {
        self.translate_codon_bytes(codon) == Some(STOP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_code_translation() {
        let standard = GeneticCode::standard();

        assert_eq!(standard.translate_codon("ATG"), Some('M')); // Start codon
        assert_eq!(standard.translate_codon("TAA"), Some(STOP));
        assert_eq!(standard.translate_codon("TAG"), Some(STOP));
        assert_eq!(standard.translate_codon("TGA"), Some(STOP));
        assert_eq!(standard.translate_codon("TTT"), Some('F'));
        assert_eq!(standard.translate_codon("GGG"), Some('G'));
        assert_eq!(standard.translate_codon("TGG"), Some('W'));
    }

    #[test]
    fn test_rna_translation() {
        let standard = GeneticCode::standard();

        // U should be treated as T
        assert_eq!(standard.translate_codon("AUG"), Some('M'));
        assert_eq!(standard.translate_codon("UUU"), Some('F'));
    }

    #[test]
    fn test_unrecognized_codons() {
        let standard = GeneticCode::standard();

        assert_eq!(standard.translate_codon("ATN"), None);
        assert_eq!(standard.translate_codon("NNN"), None);
        assert_eq!(standard.translate_codon("AT"), None);
        assert_eq!(standard.translate_codon("A-G"), None);
    }

    #[test]
    fn test_case_insensitive() {
        let standard = GeneticCode::standard();

        assert_eq!(standard.translate_codon("atg"), Some('M'));
        assert_eq!(standard.translate_codon("AtG"), Some('M'));
    }

    #[test]
    fn test_sequence_translation() {
        let standard = GeneticCode::standard();

        assert_eq!(standard.translate("ATGTTTTAG").unwrap(), vec!['M', 'F', STOP]);
        // Incomplete trailing codon is ignored
        assert_eq!(standard.translate("ATGTT").unwrap(), vec!['M']);

        let err = standard.translate("ATGTTNTAG").unwrap_err();
        assert_eq!(err.codon, "TTN");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_synonymous_codons() {
        let standard = GeneticCode::standard();

        assert_eq!(standard.synonymous_codons('M'), ["ATG"]);
        assert_eq!(standard.synonymous_codons('W'), ["TGG"]);
        assert_eq!(standard.synonymous_codons('L').len(), 6);
        assert_eq!(standard.synonymous_codons('R').len(), 6);
        assert_eq!(standard.synonymous_codons(STOP).len(), 3);
        assert!(standard.synonymous_codons('X').is_empty());

        // 20 amino acids + stop, 64 codons in total
        assert_eq!(standard.amino_acids().count(), 21);
        let total: usize = standard.amino_acids().map(|(_, c)| c.len()).sum();
        assert_eq!(total, 64);
    }

    #[test]
    fn test_start_stop() {
        let standard = GeneticCode::standard();

        assert!(standard.is_start(b"ATG"));
        assert!(!standard.is_start(b"GTG"));
        assert!(standard.is_stop(b"TGA"));
        assert!(standard.is_stop(b"UAA"));
        assert!(!standard.is_stop(b"TGG"));
    }
}
