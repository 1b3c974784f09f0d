//! Six-frame open reading frame discovery.
//!
//! Each strand is scanned in its three frames. A candidate starts at an
//! in-frame ATG and runs to the first in-frame stop codon (included in the
//! span, not in the protein) or to the last complete codon of the strand.
//! Candidates crossing an untranslatable codon are dropped.
//!
//! Reverse-strand hits are found on the reverse complement and mapped back
//! with [`reverse_to_forward`], so every ORF is reported in forward
//! coordinates.

use crate::alphabet::reverse_complement;
use crate::genetic_code::{GeneticCode, STOP};
use crate::model::{Direction, Orf};

/// Default minimum protein length, in amino acids.
pub const DEFAULT_MIN_PROTEIN_LENGTH: usize = 25;

/// A hit on one strand, 0-based inclusive coordinates on that strand.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameHit {
    start: usize,
    end: usize,
    protein: String,
}

/// Maps a 0-based inclusive interval on the reverse complement of a sequence
/// of length `seq_len` onto the forward strand.
pub fn reverse_to_forward(seq_len: usize, rc_start: usize, rc_end: usize) -> (usize, usize) {
    debug_assert!(rc_start <= rc_end && rc_end < seq_len);
    (seq_len - 1 - rc_end, seq_len - 1 - rc_start)
}

/// Translates from `start` until a stop codon or the end of the strand.
///
/// Returns the protein (without the stop) and the 0-based index of the last
/// base of the final codon.
fn translate_from(strand: &[u8], start: usize, code: &GeneticCode) -> Option<(String, usize)> {
    let mut protein = String::new();
    let mut pos = start;
    while pos + 3 <= strand.len() {
        match code.translate_codon_bytes(&strand[pos..pos + 3])? {
            STOP => return Some((protein, pos + 2)),
            aa => protein.push(aa),
        }
        pos += 3;
    }
    if protein.is_empty() {
        return None;
    }
    // Ran off the end: partial ORF up to the last complete codon
    Some((protein, pos - 1))
}

/// Scans one frame of one strand.
fn scan_frame(strand: &[u8], offset: usize, min_protein_len: usize, code: &GeneticCode) -> Vec<FrameHit> {
    let mut hits = Vec::new();
    let mut pos = offset;

    while pos + 3 <= strand.len() {
        if !code.is_start(&strand[pos..pos + 3]) {
            pos += 3;
            continue;
        }
        match translate_from(strand, pos, code) {
            Some((protein, end)) if protein.chars().count() >= min_protein_len => {
                hits.push(FrameHit {
                    start: pos,
                    end,
                    protein,
                });
                // `end` is the last base of a codon, so this stays in frame
                pos = end + 1;
            }
            _ => pos += 3,
        }
    }

    hits
}

fn to_orf(start: usize, end: usize, frame: i8, direction: Direction, protein: String) -> Orf {
    Orf {
        start: start + 1,
        end: end + 1,
        length: end - start + 1,
        frame,
        direction,
        protein_length: protein.chars().count(),
        protein_sequence: protein,
    }
}

/// Finds ORFs in all six frames of an upper-case DNA sequence.
///
/// The result is sorted by forward start position.
pub fn find_orfs(sequence: &str, min_protein_len: usize) -> Vec<Orf> {
    let bytes = sequence.as_bytes();
    let n = bytes.len();
    if n < 3 {
        return Vec::new();
    }
    let code = GeneticCode::standard();
    let mut orfs = Vec::new();

    for offset in 0..3 {
        for hit in scan_frame(bytes, offset, min_protein_len, code) {
            orfs.push(to_orf(hit.start, hit.end, offset as i8 + 1, Direction::Forward, hit.protein));
        }
    }

    let rev_comp = reverse_complement(bytes, false);
    for offset in 0..3 {
        for hit in scan_frame(&rev_comp, offset, min_protein_len, code) {
            let (start, end) = reverse_to_forward(n, hit.start, hit.end);
            orfs.push(to_orf(start, end, -(offset as i8 + 1), Direction::Reverse, hit.protein));
        }
    }

    orfs.sort_by_key(|orf| orf.start);
    orfs
}
