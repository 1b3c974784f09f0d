//! Reverse-complement palindrome discovery.
//!
//! A palindrome here is a substring equal to its own reverse complement,
//! such as the EcoRI site GAATTC. The strand alphabet is RNA when the
//! sequence contains a `U`, DNA otherwise.

use crate::alphabet::{complement, DNA_BASES, RNA_BASES};
use crate::intervals::{NestedSpans, Span};
use crate::model::Palindrome;

/// Default minimum palindrome length.
pub const DEFAULT_MIN_PALINDROME_LENGTH: usize = 6;

fn is_self_reverse_complementary(window: &[u8], rna: bool) -> bool {
    let n = window.len();
    (0..n / 2 + n % 2).all(|k| window[k] == complement(window[n - 1 - k], rna))
}

/// Finds palindromes of at least `min_length` bases.
///
/// Windows containing symbols outside the strand alphabet are skipped. A
/// palindrome nested inside a longer one is not reported. The result is
/// sorted by start ascending, then length descending.
pub fn find_palindromes(sequence: &str, min_length: usize) -> Vec<Palindrome> {
    let bytes = sequence.as_bytes();
    let n = bytes.len();
    let min_length = min_length.max(1);
    if n < min_length {
        return Vec::new();
    }

    let rna = bytes.contains(&b'U');
    let bases = if rna { RNA_BASES } else { DNA_BASES };
    let mut found = NestedSpans::new();

    // Odd lengths never match: the middle base would be its own complement.
    // Trimming one base from each end of a palindrome leaves a palindrome,
    // so once a length has no hit no longer length can have one.
    let first_even = min_length + min_length % 2;
    for length in (first_even..=n).step_by(2) {
        let mut hits = 0;
        for i in 0..=n - length {
            let window = &bytes[i..i + length];
            if !window.iter().all(|b| bases.contains(b)) {
                continue;
            }
            if is_self_reverse_complementary(window, rna) {
                hits += 1;
                found.insert(
                    Span::new(i + 1, i + length),
                    Palindrome {
                        sequence: String::from_utf8_lossy(window).into_owned(),
                        start: i + 1,
                        end: i + length,
                        length,
                    },
                );
            }
        }
        if hits == 0 {
            break;
        }
    }

    let mut palindromes: Vec<Palindrome> = found.into_values().collect();
    palindromes.sort_by(|a, b| a.start.cmp(&b.start).then(b.length.cmp(&a.length)));
    palindromes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecori_site() {
        let palindromes = find_palindromes("GAATTC", 6);
        assert_eq!(palindromes.len(), 1);
        let p = &palindromes[0];
        assert_eq!(p.sequence, "GAATTC");
        assert_eq!((p.start, p.end, p.length), (1, 6, 6));
    }

    #[test]
    fn test_embedded_site() {
        let palindromes = find_palindromes("TTTGAATTCTTT", 6);
        assert_eq!(palindromes.len(), 1);
        assert_eq!((palindromes[0].start, palindromes[0].end), (4, 9));
    }

    #[test]
    fn test_longer_palindrome_wins() {
        // AGAATTCT contains GAATTC and is itself palindromic
        let palindromes = find_palindromes("CCAGAATTCTGG", 6);
        assert_eq!(palindromes.len(), 1);
        assert_eq!(palindromes[0].sequence, "CCAGAATTCTGG");
        assert_eq!(palindromes[0].length, 12);
    }

    #[test]
    fn test_odd_lengths_never_match() {
        assert!(find_palindromes("GAATTCA", 7)
            .iter()
            .all(|p| p.length % 2 == 0));
        assert!(!is_self_reverse_complementary(b"GAC", false));
    }

    #[test]
    fn test_rna_palindrome() {
        let palindromes = find_palindromes("GAAUUC", 6);
        assert_eq!(palindromes.len(), 1);
        assert_eq!(palindromes[0].sequence, "GAAUUC");
    }

    #[test]
    fn test_invalid_bases_skipped() {
        assert!(find_palindromes("GAANTTC", 6).is_empty());
        assert!(find_palindromes("GANNTC", 6).is_empty());
    }

    #[test]
    fn test_sorted_by_start() {
        let palindromes = find_palindromes("GAATTCAAAAGGATCCAAAAGCGGCCGC", 6);
        let starts: Vec<_> = palindromes.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![1, 11, 21]);
        assert_eq!(palindromes[2].sequence, "GCGGCCGC");
    }

    #[test]
    fn test_short_input() {
        assert!(find_palindromes("", 6).is_empty());
        assert!(find_palindromes("GATC", 6).is_empty());
        assert_eq!(find_palindromes("GATC", 4).len(), 1);
    }
}
