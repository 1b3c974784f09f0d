//! Direct repeat discovery.
//!
//! Candidate units are tried from the shortest allowed length upwards. For
//! each length, every start position not yet claimed by a repeat of that
//! length is taken as a unit and counted by a non-overlapping left-to-right
//! search. A longer unit absorbs a shorter one when every occurrence of the
//! shorter unit sits inside an occurrence of the longer one.
//!
//! The scan stops at the first length where no unit repeats: the prefixes
//! of disjoint occurrences are disjoint, so no longer unit can repeat either.

use crate::intervals::{all_nested, Span};
use crate::model::RepeatUnit;

/// Default minimum unit length.
pub const DEFAULT_MIN_REPEAT_LENGTH: usize = 10;
/// Default minimum number of occurrences.
pub const DEFAULT_MIN_REPEAT_COUNT: usize = 2;

#[derive(Debug)]
struct Candidate {
    unit: Vec<u8>,
    /// Sorted and disjoint
    spans: Vec<Span>,
}

impl Candidate {
    fn len(&self) -> usize {
        self.unit.len()
    }

    fn into_repeat(self) -> RepeatUnit {
        RepeatUnit {
            length: self.unit.len(),
            count: self.spans.len(),
            occurrences: self.spans.iter().map(|s| (s.start, s.end)).collect(),
            sequence: String::from_utf8_lossy(&self.unit).into_owned(),
        }
    }
}

/// Non-overlapping occurrences of `unit` at or after `from`, as 1-based spans.
fn occurrences(haystack: &[u8], unit: &[u8], from: usize) -> Vec<Span> {
    let len = unit.len();
    let mut spans = Vec::new();
    let mut offset = from;
    while offset + len <= haystack.len() {
        match haystack[offset..].windows(len).position(|w| w == unit) {
            Some(rel) => {
                let at = offset + rel;
                spans.push(Span::new(at + 1, at + len));
                offset = at + len;
            }
            None => break,
        }
    }
    spans
}

/// Finds exact direct repeats in an upper-case nucleotide sequence.
///
/// `min_length` and `min_count` are clamped to at least 1. The result is
/// sorted by unit length, then count, both descending.
pub fn find_repeats(sequence: &str, min_length: usize, min_count: usize) -> Vec<RepeatUnit> {
    scan_repeats(sequence.as_bytes(), min_length, min_count, true)
}

fn scan_repeats(bytes: &[u8], min_length: usize, min_count: usize, stop_early: bool) -> Vec<RepeatUnit> {
    let n = bytes.len();
    let min_length = min_length.max(1);
    let min_count = min_count.max(1);
    if n == 0 || n < min_length.saturating_mul(min_count) {
        return Vec::new();
    }

    let mut claimed = vec![false; n];
    let mut recorded: Vec<Candidate> = Vec::new();

    for length in min_length..=n / min_count {
        // Claims are per length, otherwise the first length would claim
        // every start a longer unit could use.
        claimed.fill(false);
        let mut repeating = 0usize;
        for i in 0..=n - length {
            if claimed[i] {
                // Claimed by a unit kept at this length
                repeating += 1;
                continue;
            }
            let unit = &bytes[i..i + length];
            let spans = occurrences(bytes, unit, i);
            if spans.len() < min_count {
                continue;
            }
            repeating += 1;

            let absorbed = recorded
                .iter()
                .any(|r| r.len() > length && all_nested(&spans, &r.spans));
            if absorbed {
                continue;
            }
            recorded.retain(|r| !(r.len() < length && all_nested(&r.spans, &spans)));

            for span in &spans {
                claimed[span.start - 1..span.end].fill(true);
            }
            recorded.push(Candidate {
                unit: unit.to_vec(),
                spans,
            });
        }
        if stop_early && repeating == 0 {
            break;
        }
    }

    let mut repeats: Vec<RepeatUnit> = recorded.into_iter().map(Candidate::into_repeat).collect();
    repeats.sort_by(|a, b| b.length.cmp(&a.length).then(b.count.cmp(&a.count)));
    repeats
}
