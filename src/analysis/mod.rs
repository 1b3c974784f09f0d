//! Sequence validation.
//!
//! The validator classifies a sequence and computes its statistics:
//! - Character validation against the DNA, RNA or protein alphabet
//! - GC content (nucleotides only)
//! - Six-frame ORFs (DNA only)
//! - Direct repeats and reverse-complement palindromes (nucleotides only)
//! - Length sanity checks driven by an optional component type hint
//!
//! Validation never fails: every finding becomes a [`ValidationIssue`].
//! Only invalid characters (or an empty sequence) make a sequence invalid.

pub mod orf;
pub mod palindromes;
pub mod repeats;

use serde_json::json;
use tracing::debug;

use crate::alphabet::{gc_content, normalize, round2, SequenceType};
use crate::genetic_code::GeneticCode;
use crate::model::{SequenceStatistics, ValidationIssue, ValidationResult};

pub use orf::{find_orfs, reverse_to_forward, DEFAULT_MIN_PROTEIN_LENGTH};
pub use palindromes::{find_palindromes, DEFAULT_MIN_PALINDROME_LENGTH};
pub use repeats::{find_repeats, DEFAULT_MIN_REPEAT_COUNT, DEFAULT_MIN_REPEAT_LENGTH};

/// Thresholds used by the scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Minimum ORF protein length, in amino acids
    pub min_orf_protein_length: usize,
    /// Minimum repeat unit length
    pub min_repeat_length: usize,
    /// Minimum number of repeat occurrences
    pub min_repeat_count: usize,
    /// Minimum palindrome length
    pub min_palindrome_length: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_orf_protein_length: DEFAULT_MIN_PROTEIN_LENGTH,
            min_repeat_length: DEFAULT_MIN_REPEAT_LENGTH,
            min_repeat_count: DEFAULT_MIN_REPEAT_COUNT,
            min_palindrome_length: DEFAULT_MIN_PALINDROME_LENGTH,
        }
    }
}

/// Validates sequences with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SequenceValidator {
    config: ValidatorConfig,
}

impl SequenceValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates a raw sequence.
    ///
    /// The sequence is trimmed and upper-cased first. `component_type` is a
    /// free-form hint such as "gene", "promoter", "cds" or "terminator".
    #[tracing::instrument(level = "debug", skip_all, fields(sequence_type = %sequence_type))]
    pub fn validate(
        &self,
        sequence: &str,
        sequence_type: SequenceType,
        component_type: Option<&str>,
    ) -> ValidationResult {
        let sequence = normalize(sequence);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut info = Vec::new();

        if sequence.is_empty() {
            errors.push(ValidationIssue::error(
                "empty_sequence",
                "The provided sequence is empty.",
            ));
            return ValidationResult {
                is_valid: false,
                errors,
                warnings,
                info,
                stats: SequenceStatistics::default(),
            };
        }

        let stats = self.statistics(&sequence, sequence_type);
        let min_orf = self.config.min_orf_protein_length;

        if stats.invalid_bases > 0 {
            let positions = invalid_positions(&sequence, sequence_type);
            errors.push(
                ValidationIssue::error(
                    "invalid_characters",
                    format!(
                        "The sequence contains {} invalid {}. Only {} are allowed.",
                        stats.invalid_bases,
                        sequence_type.symbol_noun(),
                        sequence_type.describe_alphabet()
                    ),
                )
                .with_details(json!({ "positions": &positions }))
                .with_positions(positions),
            );
        }

        if sequence_type.is_nucleotide() {
            if let Some(issue) = gc_issue(stats.gc_content) {
                warnings.push(issue);
            }
        }

        if sequence_type == SequenceType::Dna {
            let orfs = &stats.open_reading_frames;
            let is_gene = component_type
                .map(|c| c.to_lowercase().contains("gene"))
                .unwrap_or(false);
            if is_gene {
                if orfs.is_empty() {
                    warnings.push(ValidationIssue::warning(
                        "no_orfs_found_in_gene",
                        format!("No ORF (protein >= {}aa) found for the gene.", min_orf),
                    ));
                } else {
                    let summary: Vec<String> = orfs
                        .iter()
                        .map(|orf| {
                            format!(
                                "ORF frame {} ({}): {}-{} ({}nt), protein {}aa",
                                orf.frame, orf.direction, orf.start, orf.end, orf.length, orf.protein_length
                            )
                        })
                        .collect();
                    info.push(
                        ValidationIssue::info(
                            "orfs_analysis",
                            format!("Found {} ORF(s) with protein >= {}aa.", orfs.len(), min_orf),
                        )
                        .with_details(json!({ "orf_summary": summary })),
                    );
                }
            } else if !orfs.is_empty() {
                info.push(
                    ValidationIssue::info(
                        "orfs_present",
                        format!("Found {} ORF(s) with protein >= {}aa.", orfs.len(), min_orf),
                    )
                    .with_details(json!({ "orf_count": orfs.len() })),
                );
            }
        }

        if !stats.repeats.is_empty() {
            let summary: Vec<String> = stats
                .repeats
                .iter()
                .map(|r| {
                    let spans: Vec<String> = r
                        .occurrences
                        .iter()
                        .map(|(s, e)| format!("{}-{}", s, e))
                        .collect();
                    format!("{}x '{}' (len {}) at {}", r.count, r.sequence, r.length, spans.join(", "))
                })
                .collect();
            warnings.push(
                ValidationIssue::warning(
                    "repeats_found",
                    format!("Found {} repeated sequence unit(s) (see statistics).", stats.repeats.len()),
                )
                .with_details(json!({ "repeat_summary": summary })),
            );
        }

        if !stats.palindromes.is_empty() {
            let summary: Vec<String> = stats
                .palindromes
                .iter()
                .map(|p| format!("'{}' (pos {}-{}, len {})", p.sequence, p.start, p.end, p.length))
                .collect();
            info.push(
                ValidationIssue::info(
                    "palindromes_found",
                    format!("Found {} palindromic sequence(s) (see statistics).", stats.palindromes.len()),
                )
                .with_details(json!({ "palindrome_summary": summary })),
            );
        }

        if let Some(component) = component_type {
            if let Some(issue) = length_issue(component, stats.length, min_orf) {
                warnings.push(issue);
            }
        }

        debug!(
            length = stats.length,
            errors = errors.len(),
            warnings = warnings.len(),
            info = info.len(),
            "sequence validated"
        );

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            info,
            stats,
        }
    }

    /// Computes statistics for an already normalized sequence.
    pub fn statistics(&self, sequence: &str, sequence_type: SequenceType) -> SequenceStatistics {
        let length = sequence.chars().count();
        let invalid_bases = sequence
            .chars()
            .filter(|&c| !sequence_type.is_valid_symbol(c))
            .count();

        let mut stats = SequenceStatistics {
            length,
            invalid_bases,
            ..SequenceStatistics::default()
        };

        if sequence_type.is_nucleotide() {
            let code = GeneticCode::standard();
            let bytes = sequence.as_bytes();
            stats.gc_content = round2(gc_content(sequence));
            stats.has_start_codon = bytes.windows(3).any(|w| code.is_start(w));
            stats.has_stop_codon = bytes.windows(3).any(|w| code.is_stop(w));
            stats.repeats = find_repeats(
                sequence,
                self.config.min_repeat_length,
                self.config.min_repeat_count,
            );
            stats.palindromes = find_palindromes(sequence, self.config.min_palindrome_length);
        }
        if sequence_type == SequenceType::Dna {
            stats.open_reading_frames = find_orfs(sequence, self.config.min_orf_protein_length);
        }

        debug!(
            length,
            invalid_bases,
            orfs = stats.open_reading_frames.len(),
            repeats = stats.repeats.len(),
            palindromes = stats.palindromes.len(),
            "sequence statistics computed"
        );
        stats
    }
}

/// Validates with default scanner thresholds and the given ORF minimum.
pub fn validate(
    sequence: &str,
    sequence_type: SequenceType,
    component_type: Option<&str>,
    min_orf_protein_length: usize,
) -> ValidationResult {
    let config = ValidatorConfig {
        min_orf_protein_length,
        ..ValidatorConfig::default()
    };
    SequenceValidator::new(config).validate(sequence, sequence_type, component_type)
}

/// 1-based character positions outside the alphabet.
fn invalid_positions(sequence: &str, sequence_type: SequenceType) -> Vec<usize> {
    sequence
        .chars()
        .enumerate()
        .filter(|&(_, c)| !sequence_type.is_valid_symbol(c))
        .map(|(i, _)| i + 1)
        .collect()
}

fn gc_issue(gc: f64) -> Option<ValidationIssue> {
    if gc < 20.0 {
        Some(ValidationIssue::warning(
            "very_low_gc_content",
            format!("Extremely low GC content ({:.1}%). May indicate problems.", gc),
        ))
    } else if gc < 35.0 {
        Some(ValidationIssue::warning(
            "low_gc_content",
            format!("Low GC content ({:.1}%).", gc),
        ))
    } else if gc > 75.0 {
        Some(ValidationIssue::warning(
            "very_high_gc_content",
            format!("Extremely high GC content ({:.1}%). May cause problems.", gc),
        ))
    } else if gc > 65.0 {
        Some(ValidationIssue::warning(
            "high_gc_content",
            format!("High GC content ({:.1}%).", gc),
        ))
    } else {
        None
    }
}

/// Heuristic length check for a component type; first matching rule wins.
fn length_issue(component: &str, length: usize, min_orf: usize) -> Option<ValidationIssue> {
    let component = component.to_lowercase();
    if component == "promoter" {
        if !(20..=1000).contains(&length) {
            return Some(ValidationIssue::warning(
                "promoter_length_check",
                format!("Unusual promoter length ({}bp).", length),
            ));
        }
    } else if component == "gene" {
        if length < min_orf * 3 {
            return Some(ValidationIssue::warning(
                "gene_too_short_for_orf",
                format!("Gene ({}bp) too short to encode a {}aa protein.", length, min_orf),
            ));
        }
    } else if component.contains("cds") {
        if length > 0 && length % 3 != 0 {
            return Some(ValidationIssue::warning(
                "cds_not_multiple_of_3",
                format!("CDS length ({}bp) is not a multiple of 3.", length),
            ));
        }
    } else if component == "terminator" && !(15..=500).contains(&length) {
        return Some(ValidationIssue::warning(
            "terminator_length_check",
            format!("Unusual terminator length ({}bp).", length),
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn coding(n: usize) -> String {
        let mut s = String::from("ATG");
        for i in 0..n {
            s.push_str(["GCT", "AAA", "CTG"][i % 3]);
        }
        s.push_str("TAA");
        s
    }

    #[test]
    fn test_empty_sequence() {
        for input in ["", "   ", "\n\t"] {
            let result = validate(input, SequenceType::Dna, None, 25);
            assert!(!result.is_valid);
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].kind, "empty_sequence");
            assert!(result.warnings.is_empty());
            assert!(result.info.is_empty());
            assert_eq!(result.stats, SequenceStatistics::default());
        }
    }

    #[test]
    fn test_invalid_characters() {
        let result = validate("ATGXCGNA", SequenceType::Dna, None, 25);
        assert!(!result.is_valid);
        let issue = result.find("invalid_characters").unwrap();
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.positions, Some(vec![4, 7]));
        assert!(issue.message.contains("A, C, G, T"));
        assert_eq!(result.stats.invalid_bases, 2);
    }

    #[test]
    fn test_u_is_invalid_dna() {
        let result = validate("AUGC", SequenceType::Dna, None, 25);
        assert!(!result.is_valid);
        let result = validate("AUGC", SequenceType::Rna, None, 25);
        assert!(result.is_valid);
    }

    #[test]
    fn test_lowercase_is_normalized() {
        let result = validate("  gcgcatat  ", SequenceType::Dna, None, 25);
        assert!(result.is_valid);
        assert_eq!(result.stats.length, 8);
        assert_eq!(result.stats.gc_content, 50.0);
    }

    #[test]
    fn test_gc_tiers() {
        let tier = |seq: &str| {
            validate(seq, SequenceType::Dna, None, 25)
                .warnings
                .iter()
                .find(|w| w.kind.contains("gc_content"))
                .map(|w| w.kind.clone())
        };
        assert_eq!(tier("ATATATATAT").as_deref(), Some("very_low_gc_content"));
        assert_eq!(tier("GATATATATA").as_deref(), Some("very_low_gc_content")); // 10%
        assert_eq!(tier("GCATATATAT").as_deref(), Some("low_gc_content")); // 20%
        assert_eq!(tier("GCGCATATTT").as_deref(), None); // 40%
        assert_eq!(tier("GCGCGCGCAT").as_deref(), Some("very_high_gc_content")); // 80%
        assert_eq!(tier("GCGCGCGATA").as_deref(), Some("high_gc_content")); // 70%
        assert_eq!(tier("GCGCGATATA"), None); // 50%
    }

    #[test]
    fn test_protein_has_no_nucleotide_stats() {
        let result = validate("MKVLAAGIW", SequenceType::Protein, None, 25);
        assert!(result.is_valid);
        assert_eq!(result.stats.gc_content, 0.0);
        assert!(result.stats.palindromes.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_gene_with_orf() {
        let seq = format!("CCCGGG{}GGGCCC", coding(30));
        let result = validate(&seq, SequenceType::Dna, Some("gene"), 25);
        assert!(result.is_valid);
        let issue = result.find("orfs_analysis").unwrap();
        assert_eq!(issue.severity, Severity::Info);
        let summary = &issue.details.as_ref().unwrap()["orf_summary"];
        assert!(summary[0].as_str().unwrap().starts_with("ORF frame 1 (forward): 7-"));
        assert!(result.find("no_orfs_found_in_gene").is_none());
    }

    #[test]
    fn test_gene_without_orf() {
        let seq = "GCTAAACTG".repeat(10);
        let result = validate(&seq, SequenceType::Dna, Some("Reporter gene"), 25);
        assert!(result.find("no_orfs_found_in_gene").is_some());
        // Length rule only applies to exactly "gene"
        assert!(result.find("gene_too_short_for_orf").is_none());
    }

    #[test]
    fn test_orfs_present_for_other_components() {
        let seq = coding(30);
        let result = validate(&seq, SequenceType::Dna, None, 25);
        let issue = result.find("orfs_present").unwrap();
        assert_eq!(issue.details.as_ref().unwrap()["orf_count"], 1);
    }

    #[test]
    fn test_repeats_and_palindromes_reported() {
        let unit = "ACGTTGCAAC";
        let seq = format!("{}TTTT{}GAATTC", unit, unit);
        let result = validate(&seq, SequenceType::Dna, None, 25);
        let repeats = result.find("repeats_found").unwrap();
        assert_eq!(repeats.severity, Severity::Warning);
        let palindromes = result.find("palindromes_found").unwrap();
        assert_eq!(palindromes.severity, Severity::Info);
        assert!(result.is_valid);
    }

    #[test]
    fn test_component_length_checks() {
        let check = |seq: &str, component: &str| {
            validate(seq, SequenceType::Dna, Some(component), 25)
                .warnings
                .iter()
                .any(|w| w.kind.ends_with("_check") || w.kind.starts_with("gene_too") || w.kind.starts_with("cds_"))
        };
        assert!(check("ATGCATGCAT", "promoter"));
        assert!(!check(&"ATGC".repeat(10), "promoter"));
        assert!(check(&"ATGC".repeat(10), "gene"));
        assert!(check("ATGCA", "CDS"));
        assert!(!check("ATGCAT", "cds"));
        assert!(check("ATGCATGCAT", "terminator"));
        assert!(!check(&"ATGC".repeat(5), "terminator"));
    }

    #[test]
    fn test_start_stop_flags() {
        let result = validate("CCATGCCTAACC", SequenceType::Dna, None, 25);
        assert!(result.stats.has_start_codon);
        assert!(result.stats.has_stop_codon);
        let result = validate("CCCCCCGGGG", SequenceType::Dna, None, 25);
        assert!(!result.stats.has_start_codon);
        assert!(!result.stats.has_stop_codon);
    }
}
