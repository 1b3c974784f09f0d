//! Plain-text reports for the command line.
//!
//! Long lines (issue messages, codon change lists) are wrapped with
//! `textwrap` and indented under their heading.

use std::fmt::Write as _;

use textwrap::Options;

use crate::alphabet::SequenceType;
use crate::codon_usage::CodonUsageRegistry;
use crate::model::{CodonOptimizationResult, ValidationIssue, ValidationResult};

/// Default report width, in columns.
pub const REPORT_WIDTH: usize = 80;

fn wrapped(text: &str, width: usize, indent: &str, hanging: &str) -> String {
    let options = Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(hanging);
    textwrap::fill(text, options)
}

fn push_issue(out: &mut String, issue: &ValidationIssue, width: usize) {
    let line = format!("[{}] {}: {}", issue.severity, issue.kind, issue.message);
    let _ = writeln!(out, "{}", wrapped(&line, width, "  ", "      "));
}

/// Renders a validation result.
pub fn render_validation(
    id: &str,
    sequence_type: SequenceType,
    result: &ValidationResult,
    width: usize,
) -> String {
    let stats = &result.stats;
    let mut out = String::new();

    let unit = if sequence_type.is_nucleotide() { "nt" } else { "aa" };
    let status = if result.is_valid { "valid" } else { "INVALID" };
    let _ = write!(out, "== {} ({}): {}, {} {}", id, sequence_type, status, stats.length, unit);
    if sequence_type.is_nucleotide() {
        let _ = write!(out, ", GC {:.2}%", stats.gc_content);
    }
    out.push('\n');

    if sequence_type.is_nucleotide() && stats.length > 0 {
        let _ = writeln!(
            out,
            "  ORFs: {}  repeats: {}  palindromes: {}",
            stats.open_reading_frames.len(),
            stats.repeats.len(),
            stats.palindromes.len()
        );
    }

    for issue in result.issues() {
        push_issue(&mut out, issue, width);
    }
    out
}

/// Renders a codon optimization result.
pub fn render_optimization(id: &str, result: &CodonOptimizationResult, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} -> {}", id, result.organism);
    let _ = writeln!(out, "  CAI: {:.3} -> {:.3}", result.cai_before, result.cai_after);
    let _ = writeln!(
        out,
        "  GC:  {:.2}% -> {:.2}%",
        result.gc_content_before, result.gc_content_after
    );
    let _ = writeln!(out, "  Codons changed: {}", result.changes_made);

    if !result.codon_changes.is_empty() {
        let changes: Vec<String> = result
            .codon_changes
            .iter()
            .map(|c| format!("{}{} {}>{}", c.amino_acid, c.position, c.original, c.optimized))
            .collect();
        let _ = writeln!(out, "{}", wrapped(&changes.join(", "), width, "    ", "    "));
    }
    out
}

/// Lists the organisms of a registry, one per line.
pub fn render_organisms(registry: &CodonUsageRegistry) -> String {
    let key_width = registry.keys().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for table in registry.tables() {
        let _ = writeln!(out, "{:<width$}  {}", table.key, table.name, width = key_width);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::validate;
    use crate::model::CodonChange;

    #[test]
    fn test_render_validation_header() {
        let result = validate("GAATTC", SequenceType::Dna, None, 25);
        let text = render_validation("site", SequenceType::Dna, &result, REPORT_WIDTH);
        let first = text.lines().next().unwrap();
        assert_eq!(first, "== site (dna): valid, 6 nt, GC 33.33%");
        assert!(text.contains("ORFs: 0  repeats: 0  palindromes: 1"));
        assert!(text.contains("[info] palindromes_found:"));
    }

    #[test]
    fn test_render_invalid_protein() {
        let result = validate("MKX1", SequenceType::Protein, None, 25);
        let text = render_validation("p", SequenceType::Protein, &result, REPORT_WIDTH);
        assert!(text.starts_with("== p (protein): INVALID, 4 aa\n"));
        assert!(!text.contains("GC"));
        assert!(text.contains("[error] invalid_characters:"));
    }

    #[test]
    fn test_long_messages_are_wrapped() {
        let result = validate("ACGTNNNNNNNNNNNNNNNNNNNNNNNNNNNNNNNN", SequenceType::Dna, None, 25);
        let text = render_validation("x", SequenceType::Dna, &result, 40);
        assert!(text.lines().all(|line| line.chars().count() <= 40));
        assert!(text.lines().any(|line| line.starts_with("      ")));
    }

    #[test]
    fn test_render_optimization() {
        let result = CodonOptimizationResult {
            original_sequence: "CTT".to_string(),
            optimized_sequence: "CTG".to_string(),
            cai_before: 0.2,
            cai_after: 1.0,
            gc_content_before: 33.333,
            gc_content_after: 66.667,
            changes_made: 1,
            organism: "Escherichia coli".to_string(),
            codon_changes: vec![CodonChange {
                position: 1,
                amino_acid: 'L',
                original: "CTT".to_string(),
                optimized: "CTG".to_string(),
            }],
        };
        let text = render_optimization("orf1", &result, REPORT_WIDTH);
        assert_eq!(
            text,
            "== orf1 -> Escherichia coli\n  CAI: 0.200 -> 1.000\n  GC:  33.33% -> 66.67%\n  Codons changed: 1\n    L1 CTT>CTG\n"
        );
    }

    #[test]
    fn test_render_organisms() {
        let text = render_organisms(CodonUsageRegistry::builtin());
        assert_eq!(
            text,
            "ecoli  Escherichia coli\nhuman  Homo sapiens\nyeast  Saccharomyces cerevisiae\n"
        );
    }
}
