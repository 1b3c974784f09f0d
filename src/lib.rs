//! # seqcraft - Sequence Analysis & Codon Optimization
//!
//! Inspects DNA, RNA and protein sequences and rewrites coding sequences for
//! a target organism's codon usage.
//!
//! ## Architecture
//!
//! Two side-effect-free components share one genetic code:
//! - `analysis`: the sequence validator (alphabet, GC content, ORFs,
//!   repeats, palindromes, component length checks)
//! - `optimizer`: synonymous codon substitution with restriction-site
//!   avoidance and CAI reporting
//!
//! Supporting modules:
//! - `alphabet`: sequence types, normalization, GC content, complements
//! - `genetic_code`: the standard codon table and translation
//! - `codon_usage`: per-organism codon usage tables (built-in and JSON)
//! - `intervals`: containment checks used to suppress nested matches
//! - `model`: records, issues, statistics and results
//! - `formats`: FASTA and bare-sequence input, FASTA output
//! - `report`: plain-text rendering for the command line
//!
//! Only `formats` touches the filesystem.

pub mod alphabet;
pub mod analysis;
pub mod codon_usage;
pub mod formats;
pub mod genetic_code;
pub mod intervals;
pub mod model;
pub mod optimizer;
pub mod report;

pub use alphabet::SequenceType;
pub use analysis::{validate, SequenceValidator, ValidatorConfig};
pub use codon_usage::{CodonUsageRegistry, CodonUsageTable};
pub use optimizer::{optimize, CodonOptimizer, OptimizationRequest, OptimizeError};
