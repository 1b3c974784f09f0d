//! Codon optimization.
//!
//! The optimizer walks a coding sequence codon by codon and replaces each
//! codon by the synonym the target organism uses most, unless that synonym
//! would create one of the restriction sites to avoid. Met, Trp and stop
//! codons are never touched.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::alphabet::{gc_content, normalize};
use crate::codon_usage::{CodonUsageRegistry, CodonUsageTable};
use crate::genetic_code::{GeneticCode, STOP};
use crate::model::{CodonChange, CodonOptimizationResult};

/// Frequency assumed for a codon missing from a usage table.
pub const UNSEEN_CODON_FREQUENCY: f64 = 1e-9;

/// Default optimization strength.
pub const DEFAULT_STRENGTH: f64 = 0.8;

/// Errors returned by the optimizer, in the order they are checked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("DNA sequence contains invalid characters: only A, T, G and C are allowed")]
    InvalidAlphabet,

    #[error("DNA sequence length ({length}) must be a multiple of 3")]
    InvalidLength { length: usize },

    #[error("Target organism '{organism}' is not supported. Available: {}", supported.join(", "))]
    UnsupportedOrganism {
        organism: String,
        supported: Vec<String>,
    },

    #[error("Invalid codon '{codon}' at nucleotide {position}")]
    InvalidCodon { codon: String, position: usize },
}

/// Result type for optimizer operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

fn default_strength() -> f64 {
    DEFAULT_STRENGTH
}

fn default_true() -> bool {
    true
}

/// A codon optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub sequence: String,
    pub target_organism: String,
    #[serde(default)]
    pub restriction_sites_to_avoid: Vec<String>,
    /// Accepted in [0, 1]; does not alter the substitution walk
    #[serde(default = "default_strength")]
    pub optimization_strength: f64,
    /// Accepted; secondary structure prediction is not implemented
    #[serde(default = "default_true")]
    pub avoid_rna_secondary_structures: bool,
}

impl OptimizationRequest {
    pub fn new(sequence: impl Into<String>, target_organism: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            target_organism: target_organism.into(),
            restriction_sites_to_avoid: Vec::new(),
            optimization_strength: DEFAULT_STRENGTH,
            avoid_rna_secondary_structures: true,
        }
    }

    pub fn avoid_sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restriction_sites_to_avoid = sites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.optimization_strength = strength;
        self
    }

    pub fn avoid_secondary_structures(mut self, avoid: bool) -> Self {
        self.avoid_rna_secondary_structures = avoid;
        self
    }
}

/// Codon Adaptation Index of a coding sequence against a usage table.
///
/// Stop, Met and Trp codons are ignored, as are untranslatable codons and
/// amino acids whose synonyms all have zero frequency. Returns 1.0 when no
/// codon counts.
pub fn cai(sequence: &str, table: &CodonUsageTable) -> f64 {
    let code = GeneticCode::standard();
    let mut log_sum = 0.0;
    let mut counted = 0usize;

    for codon in sequence.as_bytes().chunks_exact(3) {
        let aa = match code.translate_codon_bytes(codon) {
            Some(aa) if !matches!(aa, STOP | 'M' | 'W') => aa,
            _ => continue,
        };
        let max_frequency = code
            .synonymous_codons(aa)
            .iter()
            .map(|c| table.frequency_or_zero(c))
            .fold(0.0, f64::max);
        if max_frequency <= 0.0 {
            continue;
        }
        let codon = String::from_utf8_lossy(codon).to_ascii_uppercase();
        let w = table.frequency(&codon).unwrap_or(UNSEEN_CODON_FREQUENCY) / max_frequency;
        if w > 0.0 {
            log_sum += w.ln();
            counted += 1;
        }
    }

    if counted == 0 {
        1.0
    } else {
        (log_sum / counted as f64).exp()
    }
}

/// Restriction sites to keep out of the optimized sequence.
#[derive(Debug, Clone, Default)]
struct SiteFilter {
    sites: Vec<Vec<u8>>,
    max_len: usize,
}

impl SiteFilter {
    fn new<S: AsRef<str>>(sites: &[S]) -> Self {
        let sites: Vec<Vec<u8>> = sites
            .iter()
            .map(|s| normalize(s.as_ref()).replace('U', "T").into_bytes())
            .filter(|s| !s.is_empty())
            .collect();
        let max_len = sites.iter().map(Vec::len).max().unwrap_or(0);
        Self { sites, max_len }
    }

    /// True if appending `codon` to `prefix` creates a site occurrence that
    /// includes at least one base of `codon`.
    fn creates_site(&self, prefix: &[u8], codon: &[u8]) -> bool {
        if self.sites.is_empty() {
            return false;
        }
        let tail_len = prefix.len().min(self.max_len.saturating_sub(1));
        let mut window = Vec::with_capacity(tail_len + codon.len());
        window.extend_from_slice(&prefix[prefix.len() - tail_len..]);
        window.extend_from_slice(codon);

        self.sites.iter().any(|site| {
            site.len() <= window.len()
                && window
                    .windows(site.len())
                    .enumerate()
                    .any(|(at, w)| at + site.len() > tail_len && w == site.as_slice())
        })
    }
}

/// Rewrites coding sequences against an injected codon usage registry.
#[derive(Debug, Clone, Copy)]
pub struct CodonOptimizer<'a> {
    registry: &'a CodonUsageRegistry,
}

impl CodonOptimizer<'static> {
    /// An optimizer over the built-in organisms.
    pub fn builtin() -> Self {
        Self::new(CodonUsageRegistry::builtin())
    }
}

impl<'a> CodonOptimizer<'a> {
    pub fn new(registry: &'a CodonUsageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a CodonUsageRegistry {
        self.registry
    }

    #[tracing::instrument(level = "debug", skip_all, fields(organism = %request.target_organism))]
    pub fn optimize(&self, request: &OptimizationRequest) -> OptimizeResult<CodonOptimizationResult> {
        let sequence = normalize(&request.sequence);
        if sequence.is_empty() || !sequence.bytes().all(|b| b"ACGT".contains(&b)) {
            return Err(OptimizeError::InvalidAlphabet);
        }
        if sequence.len() % 3 != 0 {
            return Err(OptimizeError::InvalidLength {
                length: sequence.len(),
            });
        }
        let table = self
            .registry
            .get(&request.target_organism)
            .ok_or_else(|| OptimizeError::UnsupportedOrganism {
                organism: request.target_organism.clone(),
                supported: self.registry.keys().map(str::to_string).collect(),
            })?;

        let code = GeneticCode::standard();
        let protein = code
            .translate(&sequence)
            .map_err(|e| OptimizeError::InvalidCodon {
                codon: e.codon,
                position: e.position,
            })?;

        let cai_before = cai(&sequence, table);
        let gc_content_before = gc_content(&sequence);
        let sites = SiteFilter::new(&request.restriction_sites_to_avoid);

        let mut optimized: Vec<u8> = Vec::with_capacity(sequence.len());
        let mut codon_changes = Vec::new();

        for (i, (&aa, codon)) in protein.iter().zip(sequence.as_bytes().chunks_exact(3)).enumerate() {
            let synonyms = code.synonymous_codons(aa);
            if matches!(aa, STOP | 'M' | 'W') || synonyms.len() <= 1 {
                optimized.extend_from_slice(codon);
                continue;
            }

            let mut ranked: Vec<&String> = synonyms.iter().collect();
            ranked.sort_by(|a, b| table.frequency_or_zero(b).total_cmp(&table.frequency_or_zero(a)));

            let chosen = match ranked
                .into_iter()
                .find(|candidate| !sites.creates_site(&optimized, candidate.as_bytes()))
            {
                Some(candidate) => candidate.as_bytes(),
                None => {
                    warn!(
                        position = i + 1,
                        amino_acid = %aa,
                        "every synonym creates a forbidden site, keeping the original codon"
                    );
                    codon
                }
            };

            if chosen != codon {
                codon_changes.push(CodonChange {
                    position: i + 1,
                    amino_acid: aa,
                    original: String::from_utf8_lossy(codon).into_owned(),
                    optimized: String::from_utf8_lossy(chosen).into_owned(),
                });
            }
            optimized.extend_from_slice(chosen);
        }

        let optimized_sequence = String::from_utf8_lossy(&optimized).into_owned();
        let cai_after = cai(&optimized_sequence, table);
        let gc_content_after = gc_content(&optimized_sequence);

        debug!(
            length = sequence.len(),
            sites = sites.sites.len(),
            strength = request.optimization_strength,
            avoid_secondary_structures = request.avoid_rna_secondary_structures,
            cai_before,
            cai_after,
            changes = codon_changes.len(),
            "optimized sequence"
        );

        Ok(CodonOptimizationResult {
            original_sequence: sequence,
            optimized_sequence,
            cai_before,
            cai_after,
            gc_content_before,
            gc_content_after,
            changes_made: codon_changes.len(),
            organism: table.name.clone(),
            codon_changes,
        })
    }
}

/// Optimizes a request against the built-in organisms.
pub fn optimize(request: &OptimizationRequest) -> OptimizeResult<CodonOptimizationResult> {
    CodonOptimizer::builtin().optimize(request)
}
