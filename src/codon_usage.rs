//! Per-organism codon usage tables.
//!
//! A table maps each of the 64 DNA codons to its relative usage frequency
//! (0-1) among the codons of the same amino acid. Tables are read-only once
//! built; the built-in registry is created once per process and shared.
//!
//! ## JSON format
//!
//! ```text
//! {"key": "bsub", "name": "Bacillus subtilis", "codons": {"GCA": 0.28, ...}}
//! ```
//!
//! A file may hold one such object or an array of them.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading codon usage tables.
#[derive(Error, Debug)]
pub enum CodonTableError {
    #[error("Failed to read codon table file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid codon table JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Codon table has an empty organism key")]
    EmptyKey,

    #[error("Codon table '{organism}': '{codon}' is not a DNA codon")]
    InvalidCodon { organism: String, codon: String },

    #[error("Codon table '{organism}': frequency {value} for {codon} is outside [0, 1]")]
    InvalidFrequency {
        organism: String,
        codon: String,
        value: f64,
    },

    #[error("Codon table '{organism}' is missing {} codon(s): {}", missing.len(), missing.join(", "))]
    MissingCodons {
        organism: String,
        missing: Vec<String>,
    },
}

/// Result type for codon table operations.
pub type CodonTableResult<T> = Result<T, CodonTableError>;

/// Codon usage frequencies for one organism.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodonUsageTable {
    /// Lookup key, lower-case (e.g. "ecoli")
    pub key: String,
    /// Display name (e.g. "Escherichia coli")
    pub name: String,
    #[serde(rename = "codons")]
    frequencies: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct TableSpec {
    key: String,
    name: String,
    codons: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableFile {
    One(TableSpec),
    Many(Vec<TableSpec>),
}

fn all_codons() -> impl Iterator<Item = String> {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    BASES.into_iter().flat_map(|b1| {
        BASES
            .into_iter()
            .flat_map(move |b2| BASES.into_iter().map(move |b3| [b1, b2, b3].iter().collect()))
    })
}

impl CodonUsageTable {
    /// Builds and checks a table.
    ///
    /// Codons are upper-cased and `U` is read as `T`. All 64 codons must be
    /// present with a finite frequency in [0, 1].
    pub fn new<I, S>(key: &str, name: &str, codons: I) -> CodonTableResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(CodonTableError::EmptyKey);
        }

        let mut frequencies = HashMap::with_capacity(64);
        for (codon, value) in codons {
            let codon = codon.as_ref().trim().to_uppercase().replace('U', "T");
            if codon.len() != 3 || !codon.bytes().all(|b| b"ACGT".contains(&b)) {
                return Err(CodonTableError::InvalidCodon {
                    organism: key,
                    codon,
                });
            }
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CodonTableError::InvalidFrequency {
                    organism: key,
                    codon,
                    value,
                });
            }
            frequencies.insert(codon, value);
        }

        let missing: Vec<String> = all_codons().filter(|c| !frequencies.contains_key(c)).collect();
        if !missing.is_empty() {
            return Err(CodonTableError::MissingCodons {
                organism: key,
                missing,
            });
        }

        Ok(Self {
            key,
            name: name.trim().to_string(),
            frequencies,
        })
    }

    /// Built-in data is checked by the tests rather than at startup.
    fn from_static(key: &str, name: &str, codons: &[(&str, f64)]) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            frequencies: codons.iter().map(|&(c, f)| (c.to_string(), f)).collect(),
        }
    }

    fn from_spec(spec: TableSpec) -> CodonTableResult<Self> {
        Self::new(&spec.key, &spec.name, spec.codons)
    }

    /// Frequency of a codon, if the table knows it.
    pub fn frequency(&self, codon: &str) -> Option<f64> {
        self.frequencies.get(codon).copied()
    }

    /// Frequency of a codon, 0.0 when unknown.
    pub fn frequency_or_zero(&self, codon: &str) -> f64 {
        self.frequency(codon).unwrap_or(0.0)
    }
}

/// A set of codon usage tables keyed by organism.
#[derive(Debug, Clone, Default)]
pub struct CodonUsageRegistry {
    tables: BTreeMap<String, CodonUsageTable>,
}

impl CodonUsageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry of built-in tables
    /// (`ecoli`, `yeast`, `human`).
    pub fn builtin() -> &'static CodonUsageRegistry {
        static BUILTIN: OnceLock<CodonUsageRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = CodonUsageRegistry::new();
            for (key, name, codons) in BUILTIN_TABLES {
                registry.insert(CodonUsageTable::from_static(key, name, codons));
            }
            registry
        })
    }

    /// Builds a registry with the built-in tables plus those in a JSON file.
    ///
    /// Loaded tables replace built-in tables with the same key.
    pub fn with_tables_from_json<P: AsRef<Path>>(path: P) -> CodonTableResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut registry = Self::builtin().clone();
        registry.load_json_str(&content)?;
        Ok(registry)
    }

    /// Adds every table found in a JSON document. Returns how many were added.
    pub fn load_json_str(&mut self, content: &str) -> CodonTableResult<usize> {
        let specs = match serde_json::from_str::<TableFile>(content)? {
            TableFile::One(spec) => vec![spec],
            TableFile::Many(specs) => specs,
        };
        let count = specs.len();
        for spec in specs {
            let table = CodonUsageTable::from_spec(spec)?;
            debug!(key = %table.key, name = %table.name, "loaded codon usage table");
            self.insert(table);
        }
        Ok(count)
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, table: CodonUsageTable) {
        self.tables.insert(table.key.clone(), table);
    }

    /// Looks up a table by organism key, case-insensitively.
    pub fn get(&self, organism: &str) -> Option<&CodonUsageTable> {
        self.tables.get(&organism.trim().to_lowercase())
    }

    /// Supported organism keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// All tables, sorted by key.
    pub fn tables(&self) -> impl Iterator<Item = &CodonUsageTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

type BuiltinTable = (&'static str, &'static str, &'static [(&'static str, f64)]);

const BUILTIN_TABLES: [BuiltinTable; 3] = [
    ("ecoli", "Escherichia coli", ECOLI),
    ("yeast", "Saccharomyces cerevisiae", YEAST),
    ("human", "Homo sapiens", HUMAN),
];

#[rustfmt::skip]
const ECOLI: &[(&str, f64)] = &[
    ("GCA", 0.21), ("GCC", 0.27), ("GCG", 0.36), ("GCT", 0.16),
    ("AGA", 0.04), ("AGG", 0.02), ("CGA", 0.06), ("CGC", 0.40), ("CGG", 0.10), ("CGT", 0.38),
    ("AAC", 0.55), ("AAT", 0.45), ("GAC", 0.37), ("GAT", 0.63),
    ("TGC", 0.55), ("TGT", 0.45), ("GAA", 0.68), ("GAG", 0.32),
    ("CAA", 0.34), ("CAG", 0.66), ("GGA", 0.11), ("GGC", 0.40), ("GGG", 0.15), ("GGT", 0.34),
    ("CAC", 0.43), ("CAT", 0.57), ("ATA", 0.07), ("ATC", 0.42), ("ATT", 0.51),
    ("CTA", 0.04), ("CTC", 0.10), ("CTG", 0.50), ("CTT", 0.10), ("TTA", 0.13), ("TTG", 0.13),
    ("AAA", 0.74), ("AAG", 0.26), ("ATG", 1.00), ("TTC", 0.43), ("TTT", 0.57),
    ("CCA", 0.19), ("CCC", 0.12), ("CCG", 0.52), ("CCT", 0.16),
    ("AGC", 0.28), ("AGT", 0.15), ("TCA", 0.12), ("TCC", 0.15), ("TCG", 0.15), ("TCT", 0.15),
    ("ACA", 0.13), ("ACC", 0.40), ("ACG", 0.27), ("ACT", 0.19),
    ("TGG", 1.00), ("TAC", 0.43), ("TAT", 0.57),
    ("GTA", 0.15), ("GTC", 0.22), ("GTG", 0.37), ("GTT", 0.26),
    ("TAA", 0.61), ("TAG", 0.09), ("TGA", 0.30),
];

#[rustfmt::skip]
const YEAST: &[(&str, f64)] = &[
    ("GCA", 0.21), ("GCC", 0.26), ("GCG", 0.11), ("GCT", 0.42),
    ("AGA", 0.48), ("AGG", 0.21), ("CGA", 0.07), ("CGC", 0.06), ("CGG", 0.04), ("CGT", 0.14),
    ("AAC", 0.41), ("AAT", 0.59), ("GAC", 0.35), ("GAT", 0.65),
    ("TGC", 0.37), ("TGT", 0.63), ("GAA", 0.70), ("GAG", 0.30),
    ("CAA", 0.69), ("CAG", 0.31), ("GGA", 0.22), ("GGC", 0.19), ("GGG", 0.12), ("GGT", 0.47),
    ("CAC", 0.35), ("CAT", 0.65), ("ATA", 0.27), ("ATC", 0.26), ("ATT", 0.47),
    ("CTA", 0.14), ("CTC", 0.06), ("CTG", 0.11), ("CTT", 0.13), ("TTA", 0.28), ("TTG", 0.29),
    ("AAA", 0.58), ("AAG", 0.42), ("ATG", 1.00), ("TTC", 0.40), ("TTT", 0.60),
    ("CCA", 0.42), ("CCC", 0.15), ("CCG", 0.12), ("CCT", 0.31),
    ("AGC", 0.11), ("AGT", 0.16), ("TCA", 0.21), ("TCC", 0.16), ("TCG", 0.10), ("TCT", 0.26),
    ("ACA", 0.30), ("ACC", 0.22), ("ACG", 0.13), ("ACT", 0.35),
    ("TGG", 1.00), ("TAC", 0.43), ("TAT", 0.57),
    ("GTA", 0.21), ("GTC", 0.18), ("GTG", 0.19), ("GTT", 0.42),
    ("TAA", 0.47), ("TAG", 0.23), ("TGA", 0.30),
];

#[rustfmt::skip]
const HUMAN: &[(&str, f64)] = &[
    ("GCA", 0.23), ("GCC", 0.40), ("GCG", 0.11), ("GCT", 0.26),
    ("AGA", 0.20), ("AGG", 0.20), ("CGA", 0.11), ("CGC", 0.19), ("CGG", 0.21), ("CGT", 0.08),
    ("AAC", 0.53), ("AAT", 0.47), ("GAC", 0.54), ("GAT", 0.46),
    ("TGC", 0.55), ("TGT", 0.45), ("GAA", 0.42), ("GAG", 0.58),
    ("CAA", 0.27), ("CAG", 0.73), ("GGA", 0.25), ("GGC", 0.34), ("GGG", 0.25), ("GGT", 0.16),
    ("CAC", 0.58), ("CAT", 0.42), ("ATA", 0.16), ("ATC", 0.48), ("ATT", 0.36),
    ("CTA", 0.07), ("CTC", 0.20), ("CTG", 0.41), ("CTT", 0.13), ("TTA", 0.07), ("TTG", 0.13),
    ("AAA", 0.42), ("AAG", 0.58), ("ATG", 1.00), ("TTC", 0.54), ("TTT", 0.46),
    ("CCA", 0.27), ("CCC", 0.33), ("CCG", 0.11), ("CCT", 0.29),
    ("AGC", 0.24), ("AGT", 0.15), ("TCA", 0.15), ("TCC", 0.22), ("TCG", 0.06), ("TCT", 0.18),
    ("ACA", 0.28), ("ACC", 0.36), ("ACG", 0.12), ("ACT", 0.24),
    ("TGG", 1.00), ("TAC", 0.56), ("TAT", 0.44),
    ("GTA", 0.11), ("GTC", 0.24), ("GTG", 0.47), ("GTT", 0.18),
    ("TAA", 0.28), ("TAG", 0.20), ("TGA", 0.52),
];
