//! seqcraft - Sequence validation and codon optimization
//!
//! ## Usage
//!
//! ```bash
//! seqcraft validate genes.fa -c gene          # ORFs, repeats, palindromes, GC
//! seqcraft validate -s AUGGCC... -t rna
//! seqcraft optimize cds.fa -O ecoli --avoid GAATTC -o optimized.fa
//! seqcraft organisms --codon-table extra.json
//! ```
//!
//! Input is FASTA or a bare sequence; `-` (the default) reads stdin.
//! Records are processed in parallel (`-j`).

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use seqcraft::analysis::{
    SequenceValidator, ValidatorConfig, DEFAULT_MIN_PALINDROME_LENGTH, DEFAULT_MIN_PROTEIN_LENGTH,
    DEFAULT_MIN_REPEAT_COUNT, DEFAULT_MIN_REPEAT_LENGTH,
};
use seqcraft::codon_usage::CodonUsageRegistry;
use seqcraft::formats::fasta::{write_fasta, FASTA_LINE_WIDTH};
use seqcraft::formats::{read_sequences, sequence_from_literal};
use seqcraft::model::Sequence;
use seqcraft::optimizer::{CodonOptimizer, OptimizationRequest, DEFAULT_STRENGTH};
use seqcraft::report::{render_optimization, render_organisms, render_validation, REPORT_WIDTH};
use seqcraft::SequenceType;

/// Default record length ceiling, in residues
const DEFAULT_MAX_LENGTH: usize = 10_000;

/// Sequence type specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    /// DNA (A, C, G, T)
    Dna,
    /// RNA (A, C, G, U)
    Rna,
    /// Protein (20 standard amino acids)
    Protein,
}

impl From<TypeArg> for SequenceType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Dna => SequenceType::Dna,
            TypeArg::Rna => SequenceType::Rna,
            TypeArg::Protein => SequenceType::Protein,
        }
    }
}

/// seqcraft - Sequence validation and codon optimization
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Number of threads (0 = all available cores)
    #[arg(short = 'j', long, global = true, default_value_t = 0, value_name = "THREADS")]
    jobs: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Records longer than this are skipped
    #[arg(long = "max-length", global = true, default_value_t = DEFAULT_MAX_LENGTH, value_name = "NT")]
    max_length: usize,
}

/// Where the sequences come from.
#[derive(Args, Debug)]
struct InputArgs {
    /// FASTA or bare sequence file ("-" for stdin)
    #[arg(value_name = "FILE", default_value = "-")]
    file: PathBuf,

    /// Literal sequence (record id "input"), instead of FILE
    #[arg(short = 's', long = "sequence", value_name = "SEQ")]
    sequence: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check sequences and report ORFs, repeats, palindromes and GC content
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Sequence type
        #[arg(short = 't', long = "type", value_enum, default_value = "dna")]
        sequence_type: TypeArg,

        /// Component type hint (gene, promoter, cds, terminator, ...)
        #[arg(short = 'c', long = "component", value_name = "COMPONENT")]
        component: Option<String>,

        /// Minimum ORF protein length, in amino acids
        #[arg(long = "min-orf", default_value_t = DEFAULT_MIN_PROTEIN_LENGTH, value_name = "AA")]
        min_orf: usize,

        /// Minimum repeat unit length
        #[arg(long = "min-repeat", default_value_t = DEFAULT_MIN_REPEAT_LENGTH, value_name = "NT")]
        min_repeat: usize,

        /// Minimum number of repeat occurrences
        #[arg(long = "min-repeat-count", default_value_t = DEFAULT_MIN_REPEAT_COUNT, value_name = "N")]
        min_repeat_count: usize,

        /// Minimum palindrome length
        #[arg(long = "min-palindrome", default_value_t = DEFAULT_MIN_PALINDROME_LENGTH, value_name = "NT")]
        min_palindrome: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite coding sequences for a target organism's codon usage
    Optimize {
        #[command(flatten)]
        input: InputArgs,

        /// Target organism key (see `organisms`)
        #[arg(short = 'O', long = "organism", value_name = "ORGANISM")]
        organism: String,

        /// Restriction site to keep out of the optimized sequence (repeatable)
        #[arg(long = "avoid", value_name = "SITE")]
        avoid: Vec<String>,

        /// Optimization strength, 0 to 1 (recorded, does not change the result)
        #[arg(long, default_value_t = DEFAULT_STRENGTH, value_parser = parse_strength, value_name = "X")]
        strength: f64,

        /// Do not request RNA secondary structure avoidance
        #[arg(long = "no-avoid-secondary-structures")]
        no_avoid_secondary_structures: bool,

        /// Extra codon usage tables (JSON)
        #[arg(long = "codon-table", value_name = "JSON")]
        codon_table: Option<PathBuf>,

        /// Write optimized sequences as FASTA to this file
        #[arg(short = 'o', long = "output", value_name = "OUT")]
        output: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List supported organisms
    Organisms {
        /// Extra codon usage tables (JSON)
        #[arg(long = "codon-table", value_name = "JSON")]
        codon_table: Option<PathBuf>,
    },
}

fn parse_strength(value: &str) -> Result<f64, String> {
    let strength: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !(0.0..=1.0).contains(&strength) {
        return Err(format!("strength must be between 0 and 1 (got {})", strength));
    }
    Ok(strength)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Reads the records named by the input arguments.
fn load_records(input: &InputArgs) -> Result<Vec<Sequence>> {
    if let Some(literal) = &input.sequence {
        return Ok(vec![sequence_from_literal(literal)]);
    }
    read_sequences(&input.file)
        .with_context(|| format!("Failed to read sequences from {}", input.file.display()))
}

/// Splits records into those within the length ceiling and the ids of the others.
fn apply_length_limit(records: Vec<Sequence>, max_length: usize) -> (Vec<Sequence>, Vec<String>) {
    let (kept, skipped): (Vec<Sequence>, Vec<Sequence>) =
        records.into_iter().partition(|r| r.len() <= max_length);
    for record in &skipped {
        eprintln!(
            "Skipping {}: length {} exceeds --max-length {}",
            record.id,
            record.len(),
            max_length
        );
    }
    (kept, skipped.into_iter().map(|r| r.id).collect())
}

fn load_registry(codon_table: Option<&Path>) -> Result<Option<CodonUsageRegistry>> {
    codon_table
        .map(|path| {
            CodonUsageRegistry::with_tables_from_json(path)
                .with_context(|| format!("Failed to load codon table {}", path.display()))
        })
        .transpose()
}

fn stdout_writer() -> BufWriter<io::StdoutLock<'static>> {
    BufWriter::new(io::stdout().lock())
}

fn run_validate(
    input: &InputArgs,
    sequence_type: SequenceType,
    component: Option<&str>,
    config: ValidatorConfig,
    json_output: bool,
    max_length: usize,
) -> Result<bool> {
    let (records, skipped) = apply_length_limit(load_records(input)?, max_length);
    info!(records = records.len(), skipped = skipped.len(), "validating");

    let validator = SequenceValidator::new(config);
    let results: Vec<_> = records
        .par_iter()
        .map(|record| validator.validate(&record.data, sequence_type, component))
        .collect();

    let mut out = stdout_writer();
    if json_output {
        let mut documents: Vec<_> = records
            .iter()
            .zip(&results)
            .map(|(record, result)| json!({ "id": record.id, "result": result }))
            .collect();
        documents.extend(skipped.iter().map(|id| json!({ "id": id, "skipped": true })));
        serde_json::to_writer_pretty(&mut out, &documents)?;
        writeln!(out)?;
    } else {
        for (record, result) in records.iter().zip(&results) {
            write!(out, "{}", render_validation(&record.id, sequence_type, result, REPORT_WIDTH))?;
        }
    }
    out.flush()?;

    let invalid = results.iter().filter(|r| !r.is_valid).count();
    if invalid > 0 {
        eprintln!("{} of {} record(s) failed validation", invalid, results.len());
    }
    Ok(invalid == 0 && skipped.is_empty())
}

#[allow(clippy::too_many_arguments)]
fn run_optimize(
    input: &InputArgs,
    organism: &str,
    avoid: &[String],
    strength: f64,
    avoid_secondary_structures: bool,
    codon_table: Option<&Path>,
    output: Option<&Path>,
    json_output: bool,
    max_length: usize,
) -> Result<bool> {
    let loaded = load_registry(codon_table)?;
    let registry = loaded.as_ref().unwrap_or_else(|| CodonUsageRegistry::builtin());
    if registry.get(organism).is_none() {
        let supported: Vec<&str> = registry.keys().collect();
        bail!(
            "Target organism '{}' is not supported. Available: {}",
            organism,
            supported.join(", ")
        );
    }

    let (records, skipped) = apply_length_limit(load_records(input)?, max_length);
    info!(records = records.len(), organism, "optimizing");

    let optimizer = CodonOptimizer::new(registry);
    let results: Vec<_> = records
        .par_iter()
        .map(|record| {
            let request = OptimizationRequest::new(record.data.as_str(), organism)
                .avoid_sites(avoid.iter().cloned())
                .with_strength(strength)
                .avoid_secondary_structures(avoid_secondary_structures);
            optimizer.optimize(&request)
        })
        .collect();

    let mut out = stdout_writer();
    if json_output {
        let mut documents: Vec<_> = records
            .iter()
            .zip(&results)
            .map(|(record, result)| match result {
                Ok(result) => json!({ "id": record.id, "result": result }),
                Err(e) => json!({ "id": record.id, "error": e.to_string() }),
            })
            .collect();
        documents.extend(skipped.iter().map(|id| json!({ "id": id, "skipped": true })));
        serde_json::to_writer_pretty(&mut out, &documents)?;
        writeln!(out)?;
    } else {
        for (record, result) in records.iter().zip(&results) {
            match result {
                Ok(result) => write!(out, "{}", render_optimization(&record.id, result, REPORT_WIDTH))?,
                Err(e) => writeln!(out, "== {}: error: {}", record.id, e)?,
            }
        }
    }
    out.flush()?;

    if let Some(path) = output {
        let optimized: Vec<Sequence> = records
            .iter()
            .zip(&results)
            .filter_map(|(record, result)| {
                result
                    .as_ref()
                    .ok()
                    .map(|r| Sequence::new(record.id.as_str(), r.optimized_sequence.as_str()))
            })
            .collect();
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_fasta(&mut writer, &optimized, FASTA_LINE_WIDTH)
            .and_then(|_| writer.flush())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {} sequences to {}", optimized.len(), path.display());
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        eprintln!("{} of {} record(s) could not be optimized", failed, results.len());
    }
    Ok(failed == 0 && skipped.is_empty())
}

fn run_organisms(codon_table: Option<&Path>) -> Result<bool> {
    let loaded = load_registry(codon_table)?;
    let registry = loaded.as_ref().unwrap_or_else(|| CodonUsageRegistry::builtin());
    let mut out = stdout_writer();
    write!(out, "{}", render_organisms(registry))?;
    out.flush()?;
    Ok(true)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs)
        .build_global()
        .context("Failed to configure thread pool")?;

    let success = match &cli.command {
        Commands::Validate {
            input,
            sequence_type,
            component,
            min_orf,
            min_repeat,
            min_repeat_count,
            min_palindrome,
            json,
        } => {
            let config = ValidatorConfig {
                min_orf_protein_length: *min_orf,
                min_repeat_length: *min_repeat,
                min_repeat_count: *min_repeat_count,
                min_palindrome_length: *min_palindrome,
            };
            run_validate(
                input,
                (*sequence_type).into(),
                component.as_deref(),
                config,
                *json,
                cli.max_length,
            )?
        }
        Commands::Optimize {
            input,
            organism,
            avoid,
            strength,
            no_avoid_secondary_structures,
            codon_table,
            output,
            json,
        } => run_optimize(
            input,
            organism,
            avoid,
            *strength,
            !no_avoid_secondary_structures,
            codon_table.as_deref(),
            output.as_deref(),
            *json,
            cli.max_length,
        )?,
        Commands::Organisms { codon_table } => run_organisms(codon_table.as_deref())?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_strength() {
        assert_eq!(parse_strength("0.5"), Ok(0.5));
        assert_eq!(parse_strength("1"), Ok(1.0));
        assert!(parse_strength("1.5").is_err());
        assert!(parse_strength("-0.1").is_err());
        assert!(parse_strength("abc").is_err());
    }

    #[test]
    fn test_parse_optimize_args() {
        let cli = Cli::try_parse_from([
            "seqcraft", "-j", "2", "optimize", "-s", "ATGCTT", "-O", "yeast", "--avoid", "GAATTC",
            "--avoid", "GGATCC", "--no-avoid-secondary-structures",
        ])
        .unwrap();
        assert_eq!(cli.jobs, 2);
        match cli.command {
            Commands::Optimize {
                input,
                organism,
                avoid,
                strength,
                no_avoid_secondary_structures,
                ..
            } => {
                assert_eq!(input.sequence.as_deref(), Some("ATGCTT"));
                assert_eq!(input.file, PathBuf::from("-"));
                assert_eq!(organism, "yeast");
                assert_eq!(avoid, vec!["GAATTC", "GGATCC"]);
                assert_eq!(strength, DEFAULT_STRENGTH);
                assert!(no_avoid_secondary_structures);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate_args() {
        let cli = Cli::try_parse_from([
            "seqcraft", "validate", "genes.fa", "-t", "rna", "-c", "gene", "--min-orf", "30", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_length, DEFAULT_MAX_LENGTH);
        match cli.command {
            Commands::Validate {
                input,
                sequence_type,
                component,
                min_orf,
                min_repeat,
                ..
            } => {
                assert_eq!(input.file, PathBuf::from("genes.fa"));
                assert_eq!(SequenceType::from(sequence_type), SequenceType::Rna);
                assert_eq!(component.as_deref(), Some("gene"));
                assert_eq!(min_orf, 30);
                assert_eq!(min_repeat, DEFAULT_MIN_REPEAT_LENGTH);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_length_limit() {
        let records = vec![Sequence::new("short", "ATG"), Sequence::new("long", "ATGATG")];
        let (kept, skipped) = apply_length_limit(records, 3);
        assert_eq!(kept, vec![Sequence::new("short", "ATG")]);
        assert_eq!(skipped, vec!["long".to_string()]);
    }

    #[test]
    fn test_load_records_literal() {
        let input = InputArgs {
            file: PathBuf::from("-"),
            sequence: Some("atg gct".to_string()),
        };
        let records = load_records(&input).unwrap();
        assert_eq!(records, vec![Sequence::new("input", "atggct")]);
    }

    #[test]
    fn test_load_registry_from_file() {
        assert!(load_registry(None).unwrap().is_none());
        let err = load_registry(Some(Path::new("/nonexistent/table.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load codon table"));
    }
}
