//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// fraudscope - Train and serve a transaction fraud scoring model
#[derive(Parser, Debug)]
#[command(name = "fraudscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding model artifacts
    #[arg(
        short,
        long,
        global = true,
        env = "FRAUDSCOPE_MODELS_DIR",
        default_value = "models"
    )]
    pub models_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Options shared by every command that reads a dataset
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit encoder, normalizer and classifier on a labeled dataset
    Train {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Seed for the train/test split
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Fraction of rows held out for evaluation (0.0 to 1.0, exclusive)
        #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
        test_size: f64,

        /// Maximum solver iterations
        #[arg(long, default_value = "1000", value_parser = validate_max_iter)]
        max_iter: usize,

        /// L2 penalty strength on the weights (inverse of C)
        #[arg(long, default_value = "1.0", value_parser = validate_positive)]
        l2_penalty: f64,

        /// Convergence tolerance on the gradient max-norm
        #[arg(long, default_value = "1e-6", value_parser = validate_positive)]
        tolerance: f64,

        /// Date ages are computed against (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDate>,
    },

    /// Score one JSON transaction and print the response
    Predict {
        /// JSON request file. Reads stdin when omitted.
        #[arg(short, long)]
        request: Option<PathBuf>,

        /// Date ages are computed against (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDate>,
    },

    /// Score every row of a dataset and write it with prediction columns
    Score {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Defaults to the input directory with a '_scored' suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Date ages are computed against (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDate>,
    },

    /// Score a labeled dataset, write metrics.json and check deployment criteria
    Evaluate {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Accuracy the model must exceed
        #[arg(long, default_value = "0.90", value_parser = validate_unit_interval)]
        min_accuracy: f64,

        /// ROC-AUC the model must exceed
        #[arg(long, default_value = "0.75", value_parser = validate_unit_interval)]
        min_roc_auc: f64,

        /// Date ages are computed against (YYYY-MM-DD). Defaults to today.
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDate>,
    },
}

/// Default output path for scored batches: `<stem>_scored.<ext>` next to the input
pub fn scored_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("parquet");
    parent.join(format!("{}_scored.{}", stem, extension))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}

/// Validator for strictly positive parameters
fn validate_positive(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("value must be positive, got {}", value))
    }
}

/// Validator for metric thresholds
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value = parse_f64(s)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "threshold must be between 0.0 and 1.0, got {}",
            value
        ))
    }
}

fn validate_max_iter(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid iteration count", s))?;
    if value == 0 {
        Err("max_iter must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

fn parse_as_of(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD format", s))
}
