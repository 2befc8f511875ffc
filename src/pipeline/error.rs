//! Error types for the scoring and training pipeline.
//!
//! Every failure in the encoder, aligner, scoring engine, training pipeline
//! and artifact store surfaces as a [`FraudError`]. None of them are retried:
//! scoring malformed input fails closed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while encoding, scoring or training.
#[derive(Debug, Error)]
pub enum FraudError {
    /// A date or time field could not be parsed.
    #[error("Failed to parse {field} value '{value}': expected {expected}")]
    Parse {
        /// Raw field name (e.g. `trans_date_trans_time`)
        field: &'static str,
        /// The offending raw value
        value: String,
        /// Human-readable list of accepted formats
        expected: &'static str,
    },

    /// A required raw field is absent from the record or dataset.
    #[error("Required field '{field}' is missing{}", row_suffix(.row))]
    MissingField {
        /// Raw field name
        field: String,
        /// Zero-based row index, when the field is missing in a single row
        row: Option<usize>,
    },

    /// The aligned feature matrix does not match a fitted component.
    ///
    /// Downstream of a correct aligner this never happens; it signals an
    /// internal invariant violation between artifacts.
    #[error("Dimension mismatch in {component}: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Component that rejected the matrix (normalizer, classifier, ...)
        component: &'static str,
        /// Width the component was fitted on
        expected: usize,
        /// Width that was supplied
        actual: usize,
    },

    /// Logistic regression did not converge within the iteration bound.
    #[error(
        "Logistic regression did not converge after {iterations} iterations \
         (gradient norm {gradient_norm:.3e}, tolerance {tolerance:.1e})"
    )]
    Convergence {
        iterations: usize,
        gradient_norm: f64,
        tolerance: f64,
    },

    /// A required persisted artifact is missing at load time.
    #[error("Required artifact '{name}' not found at {}", .path.display())]
    ArtifactNotFound { name: &'static str, path: PathBuf },

    /// Training data cannot be used to fit a model.
    #[error("Invalid training data: {0}")]
    InvalidData(String),

    /// Artifact file I/O failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact (de)serialization failure.
    #[error("Failed to (de)serialize {name}: {source}")]
    Serialization {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Dataset access failure.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" (row {})", row),
        None => String::new(),
    }
}

impl FraudError {
    /// Shorthand for a field missing from a whole record or dataset.
    pub fn missing(field: impl Into<String>) -> Self {
        FraudError::MissingField {
            field: field.into(),
            row: None,
        }
    }

    /// Shorthand for a field that is null in one dataset row.
    pub fn missing_in_row(field: impl Into<String>, row: usize) -> Self {
        FraudError::MissingField {
            field: field.into(),
            row: Some(row),
        }
    }
}

/// Result alias used throughout the pipeline.
pub type FraudResult<T> = Result<T, FraudError>;
