//! The fitted binary classifier
//!
//! Maps a normalized feature row to a fraud probability with
//! `sigmoid(w . x + b)`.

use faer::Mat;
use serde::{Deserialize, Serialize};

use super::error::{FraudError, FraudResult};
use super::solver::{sigmoid, SolverResult};

/// Default probability above which a transaction is labeled fraud
pub const DEFAULT_THRESHOLD: f64 = 0.5;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Logistic regression weights in schema order plus an intercept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedClassifier {
    weights: Vec<f64>,
    bias: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
    /// Solver iterations used to fit, kept for reporting
    #[serde(default)]
    iterations: usize,
}

impl FittedClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            weights,
            bias,
            threshold: DEFAULT_THRESHOLD,
            iterations: 0,
        }
    }

    pub fn from_solver(result: SolverResult) -> Self {
        Self {
            weights: result.weights,
            bias: result.bias,
            threshold: DEFAULT_THRESHOLD,
            iterations: result.iterations,
        }
    }

    /// Override the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> FraudResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FraudError::InvalidData(format!(
                "decision threshold {} is outside [0, 1]",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Linear score `w . x + b` for one normalized row
    pub fn decision_function(&self, row: &[f64]) -> FraudResult<f64> {
        if row.len() != self.width() {
            return Err(FraudError::DimensionMismatch {
                component: "classifier",
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(self.bias + row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f64>())
    }

    /// Fraud probability for one normalized row
    pub fn predict_proba(&self, row: &[f64]) -> FraudResult<f64> {
        Ok(sigmoid(self.decision_function(row)?))
    }

    /// Fraud probabilities for every row of a normalized matrix
    pub fn predict_proba_matrix(&self, matrix: &Mat<f64>) -> FraudResult<Vec<f64>> {
        if matrix.ncols() != self.width() {
            return Err(FraudError::DimensionMismatch {
                component: "classifier",
                expected: self.width(),
                actual: matrix.ncols(),
            });
        }
        Ok((0..matrix.nrows())
            .map(|i| {
                let z = (0..matrix.ncols())
                    .map(|j| matrix[(i, j)] * self.weights[j])
                    .sum::<f64>()
                    + self.bias;
                sigmoid(z)
            })
            .collect())
    }

    /// Whether a probability is labeled fraud. A probability exactly at the
    /// threshold (zero decision score at 0.5) is legitimate.
    pub fn is_fraud(&self, probability: f64) -> bool {
        probability > self.threshold
    }

    /// Re-check invariants serde cannot enforce on a loaded model
    pub fn validated(self) -> FraudResult<Self> {
        if let Some(bad) = self.weights.iter().chain([&self.bias]).find(|v| !v.is_finite()) {
            return Err(FraudError::InvalidData(format!(
                "classifier has non-finite coefficient {}",
                bad
            )));
        }
        let threshold = self.threshold;
        self.with_threshold(threshold)
    }
}
