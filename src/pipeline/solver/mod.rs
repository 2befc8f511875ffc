//! Logistic regression solver
//!
//! Fits L2-regularized logistic regression with damped Newton steps. The
//! solver runs to a gradient tolerance within an explicit iteration bound and
//! reports non-convergence as an error instead of returning a partial fit.

mod cholesky;
mod newton;

use faer::Mat;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{FraudError, FraudResult};

pub use newton::sigmoid;

/// Configuration for the logistic regression solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Upper bound on Newton iterations
    pub max_iter: usize,
    /// Convergence threshold on the max-norm of the gradient
    pub tolerance: f64,
    /// L2 penalty strength on the weights (inverse regularization `C`)
    pub l2_penalty: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-6,
            l2_penalty: 1.0,
        }
    }
}

/// Fitted parameters and convergence diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Newton iterations taken before the gradient fell below tolerance
    pub iterations: usize,
    /// Max-norm of the gradient at the returned parameters
    pub gradient_norm: f64,
    /// Regularized mean log-loss at the returned parameters
    pub loss: f64,
}

/// Fit logistic regression on a standardized matrix.
///
/// # Arguments
/// * `x` - `rows x features` matrix, already normalized
/// * `y` - 0/1 labels, one per row
/// * `config` - iteration bound, tolerance and penalty
///
/// # Errors
/// `InvalidData` for mismatched inputs, fewer than two rows or a single
/// class; `Convergence` when the tolerance is not reached.
pub fn fit_logistic_regression(
    x: &Mat<f64>,
    y: &[u8],
    config: &SolverConfig,
) -> FraudResult<SolverResult> {
    validate(x, y, config)?;

    let result = newton::fit(x, y, config)?;
    info!(
        features = x.ncols(),
        rows = x.nrows(),
        iterations = result.iterations,
        loss = result.loss,
        "Logistic regression converged"
    );
    Ok(result)
}

fn validate(x: &Mat<f64>, y: &[u8], config: &SolverConfig) -> FraudResult<()> {
    if x.nrows() != y.len() {
        return Err(FraudError::InvalidData(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() < 2 {
        return Err(FraudError::InvalidData(format!(
            "need at least 2 rows to fit, got {}",
            x.nrows()
        )));
    }
    if let Some(label) = y.iter().find(|&&label| label > 1) {
        return Err(FraudError::InvalidData(format!(
            "labels must be 0 or 1, found {}",
            label
        )));
    }
    let frauds = y.iter().filter(|&&label| label == 1).count();
    if frauds == 0 || frauds == y.len() {
        return Err(FraudError::InvalidData(
            "training labels contain a single class".to_string(),
        ));
    }
    if config.max_iter == 0 || !(config.tolerance > 0.0) || !(config.l2_penalty > 0.0) {
        return Err(FraudError::InvalidData(format!(
            "invalid solver configuration: {:?}",
            config
        )));
    }
    Ok(())
}
