//! Damped Newton iterations for L2-regularized logistic regression
//!
//! Objective over `theta = [w, b]` for `n` rows:
//!
//! ```text
//! J(theta) = (1/n) * sum(softplus(z_i) - y_i * z_i) + (lambda / 2n) * ||w||^2
//! z_i      = x_i . w + b
//! ```
//!
//! The bias is not penalized. Each step solves `H d = g` by Cholesky and
//! backtracks until the Armijo condition holds.

use faer::Mat;
use rayon::prelude::*;
use tracing::{debug, trace};

use super::cholesky::cholesky_solve;
use super::{SolverConfig, SolverResult};
use crate::pipeline::error::{FraudError, FraudResult};

/// Sufficient decrease constant for the Armijo condition
const ARMIJO_C: f64 = 1e-4;

/// Maximum number of step halvings per iteration
const MAX_BACKTRACKS: usize = 50;

/// Diagonal jitter keeping the Hessian factorizable when probabilities saturate
const HESSIAN_JITTER: f64 = 1e-10;

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

struct Problem<'a> {
    x: &'a Mat<f64>,
    y: &'a [u8],
    n: f64,
    lambda: f64,
}

impl<'a> Problem<'a> {
    fn features(&self) -> usize {
        self.x.ncols()
    }

    fn margins(&self, theta: &[f64]) -> Vec<f64> {
        let d = self.features();
        let bias = theta[d];
        (0..self.x.nrows())
            .into_par_iter()
            .map(|i| {
                let mut z = bias;
                for j in 0..d {
                    z += self.x[(i, j)] * theta[j];
                }
                z
            })
            .collect()
    }

    fn penalty(&self, theta: &[f64]) -> f64 {
        let d = self.features();
        let norm_sq: f64 = theta[..d].iter().map(|w| w * w).sum();
        self.lambda / (2.0 * self.n) * norm_sq
    }

    fn loss(&self, theta: &[f64]) -> f64 {
        let margins = self.margins(theta);
        self.data_loss(&margins) / self.n + self.penalty(theta)
    }

    /// Summed sequentially so repeated fits reproduce bit-for-bit
    fn data_loss(&self, margins: &[f64]) -> f64 {
        margins
            .iter()
            .zip(self.y.iter())
            .map(|(&z, &y)| softplus(z) - y as f64 * z)
            .sum()
    }

    /// Gradient and Hessian at `theta`, plus the objective value
    fn derivatives(&self, theta: &[f64]) -> (f64, Vec<f64>, Mat<f64>) {
        let d = self.features();
        let rows = self.x.nrows();
        let margins = self.margins(theta);

        let probs: Vec<f64> = margins.par_iter().map(|&z| sigmoid(z)).collect();
        let residuals: Vec<f64> = probs
            .iter()
            .zip(self.y.iter())
            .map(|(p, &y)| p - y as f64)
            .collect();

        let loss = self.data_loss(&margins) / self.n + self.penalty(theta);

        let mut gradient: Vec<f64> = (0..d)
            .into_par_iter()
            .map(|j| {
                let dot: f64 = (0..rows).map(|i| self.x[(i, j)] * residuals[i]).sum();
                dot / self.n + self.lambda / self.n * theta[j]
            })
            .collect();
        gradient.push(residuals.iter().sum::<f64>() / self.n);

        // Rows of [X, 1] weighted by sqrt(p (1 - p))
        let mut zw = Mat::<f64>::zeros(rows, d + 1);
        for i in 0..rows {
            let w = (probs[i] * (1.0 - probs[i])).sqrt();
            for j in 0..d {
                zw[(i, j)] = self.x[(i, j)] * w;
            }
            zw[(i, d)] = w;
        }

        let gram = zw.transpose() * &zw;
        let mut hessian = Mat::<f64>::zeros(d + 1, d + 1);
        for i in 0..=d {
            for j in 0..=d {
                hessian[(i, j)] = gram[(i, j)] / self.n;
            }
            let ridge = if i < d { self.lambda / self.n } else { 0.0 };
            hessian[(i, i)] += ridge + HESSIAN_JITTER;
        }

        (loss, gradient, hessian)
    }
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Fit weights and bias on a standardized matrix and 0/1 labels
pub(super) fn fit(x: &Mat<f64>, y: &[u8], config: &SolverConfig) -> FraudResult<SolverResult> {
    let problem = Problem {
        x,
        y,
        n: x.nrows() as f64,
        lambda: config.l2_penalty,
    };
    let d = problem.features();
    let mut theta = vec![0.0; d + 1];
    let mut gradient_norm = f64::INFINITY;
    let mut loss = f64::INFINITY;

    for iteration in 0..config.max_iter {
        let (current_loss, gradient, hessian) = problem.derivatives(&theta);
        loss = current_loss;
        gradient_norm = inf_norm(&gradient);

        if !loss.is_finite() || !gradient_norm.is_finite() {
            return Err(FraudError::Convergence {
                iterations: iteration,
                gradient_norm,
                tolerance: config.tolerance,
            });
        }

        trace!(iteration, loss, gradient_norm, "Newton iteration");

        if gradient_norm < config.tolerance {
            debug!(iterations = iteration, loss, gradient_norm, "Solver converged");
            return Ok(SolverResult {
                weights: theta[..d].to_vec(),
                bias: theta[d],
                iterations: iteration,
                gradient_norm,
                loss,
            });
        }

        // Newton direction, or steepest descent when the system is not SPD
        let direction = cholesky_solve(&hessian, &gradient).unwrap_or_else(|| gradient.clone());
        let slope: f64 = gradient.iter().zip(direction.iter()).map(|(g, s)| g * s).sum();

        let mut step = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate: Vec<f64> = theta
                .iter()
                .zip(direction.iter())
                .map(|(t, s)| t - step * s)
                .collect();
            let candidate_loss = problem.loss(&candidate);
            if candidate_loss <= loss - ARMIJO_C * step * slope {
                accepted = Some(candidate);
                break;
            }
            step *= 0.5;
        }

        match accepted {
            Some(next) => theta = next,
            None => {
                debug!(iteration, gradient_norm, "Line search stalled");
                return Err(FraudError::Convergence {
                    iterations: iteration + 1,
                    gradient_norm,
                    tolerance: config.tolerance,
                });
            }
        }
    }

    debug!(loss, gradient_norm, "Solver hit iteration limit");
    Err(FraudError::Convergence {
        iterations: config.max_iter,
        gradient_norm,
        tolerance: config.tolerance,
    })
}
