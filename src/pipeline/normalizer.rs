//! Per-feature standardization fitted on the training split

use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{FraudError, FraudResult};

/// Mean and scale per feature, in schema order.
///
/// `transform` computes `(x - mean) / scale`. Constant features get a scale
/// of 1.0 so they pass through centered instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNormalizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl FittedNormalizer {
    /// Fit means and population standard deviations column by column
    pub fn fit(matrix: &Mat<f64>) -> FraudResult<Self> {
        let n = matrix.nrows();
        if n == 0 {
            return Err(FraudError::InvalidData(
                "cannot fit normalizer on an empty matrix".to_string(),
            ));
        }

        let stats: Vec<(f64, f64)> = (0..matrix.ncols())
            .into_par_iter()
            .map(|j| {
                let mean = (0..n).map(|i| matrix[(i, j)]).sum::<f64>() / n as f64;
                let variance = (0..n)
                    .map(|i| {
                        let d = matrix[(i, j)] - mean;
                        d * d
                    })
                    .sum::<f64>()
                    / n as f64;
                let std = variance.sqrt();
                let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
                (mean, scale)
            })
            .collect();

        let (means, scales) = stats.into_iter().unzip();
        Ok(Self { means, scales })
    }

    /// Rebuild from persisted parameters
    pub fn from_parts(means: Vec<f64>, scales: Vec<f64>) -> FraudResult<Self> {
        if means.len() != scales.len() {
            return Err(FraudError::DimensionMismatch {
                component: "normalizer scales",
                expected: means.len(),
                actual: scales.len(),
            });
        }
        if let Some(idx) = scales.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(FraudError::InvalidData(format!(
                "normalizer scale at position {} is {}",
                idx, scales[idx]
            )));
        }
        Ok(Self { means, scales })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardize a matrix with the fitted parameters
    pub fn transform(&self, matrix: &Mat<f64>) -> FraudResult<Mat<f64>> {
        self.check_width(matrix.ncols())?;

        let mut scaled = Mat::<f64>::zeros(matrix.nrows(), matrix.ncols());
        for j in 0..matrix.ncols() {
            let (mean, scale) = (self.means[j], self.scales[j]);
            for i in 0..matrix.nrows() {
                scaled[(i, j)] = (matrix[(i, j)] - mean) / scale;
            }
        }
        Ok(scaled)
    }

    /// Standardize a single aligned row
    pub fn transform_row(&self, row: &[f64]) -> FraudResult<Vec<f64>> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }

    fn check_width(&self, actual: usize) -> FraudResult<()> {
        if actual != self.width() {
            return Err(FraudError::DimensionMismatch {
                component: "normalizer",
                expected: self.width(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> Mat<f64> {
        let mut m = Mat::<f64>::zeros(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    #[test]
    fn test_fit_population_std() {
        let m = matrix(&[&[1.0, 5.0], &[3.0, 5.0]]);
        let norm = FittedNormalizer::fit(&m).unwrap();

        assert_eq!(norm.means(), &[2.0, 5.0]);
        assert!((norm.scales()[0] - 1.0).abs() < 1e-12);
        // Constant column keeps unit scale
        assert_eq!(norm.scales()[1], 1.0);
    }

    #[test]
    fn test_transform_centers_and_scales() {
        let m = matrix(&[&[0.0, 10.0], &[4.0, 10.0], &[8.0, 10.0]]);
        let norm = FittedNormalizer::fit(&m).unwrap();
        let scaled = norm.transform(&m).unwrap();

        let col_mean: f64 = (0..3).map(|i| scaled[(i, 0)]).sum::<f64>() / 3.0;
        assert!(col_mean.abs() < 1e-12);
        assert_eq!(scaled[(0, 1)], 0.0);
        assert!(scaled[(0, 0)] < 0.0 && scaled[(2, 0)] > 0.0);
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let norm = FittedNormalizer::fit(&matrix(&[&[1.0, 2.0], &[3.0, 4.0]])).unwrap();
        let err = norm.transform_row(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            FraudError::DimensionMismatch { expected: 2, actual: 3, .. }
        ));
    }

    #[test]
    fn test_from_parts_rejects_zero_scale() {
        assert!(FittedNormalizer::from_parts(vec![0.0], vec![0.0]).is_err());
        assert!(FittedNormalizer::from_parts(vec![0.0, 1.0], vec![1.0]).is_err());
    }
}
