//! Label column extraction
//!
//! Training needs the `is_fraud` column as 0/1 values. Numeric, boolean and
//! string encodings of 0/1 are accepted; anything else is rejected.

use polars::prelude::*;

use super::error::{FraudError, FraudResult};

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Number of fraud and legitimate rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelCounts {
    pub frauds: usize,
    pub legitimate: usize,
}

impl LabelCounts {
    pub fn total(&self) -> usize {
        self.frauds + self.legitimate
    }

    /// Share of fraud rows, 0.0 for an empty set
    pub fn fraud_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.frauds as f64 / self.total() as f64
        }
    }
}

pub fn count_labels(labels: &[u8]) -> LabelCounts {
    let frauds = labels.iter().filter(|&&label| label == 1).count();
    LabelCounts {
        frauds,
        legitimate: labels.len() - frauds,
    }
}

fn float_to_label(value: f64, row: usize, target: &str) -> FraudResult<u8> {
    if (value - 0.0).abs() < TOLERANCE {
        Ok(0)
    } else if (value - 1.0).abs() < TOLERANCE {
        Ok(1)
    } else {
        Err(FraudError::InvalidData(format!(
            "label column '{}' has non-binary value {} at row {}",
            target, value, row
        )))
    }
}

/// Read the label column as 0/1 values, one per row
pub fn extract_labels(df: &DataFrame, target: &str) -> FraudResult<Vec<u8>> {
    let target_col = df.column(target).map_err(|_| FraudError::missing(target))?;

    if target_col.len() == 0 {
        return Err(FraudError::InvalidData(format!(
            "label column '{}' is empty",
            target
        )));
    }

    let labels = match target_col.dtype() {
        DataType::Boolean => target_col
            .bool()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.map(|b| b as u8)
                    .ok_or_else(|| FraudError::missing_in_row(target, row))
            })
            .collect::<FraudResult<Vec<u8>>>()?,
        DataType::String => target_col
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                let raw = v.ok_or_else(|| FraudError::missing_in_row(target, row))?;
                let value = raw.trim().parse::<f64>().map_err(|_| {
                    FraudError::InvalidData(format!(
                        "label column '{}' has non-binary value '{}' at row {}",
                        target, raw, row
                    ))
                })?;
                float_to_label(value, row, target)
            })
            .collect::<FraudResult<Vec<u8>>>()?,
        _ => {
            let float_col = target_col.cast(&DataType::Float64)?;
            float_col
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let value = v.ok_or_else(|| FraudError::missing_in_row(target, row))?;
                    float_to_label(value, row, target)
                })
                .collect::<FraudResult<Vec<u8>>>()?
        }
    };

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_integer_labels() {
        let df = df!("is_fraud" => [0i64, 1, 0, 0]).unwrap();
        let labels = extract_labels(&df, "is_fraud").unwrap();
        assert_eq!(labels, vec![0, 1, 0, 0]);

        let counts = count_labels(&labels);
        assert_eq!(counts.frauds, 1);
        assert_eq!(counts.legitimate, 3);
        assert!((counts.fraud_rate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_extract_string_and_bool_labels() {
        let df = df!("is_fraud" => ["1", "0"]).unwrap();
        assert_eq!(extract_labels(&df, "is_fraud").unwrap(), vec![1, 0]);

        let df = df!("is_fraud" => [true, false]).unwrap();
        assert_eq!(extract_labels(&df, "is_fraud").unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_non_binary_label_rejected() {
        let df = df!("is_fraud" => [0.0, 2.0]).unwrap();
        let err = extract_labels(&df, "is_fraud").unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_missing_label_column() {
        let df = df!("amt" => [1.0]).unwrap();
        assert!(matches!(
            extract_labels(&df, "is_fraud"),
            Err(FraudError::MissingField { row: None, .. })
        ));
    }

    #[test]
    fn test_null_label_reports_row() {
        let df = df!("is_fraud" => [Some(1i64), None]).unwrap();
        assert!(matches!(
            extract_labels(&df, "is_fraud"),
            Err(FraudError::MissingField { row: Some(1), .. })
        ));
    }
}
