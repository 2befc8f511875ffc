//! Dataset loading and saving for CSV and Parquet files, plus conversion of
//! dataset rows into raw transactions

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use super::error::{FraudError, FraudResult};
use super::transaction::{fields, RawTransaction};
use crate::utils::{create_spinner, finish_with_success};

/// Default number of rows used for CSV schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load a dataset lazily (CSV or Parquet based on extension).
///
/// `infer_schema_length` of 0 scans the whole CSV for schema inference.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = extension_of(path);
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Load and collect a dataset behind a spinner.
///
/// Returns the frame with its row count, column count and estimated size in MB.
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let spinner = create_spinner(&format!("Loading {}...", path.display()));
    let df = load_dataset(path, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    tracing::info!(path = %path.display(), rows, cols, memory_mb, "Loaded dataset");

    Ok((df, rows, cols, memory_mb))
}

/// Column names of a dataset without collecting its rows
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    let mut lf = load_dataset(path, DEFAULT_INFER_SCHEMA_LENGTH)?;
    let schema = lf
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Fail before loading rows when the dataset lacks any of `required`
pub fn check_required_columns(path: &Path, required: &[&str]) -> Result<()> {
    let columns = get_column_names(path)?;
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !columns.iter().any(|column| column == name))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        );
    }
    Ok(())
}

/// Save a dataset to CSV or Parquet based on extension
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = extension_of(path);

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

fn column<'a>(df: &'a DataFrame, name: &'static str) -> FraudResult<&'a Column> {
    df.column(name).map_err(|_| FraudError::missing(name))
}

fn string_values(df: &DataFrame, name: &'static str) -> FraudResult<Vec<Option<String>>> {
    let col = column(df, name)?.cast(&DataType::String)?;
    Ok(col
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Cast a column to `Float64`, failing on any value the cast turns into null
fn float_values(df: &DataFrame, name: &'static str) -> FraudResult<Vec<Option<f64>>> {
    let col = column(df, name)?;
    let values: Vec<Option<f64>> = col.cast(&DataType::Float64)?.f64()?.into_iter().collect();

    for (row, value) in values.iter().enumerate() {
        if value.is_none() {
            let raw = col.get(row)?;
            if !raw.is_null() {
                return Err(FraudError::Parse {
                    field: name,
                    value: raw.str_value().to_string(),
                    expected: "a number",
                });
            }
        }
    }
    Ok(values)
}

/// Integer column; fractional or non-numeric values are rejected
fn int_values(df: &DataFrame, name: &'static str) -> FraudResult<Vec<Option<i64>>> {
    float_values(df, name)?
        .into_iter()
        .map(|value| match value {
            Some(v) if v.fract() != 0.0 || !v.is_finite() => Err(FraudError::Parse {
                field: name,
                value: v.to_string(),
                expected: "an integer",
            }),
            Some(v) => Ok(Some(v as i64)),
            None => Ok(None),
        })
        .collect()
}

fn required<T: Clone>(values: &[Option<T>], field: &'static str, row: usize) -> FraudResult<T> {
    values[row]
        .clone()
        .ok_or_else(|| FraudError::missing_in_row(field, row))
}

/// Convert every dataset row into a [`RawTransaction`].
///
/// Extra columns (including the label) are ignored. A missing required column
/// fails with `MissingField`; a null required value fails with the row index.
/// `trans_num` is optional.
pub fn transactions_from_frame(df: &DataFrame) -> FraudResult<Vec<RawTransaction>> {
    let timestamp = string_values(df, fields::TIMESTAMP)?;
    let merchant = string_values(df, fields::MERCHANT)?;
    let category = string_values(df, fields::CATEGORY)?;
    let amount = float_values(df, fields::AMOUNT)?;
    let city = string_values(df, fields::CITY)?;
    let state = string_values(df, fields::STATE)?;
    let latitude = float_values(df, fields::LATITUDE)?;
    let longitude = float_values(df, fields::LONGITUDE)?;
    let city_population = int_values(df, fields::CITY_POPULATION)?;
    let job = string_values(df, fields::JOB)?;
    let date_of_birth = string_values(df, fields::DATE_OF_BIRTH)?;
    let merchant_latitude = float_values(df, fields::MERCHANT_LATITUDE)?;
    let merchant_longitude = float_values(df, fields::MERCHANT_LONGITUDE)?;
    let transaction_id = match df.column(fields::TRANSACTION_ID) {
        Ok(_) => string_values(df, fields::TRANSACTION_ID)?,
        Err(_) => vec![None; df.height()],
    };

    let mut transactions = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut builder = RawTransaction::builder()
            .timestamp(required(&timestamp, fields::TIMESTAMP, row)?)
            .merchant(required(&merchant, fields::MERCHANT, row)?)
            .category(required(&category, fields::CATEGORY, row)?)
            .amount(required(&amount, fields::AMOUNT, row)?)
            .city(required(&city, fields::CITY, row)?)
            .state(required(&state, fields::STATE, row)?)
            .location(
                required(&latitude, fields::LATITUDE, row)?,
                required(&longitude, fields::LONGITUDE, row)?,
            )
            .city_population(required(&city_population, fields::CITY_POPULATION, row)?)
            .job(required(&job, fields::JOB, row)?)
            .date_of_birth(required(&date_of_birth, fields::DATE_OF_BIRTH, row)?)
            .merchant_location(
                required(&merchant_latitude, fields::MERCHANT_LATITUDE, row)?,
                required(&merchant_longitude, fields::MERCHANT_LONGITUDE, row)?,
            );
        if let Some(id) = &transaction_id[row] {
            builder = builder.transaction_id(id.clone());
        }

        let tx = builder
            .build()
            .map_err(|field| FraudError::missing_in_row(field, row))?;
        transactions.push(tx);
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df! {
            "trans_date_trans_time" => ["2023-01-15 14:30", "2023-01-16 02:05"],
            "merchant" => ["fraud_Kirlin and Sons", "fraud_Sporer-Keebler"],
            "category" => ["personal_care", "travel"],
            "amt" => [29.84, 1077.69],
            "city" => ["Malad City", "Columbia"],
            "state" => ["ID", "SC"],
            "lat" => [42.1808, 34.0],
            "long" => [-112.262, -81.0],
            "city_pop" => [2071i64, 333497],
            "job" => ["Mechanical engineer", "Designer"],
            "dob" => ["15-03-1988", "01-01-1970"],
            "merch_lat" => [43.150704, 34.5],
            "merch_long" => [-112.154481, -80.5],
            "is_fraud" => [0i64, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_transactions_from_frame() {
        let df = sample_frame();
        let txs = transactions_from_frame(&df).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1].category(), "travel");
        assert_eq!(txs[1].city_population(), 333497);
        assert_eq!(txs[0].transaction_id(), None);
    }

    #[test]
    fn test_missing_column_reported() {
        let df = sample_frame().drop("amt").unwrap();
        let err = transactions_from_frame(&df).unwrap_err();
        assert!(matches!(err, FraudError::MissingField { ref field, row: None } if field == "amt"));
    }

    #[test]
    fn test_null_value_reports_row() {
        let mut df = sample_frame();
        let jobs = Series::new("job".into(), &[Some("Designer"), None]);
        df.with_column(jobs).unwrap();

        let err = transactions_from_frame(&df).unwrap_err();
        assert!(matches!(err, FraudError::MissingField { row: Some(1), .. }));
    }

    #[test]
    fn test_non_numeric_amount_is_parse_error() {
        let mut df = sample_frame();
        let amounts = Series::new("amt".into(), &["29.84", "abc"]);
        df.with_column(amounts).unwrap();

        let err = transactions_from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            FraudError::Parse { field: "amt", ref value, .. } if value == "abc"
        ));
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut df = sample_frame();
        let amounts = Series::new("amt".into(), &["29.84", "1077.69"]);
        df.with_column(amounts).unwrap();

        let txs = transactions_from_frame(&df).unwrap();
        assert_eq!(txs[1].amount(), 1077.69);
    }

    #[test]
    fn test_fractional_city_population_rejected() {
        let mut df = sample_frame();
        let populations = Series::new("city_pop".into(), &[2071.0, 333497.5]);
        df.with_column(populations).unwrap();

        let err = transactions_from_frame(&df).unwrap_err();
        assert!(matches!(err, FraudError::Parse { field: "city_pop", .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_dataset(Path::new("data.xlsx"), DEFAULT_INFER_SCHEMA_LENGTH);
        assert!(result.is_err());
    }
}
