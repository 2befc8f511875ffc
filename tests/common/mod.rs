//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use fraudscope::pipeline::RawTransaction;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

pub const CATEGORIES: [&str; 5] = [
    "grocery_pos",
    "travel",
    "personal_care",
    "shopping_net",
    "gas_transport",
];
pub const STATES: [&str; 4] = ["ID", "TX", "CA", "NY"];

/// Fixed evaluation date so ages never drift between runs
pub fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// The documented example transaction: 29.84 at 14:30 on Sunday 2023-01-15
pub fn sample_transaction() -> RawTransaction {
    RawTransaction::builder()
        .timestamp("2023-01-15 14:30")
        .merchant("fraud_Kirlin and Sons")
        .category("personal_care")
        .amount(29.84)
        .city("Malad City")
        .state("ID")
        .location(42.1808, -112.2620)
        .city_population(2071)
        .job("Mechanical engineer")
        .date_of_birth("15-03-1988")
        .transaction_id("2da90c7d74bd46a0caf3777415b3ebd3")
        .merchant_location(43.150704, -112.154481)
        .build()
        .unwrap()
}

/// The sample transaction as a JSON request body
pub fn sample_request_json() -> serde_json::Value {
    serde_json::to_value(sample_transaction()).unwrap()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Seeded synthetic history where large night-time amounts are likely fraud
pub fn synthetic_transactions(rows: usize, seed: u64) -> (Vec<RawTransaction>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut transactions = Vec::with_capacity(rows);
    let mut labels = Vec::with_capacity(rows);

    for _ in 0..rows {
        let amount: f64 = rng.gen_range(1.0..1200.0);
        let hour: u32 = rng.gen_range(0..24);
        let night = hour >= 22 || hour < 4;
        let p = sigmoid(-5.0 + 0.007 * amount + if night { 2.0 } else { 0.0 });
        let label = (rng.gen::<f64>() < p) as u8;

        let lat: f64 = rng.gen_range(25.0..48.0);
        let long: f64 = rng.gen_range(-120.0..-70.0);
        let tx = RawTransaction::builder()
            .timestamp(format!(
                "2023-{:02}-{:02} {:02}:{:02}",
                rng.gen_range(1..=12),
                rng.gen_range(1..=28),
                hour,
                rng.gen_range(0..60)
            ))
            .merchant(format!("fraud_Merchant {}", rng.gen_range(0..20)))
            .category(*CATEGORIES.choose(&mut rng).unwrap())
            .amount((amount * 100.0).round() / 100.0)
            .city(format!("City {}", rng.gen_range(0..10)))
            .state(*STATES.choose(&mut rng).unwrap())
            .location(lat, long)
            .city_population(rng.gen_range(100..1_000_000))
            .job(format!("Job {}", rng.gen_range(0..8)))
            .date_of_birth(format!(
                "{:02}-{:02}-{}",
                rng.gen_range(1..=28),
                rng.gen_range(1..=12),
                rng.gen_range(1940..2002)
            ))
            .transaction_id(format!("{:032x}", rng.gen::<u128>()))
            .merchant_location(lat + rng.gen_range(-1.0..1.0), long + rng.gen_range(-1.0..1.0))
            .build()
            .unwrap();

        transactions.push(tx);
        labels.push(label);
    }

    (transactions, labels)
}

/// Frame with the raw columns, optionally followed by `is_fraud`
pub fn transactions_frame(transactions: &[RawTransaction], labels: Option<&[u8]>) -> DataFrame {
    let strings = |f: fn(&RawTransaction) -> &str| -> Vec<String> {
        transactions.iter().map(|tx| f(tx).to_string()).collect()
    };
    let floats = |f: fn(&RawTransaction) -> f64| -> Vec<f64> { transactions.iter().map(f).collect() };

    let mut columns = vec![
        Column::new("trans_date_trans_time".into(), strings(RawTransaction::timestamp)),
        Column::new("merchant".into(), strings(RawTransaction::merchant)),
        Column::new("category".into(), strings(RawTransaction::category)),
        Column::new("amt".into(), floats(RawTransaction::amount)),
        Column::new("city".into(), strings(RawTransaction::city)),
        Column::new("state".into(), strings(RawTransaction::state)),
        Column::new("lat".into(), floats(RawTransaction::latitude)),
        Column::new("long".into(), floats(RawTransaction::longitude)),
        Column::new(
            "city_pop".into(),
            transactions.iter().map(|tx| tx.city_population()).collect::<Vec<i64>>(),
        ),
        Column::new("job".into(), strings(RawTransaction::job)),
        Column::new("dob".into(), strings(RawTransaction::date_of_birth)),
        Column::new(
            "trans_num".into(),
            transactions
                .iter()
                .map(|tx| tx.transaction_id().map(|s| s.to_string()))
                .collect::<Vec<Option<String>>>(),
        ),
        Column::new("merch_lat".into(), floats(RawTransaction::merchant_latitude)),
        Column::new("merch_long".into(), floats(RawTransaction::merchant_longitude)),
    ];
    if let Some(labels) = labels {
        let values: Vec<i64> = labels.iter().map(|&l| l as i64).collect();
        columns.push(Column::new("is_fraud".into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Labeled synthetic frame
pub fn synthetic_frame(rows: usize, seed: u64) -> DataFrame {
    let (transactions, labels) = synthetic_transactions(rows, seed);
    transactions_frame(&transactions, Some(&labels))
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("transactions.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("transactions.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
