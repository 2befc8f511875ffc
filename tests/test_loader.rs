//! Tests for dataset loading and row conversion

use fraudscope::pipeline::{
    check_required_columns, get_column_names, load_dataset, load_dataset_with_progress, save_dataset, FraudError,
    transactions_from_frame, DEFAULT_INFER_SCHEMA_LENGTH,
};

#[path = "common/mod.rs"]
mod common;

use common::{create_temp_csv, create_temp_parquet, synthetic_frame, synthetic_transactions};

#[test]
fn test_csv_rows_round_trip_to_transactions() {
    let (expected, labels) = synthetic_transactions(20, 51);
    let mut df = common::transactions_frame(&expected, Some(&labels));
    let (_dir, path) = create_temp_csv(&mut df);

    let (loaded, rows, cols, _) =
        load_dataset_with_progress(&path, DEFAULT_INFER_SCHEMA_LENGTH).unwrap();
    assert_eq!(rows, 20);
    assert_eq!(cols, df.width());

    let transactions = transactions_from_frame(&loaded).unwrap();
    assert_eq!(transactions.len(), 20);
    assert_eq!(transactions[0].timestamp(), expected[0].timestamp());
    assert_eq!(transactions[0].date_of_birth(), expected[0].date_of_birth());
    assert_eq!(transactions[3].category(), expected[3].category());
    assert!((transactions[5].amount() - expected[5].amount()).abs() < 1e-9);
}

#[test]
fn test_parquet_load() {
    let mut df = synthetic_frame(15, 52);
    let (_dir, path) = create_temp_parquet(&mut df);

    let loaded = load_dataset(&path, DEFAULT_INFER_SCHEMA_LENGTH)
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(loaded.shape(), df.shape());
    assert_eq!(transactions_from_frame(&loaded).unwrap().len(), 15);
}

#[test]
fn test_get_column_names() {
    let mut df = synthetic_frame(5, 53);
    let (_dir, path) = create_temp_csv(&mut df);

    let names = get_column_names(&path).unwrap();
    assert!(names.contains(&"amt".to_string()));
    assert!(names.contains(&"is_fraud".to_string()));
    assert_eq!(names.len(), df.width());
}

#[test]
fn test_required_column_check() {
    let mut df = synthetic_frame(5, 56).drop("dob").unwrap();
    let (_dir, path) = create_temp_csv(&mut df);

    assert!(check_required_columns(&path, &["amt", "is_fraud"]).is_ok());
    let error = check_required_columns(&path, &["amt", "dob", "job"]).unwrap_err();
    assert!(error.to_string().contains("missing required columns: dob"));
}

#[test]
fn test_unsupported_extension_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("data.xlsx");
    std::fs::write(&path, "").unwrap();

    match load_dataset(&path, DEFAULT_INFER_SCHEMA_LENGTH) {
        Err(error) => assert!(error.to_string().contains("Unsupported file format")),
        Ok(_) => panic!("xlsx input should be rejected"),
    }
}

#[test]
fn test_save_dataset_csv_and_parquet() {
    let mut df = synthetic_frame(10, 54);
    let dir = tempfile::TempDir::new().unwrap();

    for name in ["out.csv", "out.parquet"] {
        let path = dir.path().join(name);
        save_dataset(&mut df, &path).unwrap();
        let reloaded = load_dataset(&path, 0).unwrap().collect().unwrap();
        assert_eq!(reloaded.height(), 10);
    }
}

#[test]
fn test_malformed_amount_in_csv_is_parse_error() {
    let (transactions, labels) = synthetic_transactions(3, 55);
    let mut df = common::transactions_frame(&transactions, Some(&labels));
    df.with_column(polars::prelude::Column::new(
        "amt".into(),
        vec!["12.50", "abc", "7.25"],
    ))
    .unwrap();
    let (_dir, path) = create_temp_csv(&mut df);

    let (loaded, _, _, _) = load_dataset_with_progress(&path, DEFAULT_INFER_SCHEMA_LENGTH).unwrap();
    match transactions_from_frame(&loaded) {
        Err(FraudError::Parse { field, value, .. }) => {
            assert_eq!(field, "amt");
            assert_eq!(value, "abc");
        }
        other => panic!("expected a parse error, got {:?}", other.map(|txs| txs.len())),
    }
}
