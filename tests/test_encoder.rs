//! Tests for feature encoding

use fraudscope::pipeline::encoder::{one_hot_name, CATEGORY_PREFIX, STATE_PREFIX};
use fraudscope::pipeline::{fit_encoder, FeatureEncoder, FraudError, FrequencyTables, RawTransaction};

#[path = "common/mod.rs"]
mod common;

use common::{evaluation_date, sample_transaction, synthetic_transactions};

fn with_merchant(tx: &RawTransaction, merchant: &str) -> RawTransaction {
    let mut value = serde_json::to_value(tx).unwrap();
    value["merchant"] = serde_json::json!(merchant);
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_sample_transaction_calendar_features() {
    let (history, labels) = synthetic_transactions(50, 1);
    let tables = FrequencyTables::fit(&history, &labels).unwrap();
    let encoder = FeatureEncoder::new(&tables, evaluation_date());

    let vector = encoder.encode(&sample_transaction()).unwrap();

    assert_eq!(vector.get("hour"), Some(14.0));
    assert_eq!(vector.get("day_of_week"), Some(6.0), "2023-01-15 is a Sunday");
    assert_eq!(vector.get("month"), Some(1.0));
    assert_eq!(vector.get("amt"), Some(29.84));
    assert_eq!(vector.get("age"), Some(36.0));
    assert_eq!(vector.get(&one_hot_name(CATEGORY_PREFIX, "personal_care")), Some(1.0));
    assert_eq!(vector.get(&one_hot_name(STATE_PREFIX, "ID")), Some(1.0));
    assert!(vector.get("trans_num").is_none());
}

#[test]
fn test_encoding_is_deterministic() {
    let (history, labels) = synthetic_transactions(50, 2);
    let tables = FrequencyTables::fit(&history, &labels).unwrap();
    let encoder = FeatureEncoder::new(&tables, evaluation_date());

    let tx = sample_transaction();
    assert_eq!(encoder.encode(&tx).unwrap(), encoder.encode(&tx).unwrap());
}

#[test]
fn test_merchant_rate_and_unseen_fallback() {
    let base = sample_transaction();
    let mut history = Vec::new();
    let mut labels = Vec::new();
    for i in 0..10 {
        history.push(with_merchant(&base, "X"));
        labels.push(if i < 3 { 1 } else { 0 });
    }
    for i in 0..10 {
        history.push(with_merchant(&base, "Z"));
        labels.push(if i < 1 { 1 } else { 0 });
    }

    let tables = FrequencyTables::fit(&history, &labels).unwrap();
    let encoder = FeatureEncoder::new(&tables, evaluation_date());

    let seen = encoder.encode(&with_merchant(&base, "X")).unwrap();
    assert!((seen.get("merchant_target_enc").unwrap() - 0.3).abs() < 1e-12);

    let unseen = encoder.encode(&with_merchant(&base, "Y")).unwrap();
    let global = 4.0 / 20.0;
    assert!((unseen.get("merchant_target_enc").unwrap() - global).abs() < 1e-12);
}

#[test]
fn test_batch_matches_single_encoding() {
    let (history, labels) = synthetic_transactions(40, 3);
    let tables = FrequencyTables::fit(&history, &labels).unwrap();
    let encoder = FeatureEncoder::new(&tables, evaluation_date());

    let batch = encoder.encode_batch(&history).unwrap();
    assert_eq!(batch.len(), history.len());
    for (tx, vector) in history.iter().zip(&batch) {
        assert_eq!(&encoder.encode(tx).unwrap(), vector);
    }
}

#[test]
fn test_fit_encoder_schema_covers_every_vector() {
    let (history, labels) = synthetic_transactions(60, 4);
    let fitted = fit_encoder(&history, &labels, evaluation_date()).unwrap();

    for vector in &fitted.vectors {
        for name in vector.names() {
            assert!(fitted.schema.contains(name), "'{}' not in schema", name);
        }
    }
    assert!(fitted.schema.contains("merchant_target_enc"));
    assert!(fitted.schema.contains("city_target_enc"));
    assert!(fitted.schema.contains("job_target_enc"));
}

#[test]
fn test_unparseable_date_of_birth() {
    let mut value = serde_json::to_value(sample_transaction()).unwrap();
    value["dob"] = serde_json::json!("not a date");
    let tx: RawTransaction = serde_json::from_value(value).unwrap();

    let (history, labels) = synthetic_transactions(20, 5);
    let tables = FrequencyTables::fit(&history, &labels).unwrap();
    let err = FeatureEncoder::new(&tables, evaluation_date())
        .encode(&tx)
        .unwrap_err();
    assert!(matches!(err, FraudError::Parse { field: "dob", .. }));
}
