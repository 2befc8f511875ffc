//! End-to-end tests of the fraudscope binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::{sample_request_json, synthetic_frame, synthetic_transactions, transactions_frame};

const AS_OF: &str = "2024-06-01";

fn fraudscope() -> Command {
    Command::cargo_bin("fraudscope").unwrap()
}

/// Train a model into `<dir>/models` from a synthetic CSV in `dir`
fn trained_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut df = synthetic_frame(400, 61);
    let input = dir.path().join("history.csv");
    fraudscope::pipeline::save_dataset(&mut df, &input).unwrap();

    fraudscope()
        .arg("-m")
        .arg(dir.path().join("models"))
        .args(["train", "-i"])
        .arg(&input)
        .args(["--as-of", AS_OF])
        .assert()
        .success();

    dir
}

#[test]
fn test_help_lists_commands() {
    fraudscope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("predict"))
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("evaluate"));
}

#[test]
fn test_invalid_test_size_rejected() {
    fraudscope()
        .args(["train", "-i", "data.csv", "--test-size", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("test_size"));
}

#[test]
fn test_train_writes_artifacts() {
    let dir = trained_workspace();
    let models = dir.path().join("models");
    for file in [
        "model.json",
        "scaler.json",
        "feature_names.json",
        "frequency_tables.json",
        "metrics.json",
    ] {
        assert!(models.join(file).is_file(), "{} missing", file);
    }

    let metrics: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(models.join("metrics.json")).unwrap())
            .unwrap();
    assert!(metrics["roc_auc"].as_f64().is_some());
    assert_eq!(metrics["metadata"]["stage"], "train");
}

#[test]
fn test_predict_from_request_file() {
    let dir = trained_workspace();
    let request = dir.path().join("request.json");
    std::fs::write(&request, sample_request_json().to_string()).unwrap();

    fraudscope()
        .arg("-m")
        .arg(dir.path().join("models"))
        .args(["predict", "-r"])
        .arg(&request)
        .args(["--as-of", AS_OF])
        .assert()
        .success()
        .stdout(predicate::str::contains("fraud_probability"))
        .stdout(predicate::str::contains("classification"));
}

#[test]
fn test_predict_from_stdin_rejects_missing_field() {
    let dir = trained_workspace();
    let mut body = sample_request_json();
    body.as_object_mut().unwrap().remove("amt");

    fraudscope()
        .arg("-m")
        .arg(dir.path().join("models"))
        .args(["predict", "--as-of", AS_OF])
        .write_stdin(body.to_string())
        .assert()
        .failure()
        .stdout(predicate::str::contains("422"))
        .stdout(predicate::str::contains("VALIDATION_ERROR"));
}

#[test]
fn test_predict_without_model_fails() {
    let dir = TempDir::new().unwrap();
    let request = dir.path().join("request.json");
    std::fs::write(&request, sample_request_json().to_string()).unwrap();

    fraudscope()
        .arg("-m")
        .arg(dir.path().join("empty"))
        .args(["predict", "-r"])
        .arg(&request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_score_appends_prediction_columns() {
    let dir = trained_workspace();
    let (batch, _) = synthetic_transactions(25, 62);
    let mut df = transactions_frame(&batch, None);
    let input = dir.path().join("batch.csv");
    fraudscope::pipeline::save_dataset(&mut df, &input).unwrap();

    fraudscope()
        .arg("-m")
        .arg(dir.path().join("models"))
        .args(["score", "-i"])
        .arg(&input)
        .args(["--as-of", AS_OF])
        .assert()
        .success();

    let output = dir.path().join("batch_scored.csv");
    let names = fraudscope::pipeline::get_column_names(&output).unwrap();
    for column in [
        "is_fraud_predicted",
        "fraud_probability",
        "no_fraud_probability",
        "confidence",
        "amt",
    ] {
        assert!(names.contains(&column.to_string()), "{} missing", column);
    }
}

#[test]
fn test_score_rejects_batch_without_required_column() {
    let dir = trained_workspace();
    let (batch, _) = synthetic_transactions(10, 64);
    let mut df = transactions_frame(&batch, None).drop("city_pop").unwrap();
    let input = dir.path().join("partial.csv");
    fraudscope::pipeline::save_dataset(&mut df, &input).unwrap();

    fraudscope()
        .arg("-m")
        .arg(dir.path().join("models"))
        .args(["score", "-i"])
        .arg(&input)
        .args(["--as-of", AS_OF])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required columns: city_pop"));
}

#[test]
fn test_evaluate_gate() {
    let dir = trained_workspace();
    let mut df = synthetic_frame(200, 63);
    let input = dir.path().join("holdout.csv");
    fraudscope::pipeline::save_dataset(&mut df, &input).unwrap();
    let models = dir.path().join("models");

    fraudscope()
        .arg("-m")
        .arg(&models)
        .args(["evaluate", "-i"])
        .arg(&input)
        .args(["--as-of", AS_OF, "--min-accuracy", "0", "--min-roc-auc", "0"])
        .assert()
        .success();

    let metrics: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(models.join("metrics.json")).unwrap())
            .unwrap();
    assert_eq!(metrics["metadata"]["stage"], "evaluate");

    fraudscope()
        .arg("-m")
        .arg(&models)
        .args(["evaluate", "-i"])
        .arg(&input)
        .args(["--as-of", AS_OF, "--min-accuracy", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model rejected"));
}
