//! `evaluate` command: metrics on a labeled dataset and the deployment gate

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::pipeline::{
    check_required_columns, extract_labels, fields, load_dataset_with_progress,
    transactions_from_frame, ArtifactStore, DeploymentCriteria, EvaluationMetrics, GateOutcome,
    ScoringEngine,
};
use crate::report::{display_gate, display_metrics, export_metrics, RunMetadata};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_config,
    print_step_header,
};

/// Score a labeled dataset with the stored model, write metrics.json and fail
/// when the deployment criteria are not met
pub fn run_evaluate(
    input: &Path,
    models_dir: &Path,
    infer_schema_length: usize,
    criteria: &DeploymentCriteria,
    as_of: NaiveDate,
) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        models_dir,
        &[
            ("Min accuracy", format!("{:.2}", criteria.min_accuracy)),
            ("Min ROC-AUC", format!("{:.2}", criteria.min_roc_auc)),
            ("Evaluation date", as_of.to_string()),
        ],
    );

    let mut required = fields::REQUIRED.to_vec();
    required.push(fields::LABEL);
    check_required_columns(input, &required)?;

    let store = ArtifactStore::new(models_dir);
    let context = store
        .load_context()
        .with_context(|| format!("Failed to load model from {}", models_dir.display()))?;
    let engine = ScoringEngine::with_evaluation_date(Arc::new(context), as_of);

    print_step_header(1, "Score Labeled Data");
    let (df, _, _, _) = load_dataset_with_progress(input, infer_schema_length)?;
    let labels = extract_labels(&df, fields::LABEL)?;
    let transactions = transactions_from_frame(&df)?;
    let scores = engine.score_batch(&transactions)?;

    let predicted: Vec<u8> = scores.iter().map(|s| s.label).collect();
    let probabilities: Vec<f64> = scores.iter().map(|s| s.fraud_probability).collect();
    let metrics = EvaluationMetrics::compute(&labels, &predicted, &probabilities);

    print_step_header(2, "Deployment Gate");
    let spinner = create_spinner("Checking deployment criteria...");
    export_metrics(&metrics, RunMetadata::new(input, "evaluate"), &store.metrics_path())?;
    let outcome = criteria.check(&metrics);
    if outcome.is_approved() {
        finish_with_success(&spinner, "Deployment criteria met");
    } else {
        finish_with_warning(&spinner, "Deployment criteria not met");
    }

    display_metrics("EVALUATION METRICS", &metrics, Some(criteria));
    display_gate(&outcome);

    match outcome {
        GateOutcome::Approved => Ok(()),
        GateOutcome::Rejected { reasons } => {
            anyhow::bail!("Model rejected: {}", reasons.join("; "))
        }
    }
}
