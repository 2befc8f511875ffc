//! Training pipeline: labeled history to a fitted scoring context

use chrono::NaiveDate;
use faer::Mat;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::aligner::align_batch;
use super::classifier::FittedClassifier;
use super::encoder::{fit_encoder, today};
use super::error::{FraudError, FraudResult};
use super::label::{count_labels, extract_labels};
use super::loader::transactions_from_frame;
use super::metrics::EvaluationMetrics;
use super::normalizer::FittedNormalizer;
use super::scoring::{FraudScore, ScoringContext};
use super::solver::{fit_logistic_regression, SolverConfig};
use super::split::{take, train_test_split};
use super::transaction::{fields, RawTransaction};

/// Configuration for a training run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
    pub solver: SolverConfig,
    /// Date ages are computed against
    pub evaluation_date: NaiveDate,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            solver: SolverConfig::default(),
            evaluation_date: today(),
        }
    }
}

/// Facts about a finished training run, for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub features: usize,
    pub frauds: usize,
    pub iterations: usize,
    pub gradient_norm: f64,
    pub seed: u64,
    pub evaluation_date: NaiveDate,
}

/// Output of [`train_model`]
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub context: ScoringContext,
    pub metrics: EvaluationMetrics,
    pub summary: TrainingSummary,
}

fn select_rows(matrix: &Mat<f64>, rows: &[usize]) -> Mat<f64> {
    let mut selected = Mat::<f64>::zeros(rows.len(), matrix.ncols());
    for (dst, &src) in rows.iter().enumerate() {
        for j in 0..matrix.ncols() {
            selected[(dst, j)] = matrix[(src, j)];
        }
    }
    selected
}

/// Fit every artifact from labeled transactions and evaluate on a held-out
/// split.
///
/// Frequency tables and the one-hot column set come from all rows; the
/// normalizer and classifier see only the training partition.
pub fn train_model(
    transactions: &[RawTransaction],
    labels: &[u8],
    config: &TrainingConfig,
) -> FraudResult<TrainedModel> {
    if transactions.len() != labels.len() {
        return Err(FraudError::InvalidData(format!(
            "{} transactions but {} labels",
            transactions.len(),
            labels.len()
        )));
    }
    if transactions.len() < 2 {
        return Err(FraudError::InvalidData(format!(
            "need at least 2 labeled rows, got {}",
            transactions.len()
        )));
    }
    let counts = count_labels(labels);
    if counts.frauds == 0 || counts.legitimate == 0 {
        return Err(FraudError::InvalidData(
            "training labels contain a single class".to_string(),
        ));
    }

    info!(
        rows = transactions.len(),
        frauds = counts.frauds,
        fraud_rate = counts.fraud_rate(),
        "Starting training run"
    );

    let fitted = fit_encoder(transactions, labels, config.evaluation_date)?;
    let matrix = align_batch(&fitted.vectors, &fitted.schema);

    let split = train_test_split(transactions.len(), config.test_size, config.seed)?;
    let x_train = select_rows(&matrix, &split.train);
    let x_test = select_rows(&matrix, &split.test);
    let y_train = take(labels, &split.train);
    let y_test = take(labels, &split.test);

    let test_counts = count_labels(&y_test);
    if test_counts.frauds == 0 || test_counts.legitimate == 0 {
        warn!(
            test_rows = y_test.len(),
            "Held-out split contains a single class; ROC-AUC is undefined"
        );
    }

    let normalizer = FittedNormalizer::fit(&x_train)?;
    let x_train = normalizer.transform(&x_train)?;
    let result = fit_logistic_regression(&x_train, &y_train, &config.solver)?;
    let gradient_norm = result.gradient_norm;
    let classifier = FittedClassifier::from_solver(result);

    let probabilities = classifier.predict_proba_matrix(&normalizer.transform(&x_test)?)?;
    let predicted: Vec<u8> = probabilities
        .iter()
        .map(|&p| FraudScore::from_probability(p, &classifier).label)
        .collect();
    let metrics = EvaluationMetrics::compute(&y_test, &predicted, &probabilities);

    let summary = TrainingSummary {
        rows: transactions.len(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        features: fitted.schema.width(),
        frauds: counts.frauds,
        iterations: classifier.iterations(),
        gradient_norm,
        seed: config.seed,
        evaluation_date: config.evaluation_date,
    };

    info!(
        accuracy = metrics.accuracy,
        roc_auc = metrics.roc_auc,
        f1 = metrics.f1_score,
        "Training complete"
    );

    let context = ScoringContext::new(fitted.schema, fitted.tables, normalizer, classifier)?;
    Ok(TrainedModel {
        context,
        metrics,
        summary,
    })
}

/// Train from a dataset frame with an `is_fraud` label column
pub fn train_from_frame(df: &DataFrame, config: &TrainingConfig) -> FraudResult<TrainedModel> {
    let labels = extract_labels(df, fields::LABEL)?;
    let transactions = transactions_from_frame(df)?;
    train_model(&transactions, &labels, config)
}
