//! Scoring engine: raw transactions to fraud probabilities
//!
//! A [`ScoringContext`] bundles the four fitted artifacts. It is immutable
//! after construction and shared between concurrent requests through an
//! `Arc`; scoring never takes a lock.

use std::sync::Arc;

use chrono::NaiveDate;
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::aligner::{align_batch, align_row};
use super::classifier::FittedClassifier;
use super::encoder::{today, FeatureEncoder};
use super::error::{FraudError, FraudResult};
use super::frequency::FrequencyTables;
use super::loader::transactions_from_frame;
use super::normalizer::FittedNormalizer;
use super::schema::TrainingFeatureSchema;
use super::transaction::RawTransaction;

/// Columns appended by batch scoring
pub mod output_columns {
    pub const PREDICTED_LABEL: &str = "is_fraud_predicted";
    pub const FRAUD_PROBABILITY: &str = "fraud_probability";
    pub const NO_FRAUD_PROBABILITY: &str = "no_fraud_probability";
    pub const CONFIDENCE: &str = "confidence";

    pub const ALL: [&str; 4] = [
        PREDICTED_LABEL,
        FRAUD_PROBABILITY,
        NO_FRAUD_PROBABILITY,
        CONFIDENCE,
    ];
}

/// The fitted artifacts needed to score, validated against each other
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringContext {
    schema: TrainingFeatureSchema,
    tables: FrequencyTables,
    normalizer: FittedNormalizer,
    classifier: FittedClassifier,
}

impl ScoringContext {
    /// Bundle artifacts, checking that normalizer and classifier widths match
    /// the schema.
    pub fn new(
        schema: TrainingFeatureSchema,
        tables: FrequencyTables,
        normalizer: FittedNormalizer,
        classifier: FittedClassifier,
    ) -> FraudResult<Self> {
        if normalizer.width() != schema.width() {
            return Err(FraudError::DimensionMismatch {
                component: "normalizer",
                expected: schema.width(),
                actual: normalizer.width(),
            });
        }
        if classifier.width() != schema.width() {
            return Err(FraudError::DimensionMismatch {
                component: "classifier",
                expected: schema.width(),
                actual: classifier.width(),
            });
        }
        Ok(Self {
            schema,
            tables,
            normalizer,
            classifier,
        })
    }

    pub fn schema(&self) -> &TrainingFeatureSchema {
        &self.schema
    }

    pub fn tables(&self) -> &FrequencyTables {
        &self.tables
    }

    pub fn normalizer(&self) -> &FittedNormalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &FittedClassifier {
        &self.classifier
    }
}

/// Prediction for a single transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FraudScore {
    /// 1 when `fraud_probability > threshold`, else 0
    pub label: u8,
    pub fraud_probability: f64,
    /// `max(p, 1 - p)`, never below 0.5
    pub confidence: f64,
}

impl FraudScore {
    pub fn from_probability(probability: f64, classifier: &FittedClassifier) -> Self {
        Self {
            label: classifier.is_fraud(probability) as u8,
            fraud_probability: probability,
            confidence: probability.max(1.0 - probability),
        }
    }

    pub fn no_fraud_probability(&self) -> f64 {
        1.0 - self.fraud_probability
    }

    pub fn is_fraud(&self) -> bool {
        self.label == 1
    }
}

/// Scores transactions against a shared [`ScoringContext`]
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    context: Arc<ScoringContext>,
    evaluation_date: NaiveDate,
}

impl ScoringEngine {
    /// Engine that computes ages as of today
    pub fn new(context: Arc<ScoringContext>) -> Self {
        Self::with_evaluation_date(context, today())
    }

    pub fn with_evaluation_date(context: Arc<ScoringContext>, evaluation_date: NaiveDate) -> Self {
        Self {
            context,
            evaluation_date,
        }
    }

    pub fn context(&self) -> &Arc<ScoringContext> {
        &self.context
    }

    pub fn evaluation_date(&self) -> NaiveDate {
        self.evaluation_date
    }

    fn encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(&self.context.tables, self.evaluation_date)
    }

    /// Score one transaction
    pub fn score(&self, tx: &RawTransaction) -> FraudResult<FraudScore> {
        let vector = self.encoder().encode(tx)?;
        let aligned = align_row(&vector, &self.context.schema);
        let normalized = self.context.normalizer.transform_row(&aligned)?;
        let probability = self.context.classifier.predict_proba(&normalized)?;
        Ok(FraudScore::from_probability(probability, &self.context.classifier))
    }

    /// Score many transactions; results follow input order
    pub fn score_batch(&self, transactions: &[RawTransaction]) -> FraudResult<Vec<FraudScore>> {
        let vectors = self.encoder().encode_batch(transactions)?;
        let aligned = align_batch(&vectors, &self.context.schema);
        self.score_matrix(&aligned)
    }

    /// Score an already aligned (not yet normalized) feature matrix
    pub fn score_matrix(&self, aligned: &Mat<f64>) -> FraudResult<Vec<FraudScore>> {
        let normalized = self.context.normalizer.transform(aligned)?;
        let classifier = &self.context.classifier;
        if normalized.ncols() != classifier.width() {
            return Err(FraudError::DimensionMismatch {
                component: "classifier",
                expected: classifier.width(),
                actual: normalized.ncols(),
            });
        }

        let scores: Vec<FraudScore> = (0..normalized.nrows())
            .into_par_iter()
            .map(|i| {
                let z = (0..normalized.ncols())
                    .map(|j| normalized[(i, j)] * classifier.weights()[j])
                    .sum::<f64>()
                    + classifier.bias();
                FraudScore::from_probability(super::solver::sigmoid(z), classifier)
            })
            .collect();

        debug!(rows = scores.len(), "Scored feature matrix");
        Ok(scores)
    }

    /// Score every row of a frame and return it with the result columns
    /// appended. Original columns are left untouched.
    pub fn score_frame(&self, df: &DataFrame) -> FraudResult<DataFrame> {
        if let Some(existing) = output_columns::ALL
            .iter()
            .find(|name| df.column(name).is_ok())
        {
            return Err(FraudError::InvalidData(format!(
                "input already has a '{}' column",
                existing
            )));
        }

        let transactions = transactions_from_frame(df)?;
        let scores = self.score_batch(&transactions)?;

        let labels: Vec<i32> = scores.iter().map(|s| s.label as i32).collect();
        let fraud: Vec<f64> = scores.iter().map(|s| s.fraud_probability).collect();
        let no_fraud: Vec<f64> = scores.iter().map(|s| s.no_fraud_probability()).collect();
        let confidence: Vec<f64> = scores.iter().map(|s| s.confidence).collect();

        let mut output = df.clone();
        output.with_column(Column::new(output_columns::PREDICTED_LABEL.into(), labels))?;
        output.with_column(Column::new(output_columns::FRAUD_PROBABILITY.into(), fraud))?;
        output.with_column(Column::new(output_columns::NO_FRAUD_PROBABILITY.into(), no_fraud))?;
        output.with_column(Column::new(output_columns::CONFIDENCE.into(), confidence))?;
        Ok(output)
    }
}
