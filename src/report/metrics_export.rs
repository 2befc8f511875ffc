//! metrics.json export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::pipeline::metrics::{ConfusionMatrix, EvaluationMetrics};

/// Metadata about the run that produced the metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub fraudscope_version: String,
    /// Dataset the metrics were computed on
    pub input_file: String,
    /// `train` (held-out split) or `evaluate` (full labeled set)
    pub stage: String,
}

impl RunMetadata {
    pub fn new(input_file: &Path, stage: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            fraudscope_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.display().to_string(),
            stage: stage.to_string(),
        }
    }
}

/// Contents of metrics.json: the five headline metrics at the top level,
/// followed by supporting detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsExport {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub samples: usize,
    pub confusion_matrix: ConfusionMatrix,
    pub metadata: RunMetadata,
}

impl MetricsExport {
    pub fn new(metrics: &EvaluationMetrics, metadata: RunMetadata) -> Self {
        Self {
            accuracy: metrics.accuracy,
            roc_auc: metrics.roc_auc,
            precision: metrics.precision,
            recall: metrics.recall,
            f1_score: metrics.f1_score,
            samples: metrics.samples,
            confusion_matrix: metrics.confusion_matrix,
            metadata,
        }
    }
}

/// Write metrics.json
pub fn export_metrics(
    metrics: &EvaluationMetrics,
    metadata: RunMetadata,
    output_path: &Path,
) -> Result<()> {
    let export = MetricsExport::new(metrics, metadata);
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize metrics to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write metrics to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_has_top_level_metric_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let metrics = EvaluationMetrics::compute(&[0, 1], &[0, 1], &[0.2, 0.9]);

        export_metrics(&metrics, RunMetadata::new(Path::new("data.csv"), "train"), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for key in ["accuracy", "roc_auc", "precision", "recall", "f1_score"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["metadata"]["stage"], "train");
    }
}
