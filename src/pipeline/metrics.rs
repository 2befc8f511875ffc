//! Held-out evaluation metrics and the deployment gate

use serde::{Deserialize, Serialize};

/// Confusion matrix for binary classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// True positives
    pub tp: usize,
    /// True negatives
    pub tn: usize,
    /// False positives
    pub fp: usize,
    /// False negatives
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Tally predicted labels against actual labels
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> Self {
        let mut matrix = Self::default();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            match (a == 1, p == 1) {
                (true, true) => matrix.tp += 1,
                (false, false) => matrix.tn += 1,
                (false, true) => matrix.fp += 1,
                (true, false) => matrix.fn_ += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// Zero when the denominator is zero
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// ROC AUC from scores via the Mann-Whitney U statistic.
///
/// Tied scores receive their average rank. Returns 0.5 when only one class is
/// present, since the curve is undefined.
pub fn roc_auc(actual: &[u8], scores: &[f64]) -> f64 {
    let mut pairs: Vec<(f64, u8)> = scores
        .iter()
        .copied()
        .zip(actual.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total_pos = pairs.iter().filter(|(_, y)| *y == 1).count() as f64;
    let total_neg = pairs.len() as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return 0.5;
    }

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && pairs[j].0 == pairs[i].0 {
            j += 1;
        }

        // Ranks i+1..=j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives = pairs[i..j].iter().filter(|(_, y)| *y == 1).count() as f64;
        rank_sum_pos += avg_rank * positives;
        i = j;
    }

    let u = rank_sum_pos - total_pos * (total_pos + 1.0) / 2.0;
    u / (total_pos * total_neg)
}

/// Metrics computed on a labeled, scored set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub samples: usize,
}

impl EvaluationMetrics {
    /// Compute every metric from actual labels, predicted labels and fraud
    /// probabilities
    pub fn compute(actual: &[u8], predicted: &[u8], probabilities: &[f64]) -> Self {
        let confusion_matrix = ConfusionMatrix::from_labels(actual, predicted);
        Self {
            accuracy: confusion_matrix.accuracy(),
            roc_auc: roc_auc(actual, probabilities),
            precision: confusion_matrix.precision(),
            recall: confusion_matrix.recall(),
            f1_score: confusion_matrix.f1(),
            confusion_matrix,
            samples: actual.len(),
        }
    }
}

/// Minimum metrics a model must beat before it is promoted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCriteria {
    pub min_accuracy: f64,
    pub min_roc_auc: f64,
}

impl Default for DeploymentCriteria {
    fn default() -> Self {
        Self {
            min_accuracy: 0.90,
            min_roc_auc: 0.75,
        }
    }
}

/// Result of checking metrics against [`DeploymentCriteria`]
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Approved,
    Rejected { reasons: Vec<String> },
}

impl GateOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, GateOutcome::Approved)
    }
}

impl DeploymentCriteria {
    /// Both thresholds are strict: a metric equal to its minimum fails
    pub fn check(&self, metrics: &EvaluationMetrics) -> GateOutcome {
        let mut reasons = Vec::new();
        if !(metrics.accuracy > self.min_accuracy) {
            reasons.push(format!(
                "accuracy {:.4} is not above {:.4}",
                metrics.accuracy, self.min_accuracy
            ));
        }
        if !(metrics.roc_auc > self.min_roc_auc) {
            reasons.push(format!(
                "ROC-AUC {:.4} is not above {:.4}",
                metrics.roc_auc, self.min_roc_auc
            ));
        }

        if reasons.is_empty() {
            GateOutcome::Approved
        } else {
            GateOutcome::Rejected { reasons }
        }
    }
}
