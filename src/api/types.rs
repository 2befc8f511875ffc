//! Request/response types for the prediction boundary

use serde::{Deserialize, Serialize};

use crate::pipeline::{FraudScore, RawTransaction};

/// Incoming prediction request: one raw transaction
pub type PredictionRequest = RawTransaction;

pub const FRAUD_LABEL: &str = "Fraude";
pub const LEGITIMATE_LABEL: &str = "Não Fraude";

/// Successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub fraud_probability: f64,
    pub confidence: f64,
    pub classification: String,
}

impl From<FraudScore> for PredictionResponse {
    fn from(score: FraudScore) -> Self {
        let classification = if score.is_fraud() {
            FRAUD_LABEL
        } else {
            LEGITIMATE_LABEL
        };
        Self {
            fraud_probability: score.fraud_probability,
            confidence: score.confidence,
            classification: classification.to_string(),
        }
    }
}

/// Error returned across the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP-style status: 422 for invalid input, 500 for scoring failures
    pub status: u16,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: 422,
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(reason: impl std::fmt::Display) -> Self {
        Self {
            status: 500,
            code: "INTERNAL_ERROR".to_string(),
            message: format!("prediction failed: {}", reason),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
