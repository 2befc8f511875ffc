//! Prediction request handling

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use super::types::{ApiError, PredictionRequest, PredictionResponse};
use crate::pipeline::{ScoringContext, ScoringEngine};

/// Stateless request handler over a shared scoring engine.
///
/// Cloning is cheap; clones share the same artifacts.
#[derive(Debug, Clone)]
pub struct PredictionService {
    engine: ScoringEngine,
}

impl PredictionService {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn from_context(context: Arc<ScoringContext>) -> Self {
        Self::new(ScoringEngine::new(context))
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Deserialize and score a JSON request body
    pub fn handle_json(&self, body: &str) -> Result<PredictionResponse, ApiError> {
        let request: PredictionRequest = serde_json::from_str(body).map_err(|e| {
            warn!(error = %e, "Rejected prediction request");
            ApiError::validation("invalid transaction payload").with_details(e.to_string())
        })?;
        self.handle(&request)
    }

    /// Score an already validated request
    pub fn handle(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        let start = Instant::now();
        let score = self.engine.score(request).map_err(|e| {
            error!(error = %e, "Prediction failed");
            ApiError::internal(&e)
        })?;

        debug!(
            transaction_id = request.transaction_id().unwrap_or("-"),
            fraud_probability = score.fraud_probability,
            latency_us = start.elapsed().as_micros() as u64,
            "Scored request"
        );
        Ok(score.into())
    }
}
