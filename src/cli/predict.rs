//! `predict` command: score one JSON transaction

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::api::PredictionService;
use crate::pipeline::{ArtifactStore, ScoringEngine};

/// Read a request from a file or stdin, score it and print the JSON response.
///
/// Validation and scoring failures print the error body and return an error.
pub fn run_predict(models_dir: &Path, request: Option<&Path>, as_of: NaiveDate) -> Result<()> {
    let body = match request {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };

    let context = ArtifactStore::new(models_dir)
        .load_context()
        .with_context(|| format!("Failed to load model from {}", models_dir.display()))?;
    let service =
        PredictionService::new(ScoringEngine::with_evaluation_date(Arc::new(context), as_of));

    match service.handle_json(&body) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error)?);
            Err(error.into())
        }
    }
}
