//! `score` command: batch scoring of a dataset file

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::pipeline::{
    check_required_columns, fields, load_dataset_with_progress, save_dataset, ArtifactStore,
    ScoringEngine,
};
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_step_time,
};

/// Score every row of `input` and write it to `output` with prediction columns
pub fn run_score(
    input: &Path,
    output: &Path,
    models_dir: &Path,
    infer_schema_length: usize,
    as_of: NaiveDate,
) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        models_dir,
        &[
            ("Output", output.display().to_string()),
            ("Evaluation date", as_of.to_string()),
        ],
    );

    check_required_columns(input, &fields::REQUIRED)?;

    print_step_header(1, "Load Model");
    let step_start = Instant::now();
    let context = ArtifactStore::new(models_dir)
        .load_context()
        .with_context(|| format!("Failed to load model from {}", models_dir.display()))?;
    print_info(&format!("{} features in schema", context.schema().width()));
    let engine = ScoringEngine::with_evaluation_date(Arc::new(context), as_of);
    print_step_time(step_start.elapsed());

    print_step_header(2, "Score Batch");
    let step_start = Instant::now();
    let (df, rows, _, _) = load_dataset_with_progress(input, infer_schema_length)?;
    let spinner = create_spinner(&format!("Scoring {} rows...", rows));
    let mut scored = engine
        .score_frame(&df)
        .with_context(|| format!("Scoring failed on {}", input.display()))?;
    finish_with_success(&spinner, &format!("Scored {} rows", rows));
    print_step_time(step_start.elapsed());

    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    save_dataset(&mut scored, output)?;
    finish_with_success(&spinner, &format!("Saved to {}", output.display()));
    print_step_time(step_start.elapsed());

    print_completion("Scoring complete!");
    Ok(())
}
