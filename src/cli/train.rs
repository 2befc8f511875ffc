//! `train` command: fit and persist a model from labeled history

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::pipeline::{
    check_required_columns, fields, load_dataset_with_progress, train_from_frame, ArtifactStore,
    TrainingConfig,
};
use crate::report::{display_training_summary, export_metrics, RunMetadata};
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_step_header, print_step_time, print_success,
};

/// Run the full training flow and write artifacts to `models_dir`
pub fn run_train(
    input: &Path,
    models_dir: &Path,
    infer_schema_length: usize,
    config: &TrainingConfig,
) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        models_dir,
        &[
            ("Seed", config.seed.to_string()),
            ("Test size", format!("{:.2}", config.test_size)),
            ("Max iterations", config.solver.max_iter.to_string()),
            ("L2 penalty", config.solver.l2_penalty.to_string()),
            ("Tolerance", format!("{:e}", config.solver.tolerance)),
            ("Evaluation date", config.evaluation_date.to_string()),
        ],
    );

    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let mut required = fields::REQUIRED.to_vec();
    required.push(fields::LABEL);
    check_required_columns(input, &required)?;
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, infer_schema_length)?;
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    print_step_time(step_start.elapsed());

    print_step_header(2, "Fit Model");
    let step_start = Instant::now();
    let spinner = create_spinner("Encoding features and fitting logistic regression...");
    let trained = train_from_frame(&df, config)
        .with_context(|| format!("Training failed on {}", input.display()))?;
    finish_with_success(
        &spinner,
        &format!(
            "Converged in {} iterations ({} features)",
            trained.summary.iterations, trained.summary.features
        ),
    );
    print_step_time(step_start.elapsed());

    print_step_header(3, "Save Artifacts");
    let step_start = Instant::now();
    let store = ArtifactStore::new(models_dir);
    store
        .save_context(&trained.context)
        .with_context(|| format!("Failed to save artifacts to {}", models_dir.display()))?;
    export_metrics(
        &trained.metrics,
        RunMetadata::new(input, "train"),
        &store.metrics_path(),
    )?;
    print_success(&format!("Artifacts written to {}", models_dir.display()));
    print_step_time(step_start.elapsed());

    display_training_summary(&trained.summary, &trained.metrics);
    print_completion("Training complete!");
    Ok(())
}
