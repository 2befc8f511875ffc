//! fraudscope: Transaction Fraud Scoring CLI
//!
//! Trains a fraud model from labeled transactions and scores new
//! transactions, one JSON request at a time or as a whole dataset.

use anyhow::Result;
use clap::Parser;

use fraudscope::cli::{
    run_evaluate, run_predict, run_score, run_train, scored_output_path, Cli, Commands,
};
use fraudscope::pipeline::encoder::today;
use fraudscope::pipeline::{DeploymentCriteria, SolverConfig, TrainingConfig};
use fraudscope::utils::init_tracing;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Train {
            dataset,
            seed,
            test_size,
            max_iter,
            l2_penalty,
            tolerance,
            as_of,
        } => {
            let config = TrainingConfig {
                test_size,
                seed,
                solver: SolverConfig {
                    max_iter,
                    tolerance,
                    l2_penalty,
                },
                evaluation_date: as_of.unwrap_or_else(today),
            };
            run_train(
                &dataset.input,
                &cli.models_dir,
                dataset.infer_schema_length,
                &config,
            )
        }
        Commands::Predict { request, as_of } => run_predict(
            &cli.models_dir,
            request.as_deref(),
            as_of.unwrap_or_else(today),
        ),
        Commands::Score {
            dataset,
            output,
            as_of,
        } => {
            let output = output.unwrap_or_else(|| scored_output_path(&dataset.input));
            run_score(
                &dataset.input,
                &output,
                &cli.models_dir,
                dataset.infer_schema_length,
                as_of.unwrap_or_else(today),
            )
        }
        Commands::Evaluate {
            dataset,
            min_accuracy,
            min_roc_auc,
            as_of,
        } => run_evaluate(
            &dataset.input,
            &cli.models_dir,
            dataset.infer_schema_length,
            &DeploymentCriteria {
                min_accuracy,
                min_roc_auc,
            },
            as_of.unwrap_or_else(today),
        ),
    }
}
