//! CLI module - argument parsing and command runners

pub mod args;
pub mod evaluate;
pub mod predict;
pub mod score;
pub mod train;

pub use args::{scored_output_path, Cli, Commands, DatasetArgs};
pub use evaluate::run_evaluate;
pub use predict::run_predict;
pub use score::run_score;
pub use train::run_train;
