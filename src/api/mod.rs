//! Prediction boundary
//!
//! Validates incoming JSON transactions, scores them and maps results and
//! failures to response types. Transport (HTTP, queues) is left to the caller.

mod handler;
mod types;

pub use handler::PredictionService;
pub use types::*;
