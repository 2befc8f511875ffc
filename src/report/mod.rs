//! Report module - metric tables and metrics.json export

pub mod metrics_export;
pub mod summary;

pub use metrics_export::*;
pub use summary::*;
