//! fraudscope: Transaction Fraud Scoring Library
//!
//! Encodes raw card transactions into numeric features, aligns them to the
//! feature schema a model was trained on, and scores them with a fitted
//! logistic regression. The training pipeline produces the artifacts the
//! scoring engine loads.

pub mod api;
pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
