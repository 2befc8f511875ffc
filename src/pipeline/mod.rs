//! Pipeline module - encoding, alignment, scoring and training

pub mod aligner;
pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod label;
pub mod loader;
pub mod metrics;
pub mod normalizer;
pub mod schema;
pub mod scoring;
pub mod solver;
pub mod split;
pub mod training;
pub mod transaction;

pub use aligner::{align_batch, align_row, unknown_features};
pub use artifacts::ArtifactStore;
pub use classifier::FittedClassifier;
pub use encoder::{fit_encoder, EncodedFeatureVector, FeatureEncoder, FittedEncoding};
pub use error::{FraudError, FraudResult};
pub use frequency::{EncodedField, FrequencyEncodingTable, FrequencyTables};
pub use label::{count_labels, extract_labels, LabelCounts};
pub use loader::*;
pub use metrics::{DeploymentCriteria, EvaluationMetrics, GateOutcome};
pub use normalizer::FittedNormalizer;
pub use schema::TrainingFeatureSchema;
pub use scoring::{FraudScore, ScoringContext, ScoringEngine};
pub use solver::SolverConfig;
pub use training::{train_from_frame, train_model, TrainedModel, TrainingConfig, TrainingSummary};
pub use transaction::{fields, RawTransaction};
