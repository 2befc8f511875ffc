//! Persisted artifacts in a models directory
//!
//! Each fitted component is one JSON file. Training overwrites the files;
//! loading fails with `ArtifactNotFound` if any required file is absent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::classifier::FittedClassifier;
use super::error::{FraudError, FraudResult};
use super::frequency::FrequencyTables;
use super::normalizer::FittedNormalizer;
use super::schema::TrainingFeatureSchema;
use super::scoring::ScoringContext;

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
pub const FREQUENCY_TABLES_FILE: &str = "frequency_tables.json";
pub const METRICS_FILE: &str = "metrics.json";

/// Artifacts a scoring context cannot be built without, with their names
const REQUIRED: [(&str, &str); 4] = [
    ("model", MODEL_FILE),
    ("scaler", SCALER_FILE),
    ("feature_names", FEATURE_NAMES_FILE),
    ("frequency_tables", FREQUENCY_TABLES_FILE),
];

/// A directory holding one model's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.path(METRICS_FILE)
    }

    /// Names of required artifacts not present on disk
    pub fn missing_artifacts(&self) -> Vec<&'static str> {
        REQUIRED
            .iter()
            .filter(|(_, file)| !self.path(file).is_file())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Write all four artifacts, creating the directory if needed
    pub fn save_context(&self, context: &ScoringContext) -> FraudResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| FraudError::Io {
            path: self.dir.clone(),
            source,
        })?;

        self.write_json("model", MODEL_FILE, context.classifier())?;
        self.write_json("scaler", SCALER_FILE, context.normalizer())?;
        self.write_json("feature_names", FEATURE_NAMES_FILE, context.schema())?;
        self.write_json("frequency_tables", FREQUENCY_TABLES_FILE, context.tables())?;

        info!(dir = %self.dir.display(), features = context.schema().width(), "Saved model artifacts");
        Ok(())
    }

    /// Load and cross-validate all four artifacts
    pub fn load_context(&self) -> FraudResult<ScoringContext> {
        let classifier: FittedClassifier = self.read_json("model", MODEL_FILE)?;
        let normalizer: FittedNormalizer = self.read_json("scaler", SCALER_FILE)?;
        let schema: TrainingFeatureSchema = self.read_json("feature_names", FEATURE_NAMES_FILE)?;
        let tables: FrequencyTables = self.read_json("frequency_tables", FREQUENCY_TABLES_FILE)?;

        // Serde bypasses the constructors, so their checks run here
        let classifier = classifier.validated()?;
        let normalizer =
            FittedNormalizer::from_parts(normalizer.means().to_vec(), normalizer.scales().to_vec())?;

        let context = ScoringContext::new(schema, tables, normalizer, classifier)?;
        debug!(dir = %self.dir.display(), features = context.schema().width(), "Loaded model artifacts");
        Ok(context)
    }

    /// Write any serializable value as pretty JSON
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        name: &'static str,
        file: &str,
        value: &T,
    ) -> FraudResult<()> {
        let path = self.path(file);
        let json = serde_json::to_string_pretty(value)
            .map_err(|source| FraudError::Serialization { name, source })?;
        fs::write(&path, json).map_err(|source| FraudError::Io { path, source })
    }

    /// Read a JSON artifact, reporting a missing file as `ArtifactNotFound`
    pub fn read_json<T: DeserializeOwned>(&self, name: &'static str, file: &str) -> FraudResult<T> {
        let path = self.path(file);
        if !path.is_file() {
            return Err(FraudError::ArtifactNotFound { name, path });
        }
        let contents = fs::read_to_string(&path).map_err(|source| FraudError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| FraudError::Serialization { name, source })
    }
}
