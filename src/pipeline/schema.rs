//! The ordered feature list a model was trained on

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{FraudError, FraudResult};

/// Ordered, duplicate-free list of feature names produced during training.
///
/// Persisted as a plain JSON array of names. This is the only definition of
/// the classifier's input width and column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TrainingFeatureSchema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl TrainingFeatureSchema {
    /// Build a schema, rejecting duplicate or empty names.
    pub fn new(names: Vec<String>) -> FraudResult<Self> {
        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(FraudError::InvalidData(format!(
                    "feature name at position {} is empty",
                    idx
                )));
            }
            if positions.insert(name.clone(), idx).is_some() {
                return Err(FraudError::InvalidData(format!(
                    "duplicate feature name '{}' in schema",
                    name
                )));
            }
        }
        Ok(Self { names, positions })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of features (matrix width)
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Column index of a feature, if it is part of the schema
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }
}

impl TryFrom<Vec<String>> for TrainingFeatureSchema {
    type Error = FraudError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<TrainingFeatureSchema> for Vec<String> {
    fn from(schema: TrainingFeatureSchema) -> Self {
        schema.names
    }
}
