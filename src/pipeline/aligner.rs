//! Align encoded vectors to the trained feature schema
//!
//! Scoring-time encodings only contain the one-hot columns for values that
//! actually occur. Alignment lays every vector out in schema order, fills
//! columns the vector lacks with 0.0 and drops columns the schema does not
//! know about.

use std::collections::BTreeMap;

use faer::Mat;
use tracing::{debug, enabled, Level};

use super::encoder::EncodedFeatureVector;
use super::schema::TrainingFeatureSchema;

/// Lay one vector out in schema order
pub fn align_row(vector: &EncodedFeatureVector, schema: &TrainingFeatureSchema) -> Vec<f64> {
    let mut row = vec![0.0; schema.width()];
    for (name, value) in vector.iter() {
        if let Some(idx) = schema.position(name) {
            row[idx] = value;
        }
    }
    row
}

/// Build the `rows x width` feature matrix for a batch
pub fn align_batch(vectors: &[EncodedFeatureVector], schema: &TrainingFeatureSchema) -> Mat<f64> {
    let mut matrix = Mat::<f64>::zeros(vectors.len(), schema.width());
    for (i, vector) in vectors.iter().enumerate() {
        for (name, value) in vector.iter() {
            if let Some(j) = schema.position(name) {
                matrix[(i, j)] = value;
            }
        }
    }

    if enabled!(Level::DEBUG) {
        let dropped = unknown_features(vectors, schema);
        if !dropped.is_empty() {
            debug!(
                columns = dropped.len(),
                names = ?dropped.keys().collect::<Vec<_>>(),
                "Dropped features not present in training schema"
            );
        }
    }

    matrix
}

/// Features present in the batch but absent from the schema, with the number
/// of rows each appeared in
pub fn unknown_features(
    vectors: &[EncodedFeatureVector],
    schema: &TrainingFeatureSchema,
) -> BTreeMap<String, usize> {
    let mut unknown = BTreeMap::new();
    for vector in vectors {
        for name in vector.names() {
            if !schema.contains(name) {
                *unknown.entry(name.to_string()).or_insert(0) += 1;
            }
        }
    }
    unknown
}
