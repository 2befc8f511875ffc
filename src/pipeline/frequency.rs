//! Frequency (target) encoding for high-cardinality categorical fields
//!
//! Merchant, city and job values are replaced by the historical fraud rate
//! observed for that value. Values never seen during training fall back to
//! the dataset-wide fraud rate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{FraudError, FraudResult};
use super::transaction::{fields, RawTransaction};

/// Categorical fields that are frequency-encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodedField {
    Merchant,
    City,
    Job,
}

impl EncodedField {
    /// All encoded fields, in feature order
    pub const ALL: [EncodedField; 3] = [EncodedField::Merchant, EncodedField::City, EncodedField::Job];

    /// Raw column the value is read from
    pub fn raw_field(&self) -> &'static str {
        match self {
            EncodedField::Merchant => fields::MERCHANT,
            EncodedField::City => fields::CITY,
            EncodedField::Job => fields::JOB,
        }
    }

    /// Name of the encoded feature column
    pub fn feature_name(&self) -> &'static str {
        match self {
            EncodedField::Merchant => "merchant_target_enc",
            EncodedField::City => "city_target_enc",
            EncodedField::Job => "job_target_enc",
        }
    }

    /// Read this field's raw value from a transaction
    pub fn value_of<'a>(&self, tx: &'a RawTransaction) -> &'a str {
        match self {
            EncodedField::Merchant => tx.merchant(),
            EncodedField::City => tx.city(),
            EncodedField::Job => tx.job(),
        }
    }
}

impl std::fmt::Display for EncodedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw_field())
    }
}

/// Mean fraud rate per raw value for one categorical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEncodingTable {
    /// Historical fraud rate for each observed value
    rates: BTreeMap<String, f64>,
    /// Number of training rows each value was observed in
    counts: BTreeMap<String, u64>,
    /// Dataset-wide fraud rate, used for unseen values
    global_mean: f64,
}

impl FrequencyEncodingTable {
    /// Fit a table from `(value, label)` pairs.
    ///
    /// Labels must be 0 or 1. An empty input is rejected because the global
    /// fallback mean would be undefined.
    pub fn fit<'a, I>(pairs: I) -> FraudResult<Self>
    where
        I: IntoIterator<Item = (&'a str, u8)>,
    {
        let mut totals: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        let mut total_rows = 0u64;
        let mut total_frauds = 0u64;

        for (value, label) in pairs {
            let entry = totals.entry(value.to_string()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += label as u64;
            total_rows += 1;
            total_frauds += label as u64;
        }

        if total_rows == 0 {
            return Err(FraudError::InvalidData(
                "cannot fit a frequency table on zero rows".to_string(),
            ));
        }

        let mut rates = BTreeMap::new();
        let mut counts = BTreeMap::new();
        for (value, (count, frauds)) in totals {
            rates.insert(value.clone(), frauds as f64 / count as f64);
            counts.insert(value, count);
        }

        Ok(Self {
            rates,
            counts,
            global_mean: total_frauds as f64 / total_rows as f64,
        })
    }

    /// Encoded value for a raw category value, falling back to the global mean
    pub fn encode(&self, value: &str) -> f64 {
        self.rates.get(value).copied().unwrap_or(self.global_mean)
    }

    /// Whether the value was observed during training
    pub fn contains(&self, value: &str) -> bool {
        self.rates.contains_key(value)
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    /// Number of distinct values observed during training
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Training row count for a value (0 when unseen)
    pub fn count(&self, value: &str) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }
}

/// The persisted frequency-encoding artifact: one table per encoded field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTables {
    pub merchant: FrequencyEncodingTable,
    pub city: FrequencyEncodingTable,
    pub job: FrequencyEncodingTable,
}

impl FrequencyTables {
    /// Fit all three tables from labeled transactions.
    pub fn fit(transactions: &[RawTransaction], labels: &[u8]) -> FraudResult<Self> {
        if transactions.len() != labels.len() {
            return Err(FraudError::InvalidData(format!(
                "{} transactions but {} labels",
                transactions.len(),
                labels.len()
            )));
        }

        let fit_field = |field: EncodedField| {
            FrequencyEncodingTable::fit(
                transactions
                    .iter()
                    .zip(labels.iter())
                    .map(|(tx, &label)| (field.value_of(tx), label)),
            )
        };

        Ok(Self {
            merchant: fit_field(EncodedField::Merchant)?,
            city: fit_field(EncodedField::City)?,
            job: fit_field(EncodedField::Job)?,
        })
    }

    pub fn table(&self, field: EncodedField) -> &FrequencyEncodingTable {
        match field {
            EncodedField::Merchant => &self.merchant,
            EncodedField::City => &self.city,
            EncodedField::Job => &self.job,
        }
    }

    /// Encode a transaction's field using the matching table
    pub fn encode(&self, field: EncodedField, tx: &RawTransaction) -> f64 {
        self.table(field).encode(field.value_of(tx))
    }
}
