//! Feature encoding: raw transactions to named numeric features
//!
//! The same steps run at training time (fit mode) and at scoring time:
//!
//! 1. Timestamp -> `hour`, `day_of_week` (Monday = 0), `month`
//! 2. Date of birth -> `age` in whole years at the evaluation date
//! 3. Transaction id is dropped
//! 4. `category` / `state` -> one-hot `cat_<value>` / `state_<value>` indicators
//! 5. `merchant` / `city` / `job` -> historical fraud rate (frequency encoding)
//!
//! Encoded vectors only carry the one-hot columns for the values they hold.
//! Reconciling them with the trained column set is the aligner's job.

use std::collections::BTreeSet;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use rayon::prelude::*;
use tracing::{debug, info};

use super::error::{FraudError, FraudResult};
use super::frequency::{EncodedField, FrequencyTables};
use super::schema::TrainingFeatureSchema;
use super::transaction::{fields, RawTransaction};

/// Numeric raw fields copied through unchanged, in feature order
pub const PASSTHROUGH_FEATURES: [&str; 6] = [
    fields::AMOUNT,
    fields::LATITUDE,
    fields::LONGITUDE,
    fields::CITY_POPULATION,
    fields::MERCHANT_LATITUDE,
    fields::MERCHANT_LONGITUDE,
];

/// Calendar features derived from the transaction timestamp
pub const CALENDAR_FEATURES: [&str; 3] = ["hour", "day_of_week", "month"];

pub const AGE_FEATURE: &str = "age";

/// Prefix of one-hot columns for the `category` field
pub const CATEGORY_PREFIX: &str = "cat";

/// Prefix of one-hot columns for the `state` field
pub const STATE_PREFIX: &str = "state";

/// Days per year used for the age computation
const DAYS_PER_YEAR: i64 = 365;

const TIMESTAMP_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const TIMESTAMP_EXPECTED: &str = "'YYYY-MM-DD HH:MM[:SS]' or 'DD-MM-YYYY HH:MM[:SS]'";

const DATE_OF_BIRTH_FORMATS: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

const DATE_OF_BIRTH_EXPECTED: &str = "'DD-MM-YYYY', 'DD/MM/YYYY' or 'YYYY-MM-DD'";

/// Name of the one-hot indicator column for a categorical value
pub fn one_hot_name(prefix: &str, value: &str) -> String {
    format!("{}_{}", prefix, value)
}

/// Ordered mapping from feature name to value for one transaction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodedFeatureVector {
    features: Vec<(String, f64)>,
}

impl EncodedFeatureVector {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            features: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, name: impl Into<String>, value: f64) {
        self.features.push((name.into(), value));
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|(feature, _)| feature == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.features.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for EncodedFeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().map(|(name, value)| (name.into(), value)).collect(),
        }
    }
}

/// Parse a transaction timestamp
pub fn parse_timestamp(raw: &str) -> FraudResult<NaiveDateTime> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| FraudError::Parse {
            field: fields::TIMESTAMP,
            value: raw.to_string(),
            expected: TIMESTAMP_EXPECTED,
        })
}

/// Parse a date of birth (day first)
pub fn parse_date_of_birth(raw: &str) -> FraudResult<NaiveDate> {
    let trimmed = raw.trim();
    DATE_OF_BIRTH_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| FraudError::Parse {
            field: fields::DATE_OF_BIRTH,
            value: raw.to_string(),
            expected: DATE_OF_BIRTH_EXPECTED,
        })
}

/// Whole years between birth and the evaluation date: `floor(days / 365)`
pub fn age_in_years(date_of_birth: NaiveDate, evaluation_date: NaiveDate) -> i64 {
    (evaluation_date - date_of_birth)
        .num_days()
        .div_euclid(DAYS_PER_YEAR)
}

/// Today's date in local time, the default evaluation date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Encodes raw transactions using persisted frequency tables.
///
/// The evaluation date pins the age feature, so the same transaction always
/// encodes to the same vector for a given encoder.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    tables: &'a FrequencyTables,
    evaluation_date: NaiveDate,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(tables: &'a FrequencyTables, evaluation_date: NaiveDate) -> Self {
        Self {
            tables,
            evaluation_date,
        }
    }

    pub fn evaluation_date(&self) -> NaiveDate {
        self.evaluation_date
    }

    /// Encode a single transaction
    pub fn encode(&self, tx: &RawTransaction) -> FraudResult<EncodedFeatureVector> {
        let timestamp = parse_timestamp(tx.timestamp())?;
        let date_of_birth = parse_date_of_birth(tx.date_of_birth())?;

        let mut vector = EncodedFeatureVector::with_capacity(
            PASSTHROUGH_FEATURES.len() + CALENDAR_FEATURES.len() + 3 + EncodedField::ALL.len(),
        );

        vector.push(fields::AMOUNT, tx.amount());
        vector.push(fields::LATITUDE, tx.latitude());
        vector.push(fields::LONGITUDE, tx.longitude());
        vector.push(fields::CITY_POPULATION, tx.city_population() as f64);
        vector.push(fields::MERCHANT_LATITUDE, tx.merchant_latitude());
        vector.push(fields::MERCHANT_LONGITUDE, tx.merchant_longitude());

        vector.push("hour", timestamp.hour() as f64);
        vector.push("day_of_week", timestamp.weekday().num_days_from_monday() as f64);
        vector.push("month", timestamp.month() as f64);

        vector.push(
            AGE_FEATURE,
            age_in_years(date_of_birth, self.evaluation_date) as f64,
        );

        // Indicators are stored as 0/1, never as booleans
        vector.push(one_hot_name(CATEGORY_PREFIX, tx.category()), 1.0);
        vector.push(one_hot_name(STATE_PREFIX, tx.state()), 1.0);

        for field in EncodedField::ALL {
            vector.push(field.feature_name(), self.tables.encode(field, tx));
        }

        Ok(vector)
    }

    /// Encode many transactions in parallel.
    ///
    /// Fails with the first error in row order.
    pub fn encode_batch(&self, transactions: &[RawTransaction]) -> FraudResult<Vec<EncodedFeatureVector>> {
        let results: Vec<FraudResult<EncodedFeatureVector>> = transactions
            .par_iter()
            .map(|tx| self.encode(tx))
            .collect();

        let vectors = results.into_iter().collect::<FraudResult<Vec<_>>>()?;
        debug!(rows = vectors.len(), "Encoded transaction batch");
        Ok(vectors)
    }
}

/// Everything produced by fitting the encoder on labeled history
#[derive(Debug, Clone)]
pub struct FittedEncoding {
    pub tables: FrequencyTables,
    pub schema: TrainingFeatureSchema,
    pub vectors: Vec<EncodedFeatureVector>,
}

/// Fit the encoder on labeled transactions (fit mode).
///
/// Builds the frequency tables from the labels, encodes every row with them,
/// and derives the training schema from the observed category and state
/// values.
pub fn fit_encoder(
    transactions: &[RawTransaction],
    labels: &[u8],
    evaluation_date: NaiveDate,
) -> FraudResult<FittedEncoding> {
    let tables = FrequencyTables::fit(transactions, labels)?;

    let categories: BTreeSet<&str> = transactions.iter().map(|tx| tx.category()).collect();
    let states: BTreeSet<&str> = transactions.iter().map(|tx| tx.state()).collect();

    let mut names: Vec<String> = PASSTHROUGH_FEATURES.iter().map(|s| s.to_string()).collect();
    names.extend(CALENDAR_FEATURES.iter().map(|s| s.to_string()));
    names.push(AGE_FEATURE.to_string());
    names.extend(categories.iter().map(|v| one_hot_name(CATEGORY_PREFIX, v)));
    names.extend(states.iter().map(|v| one_hot_name(STATE_PREFIX, v)));
    names.extend(EncodedField::ALL.iter().map(|f| f.feature_name().to_string()));

    let schema = TrainingFeatureSchema::new(names)?;
    let vectors = FeatureEncoder::new(&tables, evaluation_date).encode_batch(transactions)?;

    info!(
        rows = vectors.len(),
        features = schema.width(),
        categories = categories.len(),
        states = states.len(),
        "Fitted feature encoder"
    );

    Ok(FittedEncoding {
        tables,
        schema,
        vectors,
    })
}
