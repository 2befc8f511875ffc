//! Raw transaction records as they arrive from a request or a dataset row

use serde::{Deserialize, Serialize};

/// Raw column names shared by datasets, requests and error messages
pub mod fields {
    pub const TIMESTAMP: &str = "trans_date_trans_time";
    pub const MERCHANT: &str = "merchant";
    pub const CATEGORY: &str = "category";
    pub const AMOUNT: &str = "amt";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "long";
    pub const CITY_POPULATION: &str = "city_pop";
    pub const JOB: &str = "job";
    pub const DATE_OF_BIRTH: &str = "dob";
    pub const TRANSACTION_ID: &str = "trans_num";
    pub const MERCHANT_LATITUDE: &str = "merch_lat";
    pub const MERCHANT_LONGITUDE: &str = "merch_long";
    pub const LABEL: &str = "is_fraud";

    /// Every field a record must carry, in dataset order
    pub const REQUIRED: [&str; 13] = [
        TIMESTAMP,
        MERCHANT,
        CATEGORY,
        AMOUNT,
        CITY,
        STATE,
        LATITUDE,
        LONGITUDE,
        CITY_POPULATION,
        JOB,
        DATE_OF_BIRTH,
        MERCHANT_LATITUDE,
        MERCHANT_LONGITUDE,
    ];
}

/// A single transaction before feature encoding.
///
/// Fields are read-only once the record exists. Deserializing from JSON
/// rejects records with a missing or wrongly typed required field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    trans_date_trans_time: String,
    merchant: String,
    category: String,
    amt: f64,
    city: String,
    state: String,
    lat: f64,
    long: f64,
    city_pop: i64,
    job: String,
    dob: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trans_num: Option<String>,
    merch_lat: f64,
    merch_long: f64,
}

impl RawTransaction {
    pub fn builder() -> RawTransactionBuilder {
        RawTransactionBuilder::default()
    }

    pub fn timestamp(&self) -> &str {
        &self.trans_date_trans_time
    }

    pub fn merchant(&self) -> &str {
        &self.merchant
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> f64 {
        self.amt
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn latitude(&self) -> f64 {
        self.lat
    }

    pub fn longitude(&self) -> f64 {
        self.long
    }

    pub fn city_population(&self) -> i64 {
        self.city_pop
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn date_of_birth(&self) -> &str {
        &self.dob
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.trans_num.as_deref()
    }

    pub fn merchant_latitude(&self) -> f64 {
        self.merch_lat
    }

    pub fn merchant_longitude(&self) -> f64 {
        self.merch_long
    }
}

/// Builder used by the dataset loader and tests.
///
/// `build` reports the first required field that was never set.
#[derive(Debug, Default, Clone)]
pub struct RawTransactionBuilder {
    timestamp: Option<String>,
    merchant: Option<String>,
    category: Option<String>,
    amount: Option<f64>,
    city: Option<String>,
    state: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city_population: Option<i64>,
    job: Option<String>,
    date_of_birth: Option<String>,
    transaction_id: Option<String>,
    merchant_latitude: Option<f64>,
    merchant_longitude: Option<f64>,
}

impl RawTransactionBuilder {
    pub fn timestamp(mut self, value: impl Into<String>) -> Self {
        self.timestamp = Some(value.into());
        self
    }

    pub fn merchant(mut self, value: impl Into<String>) -> Self {
        self.merchant = Some(value.into());
        self
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    pub fn amount(mut self, value: f64) -> Self {
        self.amount = Some(value);
        self
    }

    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }

    pub fn state(mut self, value: impl Into<String>) -> Self {
        self.state = Some(value.into());
        self
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn city_population(mut self, value: i64) -> Self {
        self.city_population = Some(value);
        self
    }

    pub fn job(mut self, value: impl Into<String>) -> Self {
        self.job = Some(value.into());
        self
    }

    pub fn date_of_birth(mut self, value: impl Into<String>) -> Self {
        self.date_of_birth = Some(value.into());
        self
    }

    pub fn transaction_id(mut self, value: impl Into<String>) -> Self {
        self.transaction_id = Some(value.into());
        self
    }

    pub fn merchant_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.merchant_latitude = Some(latitude);
        self.merchant_longitude = Some(longitude);
        self
    }

    /// Finish the record, or return the name of the first unset required field.
    pub fn build(self) -> Result<RawTransaction, &'static str> {
        Ok(RawTransaction {
            trans_date_trans_time: self.timestamp.ok_or(fields::TIMESTAMP)?,
            merchant: self.merchant.ok_or(fields::MERCHANT)?,
            category: self.category.ok_or(fields::CATEGORY)?,
            amt: self.amount.ok_or(fields::AMOUNT)?,
            city: self.city.ok_or(fields::CITY)?,
            state: self.state.ok_or(fields::STATE)?,
            lat: self.latitude.ok_or(fields::LATITUDE)?,
            long: self.longitude.ok_or(fields::LONGITUDE)?,
            city_pop: self.city_population.ok_or(fields::CITY_POPULATION)?,
            job: self.job.ok_or(fields::JOB)?,
            dob: self.date_of_birth.ok_or(fields::DATE_OF_BIRTH)?,
            trans_num: self.transaction_id,
            merch_lat: self.merchant_latitude.ok_or(fields::MERCHANT_LATITUDE)?,
            merch_long: self.merchant_longitude.ok_or(fields::MERCHANT_LONGITUDE)?,
        })
    }
}
