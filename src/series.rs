//! Time-ordered temperature measurements
//!
//! A [`Series`] is the only input shape the analysis functions accept. It is
//! validated once at construction: every value is finite and timestamps are
//! strictly ascending. An empty series is valid.

use crate::error::{ComplianceError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single temperature reading in degrees Celsius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement<K = NaiveDate> {
    /// Totally ordered label (calendar date, sequence index, ...)
    pub timestamp: K,
    /// Temperature in °C
    pub value: f64,
}

impl<K> Measurement<K> {
    /// Create a new measurement
    pub fn new(timestamp: K, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Measurements for one site or dwelling unit, ascending by timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series<K = NaiveDate> {
    measurements: Vec<Measurement<K>>,
}

impl<K: Ord> Series<K> {
    /// Validate and wrap measurements.
    ///
    /// Fails with [`ComplianceError::InvalidMeasurement`] on a non-finite value
    /// and with [`ComplianceError::UnorderedSeries`] when a timestamp is not
    /// strictly greater than its predecessor (duplicates included).
    pub fn new(measurements: Vec<Measurement<K>>) -> Result<Self> {
        for (index, measurement) in measurements.iter().enumerate() {
            if !measurement.value.is_finite() {
                return Err(ComplianceError::invalid_measurement(format!(
                    "value at index {index} is not finite: {}",
                    measurement.value
                )));
            }
        }

        if let Some(position) = measurements
            .windows(2)
            .position(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            return Err(ComplianceError::UnorderedSeries {
                index: position + 1,
            });
        }

        Ok(Self { measurements })
    }
}

impl Series<usize> {
    /// Index-keyed series, timestamps `0..values.len()`
    pub fn from_values(values: &[f64]) -> Result<Self> {
        Self::new(
            values
                .iter()
                .enumerate()
                .map(|(index, &value)| Measurement::new(index, value))
                .collect(),
        )
    }
}

impl<K> Series<K> {
    /// An empty series
    pub fn empty() -> Self {
        Self {
            measurements: Vec::new(),
        }
    }

    pub fn measurements(&self) -> &[Measurement<K>] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Measurement<K>> {
        self.measurements.get(index)
    }

    /// Most recent measurement
    pub fn latest(&self) -> Option<&Measurement<K>> {
        self.measurements.last()
    }

    /// Iterate over the raw values in order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.measurements.iter().map(|m| m.value)
    }

    /// Iterate over the timestamps in order
    pub fn timestamps(&self) -> impl Iterator<Item = &K> + '_ {
        self.measurements.iter().map(|m| &m.timestamp)
    }

    /// Arithmetic mean of all values, `None` for an empty series
    pub fn mean(&self) -> Option<f64> {
        if self.measurements.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.measurements.len() as f64)
    }

    pub fn into_measurements(self) -> Vec<Measurement<K>> {
        self.measurements
    }
}

impl<K> Default for Series<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Ord> TryFrom<Vec<Measurement<K>>> for Series<K> {
    type Error = ComplianceError;

    fn try_from(measurements: Vec<Measurement<K>>) -> Result<Self> {
        Self::new(measurements)
    }
}

impl<'de, K> Deserialize<'de> for Series<K>
where
    K: Ord + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let measurements = Vec::<Measurement<K>>::deserialize(deserializer)?;
        Series::new(measurements).map_err(serde::de::Error::custom)
    }
}

/// Series read from JSON, keyed by dates (`"YYYY-MM-DD"`) or by integers
#[derive(Debug, Clone, PartialEq)]
pub enum KeyedSeries {
    Dated(Series<NaiveDate>),
    Indexed(Series<usize>),
}

impl KeyedSeries {
    /// Parse a JSON array of `{timestamp, value}` objects.
    ///
    /// The key type follows the first element's `timestamp`: a string means
    /// dates, a number (or an empty array) means integers. Validation errors
    /// come back as [`ComplianceError::InvalidMeasurement`] and
    /// [`ComplianceError::UnorderedSeries`].
    pub fn from_json_str(content: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(content)?;
        let items = json.as_array().ok_or_else(|| {
            ComplianceError::invalid_input("expected a JSON array of measurements")
        })?;

        let dated = match items.first().and_then(|item| item.get("timestamp")) {
            Some(Value::String(_)) => true,
            Some(Value::Number(_)) | None => false,
            Some(other) => {
                return Err(ComplianceError::invalid_input(format!(
                    "unsupported timestamp {other}, expected a date string or an integer"
                )))
            }
        };

        if dated {
            let measurements: Vec<Measurement<NaiveDate>> = serde_json::from_value(json)?;
            Ok(KeyedSeries::Dated(Series::new(measurements)?))
        } else {
            let measurements: Vec<Measurement<usize>> = serde_json::from_value(json)?;
            Ok(KeyedSeries::Indexed(Series::new(measurements)?))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KeyedSeries::Dated(series) => series.len(),
            KeyedSeries::Indexed(series) => series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Round to one decimal, the precision used for displayed temperatures
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
