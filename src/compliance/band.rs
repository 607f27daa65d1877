//! Compliance band and temperature classification
//!
//! A band is four thresholds delimiting five zones:
//!
//! | Zone          | Range                          |
//! |---------------|--------------------------------|
//! | critical-low  | `v < low_critical`             |
//! | alert-low     | `low_critical <= v < low_alert`|
//! | conforme      | `low_alert <= v <= high_alert` |
//! | alert-high    | `high_alert < v <= high_critical` |
//! | critical-high | `v > high_critical`            |
//!
//! All threshold comparisons in the crate go through [`ComplianceBand::classify`].

use crate::error::{ComplianceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_LOW_CRITICAL: f64 = 16.0;
pub const DEFAULT_LOW_ALERT: f64 = 18.0;
pub const DEFAULT_HIGH_ALERT: f64 = 24.0;
pub const DEFAULT_HIGH_CRITICAL: f64 = 26.0;

/// Validated comfort range with alert and critical margins on each side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandThresholds")]
pub struct ComplianceBand {
    low_critical: f64,
    low_alert: f64,
    high_alert: f64,
    high_critical: f64,
}

/// Unvalidated wire form of a band
#[derive(Debug, Clone, Copy, Deserialize)]
struct BandThresholds {
    low_critical: f64,
    low_alert: f64,
    high_alert: f64,
    high_critical: f64,
}

impl TryFrom<BandThresholds> for ComplianceBand {
    type Error = ComplianceError;

    fn try_from(raw: BandThresholds) -> Result<Self> {
        ComplianceBand::new(
            raw.low_critical,
            raw.low_alert,
            raw.high_alert,
            raw.high_critical,
        )
    }
}

impl Default for ComplianceBand {
    fn default() -> Self {
        Self {
            low_critical: DEFAULT_LOW_CRITICAL,
            low_alert: DEFAULT_LOW_ALERT,
            high_alert: DEFAULT_HIGH_ALERT,
            high_critical: DEFAULT_HIGH_CRITICAL,
        }
    }
}

impl ComplianceBand {
    /// Build a band, requiring finite thresholds with
    /// `low_critical < low_alert <= high_alert < high_critical`.
    pub fn new(low_critical: f64, low_alert: f64, high_alert: f64, high_critical: f64) -> Result<Self> {
        let thresholds = [low_critical, low_alert, high_alert, high_critical];
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ComplianceError::invalid_measurement(format!(
                "band thresholds must be finite: {thresholds:?}"
            )));
        }

        if !(low_critical < low_alert && low_alert <= high_alert && high_alert < high_critical) {
            return Err(ComplianceError::invalid_measurement(format!(
                "band thresholds out of order: expected {low_critical} < {low_alert} <= {high_alert} < {high_critical}"
            )));
        }

        Ok(Self {
            low_critical,
            low_alert,
            high_alert,
            high_critical,
        })
    }

    pub fn low_critical(&self) -> f64 {
        self.low_critical
    }

    pub fn low_alert(&self) -> f64 {
        self.low_alert
    }

    pub fn high_alert(&self) -> f64 {
        self.high_alert
    }

    pub fn high_critical(&self) -> f64 {
        self.high_critical
    }

    /// Classify a temperature into one of the five zones.
    ///
    /// Non-finite input is rejected with [`ComplianceError::InvalidMeasurement`].
    pub fn classify(&self, value: f64) -> Result<Zone> {
        if !value.is_finite() {
            return Err(ComplianceError::invalid_measurement(format!(
                "cannot classify non-finite temperature {value}"
            )));
        }

        let zone = if value < self.low_critical {
            Zone::CriticalLow
        } else if value < self.low_alert {
            Zone::AlertLow
        } else if value <= self.high_alert {
            Zone::Conforme
        } else if value <= self.high_critical {
            Zone::AlertHigh
        } else {
            Zone::CriticalHigh
        };
        Ok(zone)
    }

    /// Whether a temperature lies in the conforme range
    pub fn is_conforme(&self, value: f64) -> Result<bool> {
        Ok(self.classify(value)?.is_conforme())
    }

    /// Direction of a breach for a value, `None` when conforme.
    ///
    /// Compares against the alert thresholds only, so any non-conforme value
    /// has a direction.
    pub fn breach_of(&self, value: f64) -> Option<Breach> {
        if value < self.low_alert {
            Some(Breach::Low)
        } else if value > self.high_alert {
            Some(Breach::High)
        } else {
            None
        }
    }
}

impl fmt::Display for ComplianceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{} °C", self.low_alert, self.high_alert)
    }
}

/// Classify `value` against `band`
pub fn classify(value: f64, band: &ComplianceBand) -> Result<Zone> {
    band.classify(value)
}

/// Whether `value` is conforme for `band`
pub fn is_conforme(value: f64, band: &ComplianceBand) -> Result<bool> {
    band.is_conforme(value)
}

/// Five-zone classification of a single temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    CriticalLow,
    AlertLow,
    Conforme,
    AlertHigh,
    CriticalHigh,
}

impl Zone {
    /// All zones from coldest to hottest
    pub const ALL: [Zone; 5] = [
        Zone::CriticalLow,
        Zone::AlertLow,
        Zone::Conforme,
        Zone::AlertHigh,
        Zone::CriticalHigh,
    ];

    pub fn is_conforme(&self) -> bool {
        matches!(self, Zone::Conforme)
    }

    /// Collapse to the three-band status used for sites and units
    pub fn status(&self) -> ComplianceStatus {
        match self {
            Zone::CriticalLow | Zone::CriticalHigh => ComplianceStatus::Critical,
            Zone::AlertLow | Zone::AlertHigh => ComplianceStatus::Alert,
            Zone::Conforme => ComplianceStatus::Conforme,
        }
    }

    pub fn breach(&self) -> Option<Breach> {
        match self {
            Zone::CriticalLow | Zone::AlertLow => Some(Breach::Low),
            Zone::Conforme => None,
            Zone::AlertHigh | Zone::CriticalHigh => Some(Breach::High),
        }
    }

    /// Signed severity on the 5-band visual scale: -2 (critical low) to 2 (critical high)
    pub fn level(&self) -> i8 {
        match self {
            Zone::CriticalLow => -2,
            Zone::AlertLow => -1,
            Zone::Conforme => 0,
            Zone::AlertHigh => 1,
            Zone::CriticalHigh => 2,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Zone::CriticalLow => "critical-low",
            Zone::AlertLow => "alert-low",
            Zone::Conforme => "conforme",
            Zone::AlertHigh => "alert-high",
            Zone::CriticalHigh => "critical-high",
        };
        f.pad(label)
    }
}

/// Three-band status, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Conforme,
    Alert,
    Critical,
}

impl ComplianceStatus {
    pub const ALL: [ComplianceStatus; 3] = [
        ComplianceStatus::Conforme,
        ComplianceStatus::Alert,
        ComplianceStatus::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Conforme => "conforme",
            ComplianceStatus::Alert => "alert",
            ComplianceStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Which side of the conforme range was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breach {
    Low,
    High,
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breach::Low => f.write_str("low threshold"),
            Breach::High => f.write_str("high threshold"),
        }
    }
}
