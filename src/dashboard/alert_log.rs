//! Alert log rows and chart markers derived from extracted intervals

use crate::compliance::band::{Breach, ComplianceBand};
use crate::compliance::intervals::AlertInterval;
use crate::error::{ComplianceError, Result};
use crate::series::{Measurement, Series};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an alert is still running at the end of the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Ongoing,
    Ended,
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertState::Ongoing => f.write_str("ongoing"),
            AlertState::Ended => f.write_str("ended"),
        }
    }
}

/// One row of the alert log table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogEntry<K = chrono::NaiveDate> {
    /// 1-based row number
    pub number: usize,
    pub breach: Option<Breach>,
    pub state: AlertState,
    pub start: K,
    pub start_value: f64,
    pub end: Option<K>,
    pub end_value: Option<f64>,
}

impl<K: fmt::Display> AlertLogEntry<K> {
    /// Period column: `start` for ongoing alerts, `start → end` otherwise
    pub fn period(&self) -> String {
        match &self.end {
            Some(end) => format!("{} → {}", self.start, end),
            None => self.start.to_string(),
        }
    }
}

fn measurement_at<K>(series: &Series<K>, index: usize) -> Result<&Measurement<K>> {
    series.get(index).ok_or_else(|| {
        ComplianceError::invalid_input(format!(
            "alert interval index {index} is outside a series of {} measurements",
            series.len()
        ))
    })
}

/// Build the alert log for `intervals` extracted from `series`.
///
/// Fails with `InvalidInput` if an interval points outside the series.
pub fn alert_log<K: Clone>(
    series: &Series<K>,
    intervals: &[AlertInterval],
    band: &ComplianceBand,
) -> Result<Vec<AlertLogEntry<K>>> {
    intervals
        .iter()
        .enumerate()
        .map(|(position, interval)| {
            let start = measurement_at(series, interval.start_index)?;
            let end = interval
                .end_index
                .map(|index| measurement_at(series, index))
                .transpose()?;

            Ok(AlertLogEntry {
                number: position + 1,
                breach: interval.breach(band),
                state: if interval.is_open() {
                    AlertState::Ongoing
                } else {
                    AlertState::Ended
                },
                start: start.timestamp.clone(),
                start_value: start.value,
                end: end.map(|m| m.timestamp.clone()),
                end_value: end.map(|m| m.value),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    AlertStart,
    AlertEnd,
}

/// Point highlighted on the site chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMarker<K = chrono::NaiveDate> {
    pub kind: MarkerKind,
    pub index: usize,
    pub timestamp: K,
    pub value: f64,
}

/// Chart markers for `intervals`.
///
/// A start marker is placed when the start value is non-conforme. An end
/// marker is placed when the interval is closed before the last index and the
/// end value is conforme.
pub fn chart_markers<K: Clone>(
    series: &Series<K>,
    intervals: &[AlertInterval],
    band: &ComplianceBand,
) -> Result<Vec<ChartMarker<K>>> {
    let last_index = series.len().checked_sub(1);
    let mut markers = Vec::with_capacity(intervals.len() * 2);

    for interval in intervals {
        let start = measurement_at(series, interval.start_index)?;
        if !band.is_conforme(start.value)? {
            markers.push(ChartMarker {
                kind: MarkerKind::AlertStart,
                index: interval.start_index,
                timestamp: start.timestamp.clone(),
                value: start.value,
            });
        }

        if let Some(end_index) = interval.end_index {
            let end = measurement_at(series, end_index)?;
            if Some(end_index) != last_index && band.is_conforme(end.value)? {
                markers.push(ChartMarker {
                    kind: MarkerKind::AlertEnd,
                    index: end_index,
                    timestamp: end.timestamp.clone(),
                    value: end.value,
                });
            }
        }
    }

    Ok(markers)
}
