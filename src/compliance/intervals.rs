//! Alert-interval detection
//!
//! Scans a series once, left to right, and reports every maximal run of
//! non-conforme measurements. A run that is still going at the end of the
//! series is reported as open (`end_index == None`).

use crate::compliance::band::{Breach, ComplianceBand};
use crate::error::Result;
use crate::series::Series;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A contiguous run of non-conforme measurements.
///
/// Covers indices `[start_index, end_index)`; `end_index` is the first
/// conforme index after the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertInterval {
    pub start_index: usize,
    pub end_index: Option<usize>,
    pub start_value: f64,
    pub end_value: Option<f64>,
}

impl AlertInterval {
    /// Still non-conforme at the end of the observed series
    pub fn is_open(&self) -> bool {
        self.end_index.is_none()
    }

    /// Number of non-conforme points covered, given the series length for open intervals
    pub fn duration(&self, series_len: usize) -> usize {
        self.end_index
            .unwrap_or(series_len)
            .saturating_sub(self.start_index)
    }

    /// Whether `index` lies inside the non-conforme run
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && self.end_index.map_or(true, |end| index < end)
    }

    /// Side of the band that was crossed, derived from the start value
    pub fn breach(&self, band: &ComplianceBand) -> Option<Breach> {
        band.breach_of(self.start_value)
    }
}

/// Extract the ordered, non-overlapping alert intervals of `series`.
///
/// An empty or fully conforme series yields no intervals.
pub fn extract_intervals<K>(series: &Series<K>, band: &ComplianceBand) -> Result<Vec<AlertInterval>> {
    let measurements = series.measurements();
    let mut intervals = Vec::new();
    let mut alert_start: Option<usize> = None;

    for (index, measurement) in measurements.iter().enumerate() {
        let conforme = band.is_conforme(measurement.value)?;

        match (conforme, alert_start) {
            (false, None) => alert_start = Some(index),
            (true, Some(start)) => {
                intervals.push(AlertInterval {
                    start_index: start,
                    end_index: Some(index),
                    start_value: measurements[start].value,
                    end_value: Some(measurement.value),
                });
                alert_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = alert_start {
        intervals.push(AlertInterval {
            start_index: start,
            end_index: None,
            start_value: measurements[start].value,
            end_value: None,
        });
    }

    debug!(
        "Extracted {} alert intervals from {} measurements ({} open)",
        intervals.len(),
        measurements.len(),
        intervals.iter().filter(|i| i.is_open()).count()
    );

    Ok(intervals)
}
