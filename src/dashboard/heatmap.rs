//! Per-unit by per-day temperature grid

use crate::compliance::band::{ComplianceBand, ComplianceStatus, Zone};
use crate::error::Result;
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell<K = chrono::NaiveDate> {
    pub timestamp: K,
    pub value: f64,
    pub zone: Zone,
}

impl<K> HeatmapCell<K> {
    /// Colour class of the cell
    pub fn status(&self) -> ComplianceStatus {
        self.zone.status()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow<K = chrono::NaiveDate> {
    pub unit: String,
    pub cells: Vec<HeatmapCell<K>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap<K = chrono::NaiveDate> {
    /// Column headers, taken from the first unit
    pub columns: Vec<K>,
    pub rows: Vec<HeatmapRow<K>>,
}

impl<K: PartialEq> Heatmap<K> {
    /// Whether every row has exactly the column timestamps
    pub fn is_aligned(&self) -> bool {
        self.rows.iter().all(|row| {
            row.cells.len() == self.columns.len()
                && row
                    .cells
                    .iter()
                    .zip(&self.columns)
                    .all(|(cell, column)| cell.timestamp == *column)
        })
    }
}

impl<K> Heatmap<K> {
    /// Number of cells per status, in [`ComplianceStatus::ALL`] order
    pub fn status_counts(&self) -> [(ComplianceStatus, usize); 3] {
        ComplianceStatus::ALL.map(|status| {
            let count = self
                .rows
                .iter()
                .flat_map(|row| &row.cells)
                .filter(|cell| cell.status() == status)
                .count();
            (status, count)
        })
    }
}

/// Classify every measurement of every unit.
///
/// Rows keep each unit's own timestamps; a mismatch with the first unit is
/// logged but not rejected.
pub fn build_heatmap<'a, U, K, I>(units: I, band: &ComplianceBand) -> Result<Heatmap<K>>
where
    I: IntoIterator<Item = (&'a U, &'a Series<K>)>,
    U: Display + ?Sized + 'a,
    K: Clone + PartialEq + 'a,
{
    let mut columns: Option<Vec<K>> = None;
    let mut rows = Vec::new();

    for (unit, series) in units {
        let cells = series
            .measurements()
            .iter()
            .map(|m| {
                Ok(HeatmapCell {
                    timestamp: m.timestamp.clone(),
                    value: m.value,
                    zone: band.classify(m.value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let expected = columns.get_or_insert_with(|| series.timestamps().cloned().collect());
        if !series.timestamps().eq(expected.iter()) {
            warn!("Unit {} timestamps differ from the heatmap columns", unit);
        }

        rows.push(HeatmapRow {
            unit: unit.to_string(),
            cells,
        });
    }

    Ok(Heatmap {
        columns: columns.unwrap_or_default(),
        rows,
    })
}
