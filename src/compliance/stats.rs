//! Per-site statistics over dwelling units
//!
//! Each unit is judged by its latest measurement only.

use crate::compliance::band::{ComplianceBand, ComplianceStatus};
use crate::error::Result;
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, warn};

/// Unit tallies for one site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAggregateStats {
    pub total_units: usize,
    pub out_of_norm_units: usize,
    pub critical_units: usize,
    pub alert_units: usize,
    /// Share of out-of-norm units, rounded half-up to a whole percent
    pub percent_out_of_norm: u32,
}

impl SiteAggregateStats {
    /// Units whose latest reading is conforme (or that have no reading)
    pub fn conforme_units(&self) -> usize {
        self.total_units.saturating_sub(self.out_of_norm_units)
    }

    /// Worst status present among the units, `None` when there are no units
    pub fn worst_status(&self) -> Option<ComplianceStatus> {
        if self.total_units == 0 {
            None
        } else if self.critical_units > 0 {
            Some(ComplianceStatus::Critical)
        } else if self.alert_units > 0 {
            Some(ComplianceStatus::Alert)
        } else {
            Some(ComplianceStatus::Conforme)
        }
    }
}

/// Compute unit statistics for a site.
///
/// `units` is any collection of `(unit id, series)` pairs, e.g. `&BTreeMap<String, Series>`.
/// A unit with an empty series counts toward `total_units` only.
pub fn compute_aggregate_stats<'a, U, K, I>(units: I, band: &ComplianceBand) -> Result<SiteAggregateStats>
where
    I: IntoIterator<Item = (&'a U, &'a Series<K>)>,
    U: Display + ?Sized + 'a,
    K: 'a,
{
    let mut stats = SiteAggregateStats::default();

    for (unit, series) in units {
        stats.total_units += 1;

        let Some(latest) = series.latest() else {
            warn!("Unit {} has no measurements, counting it as conforme", unit);
            continue;
        };

        match band.classify(latest.value)?.status() {
            ComplianceStatus::Critical => stats.critical_units += 1,
            ComplianceStatus::Alert => stats.alert_units += 1,
            ComplianceStatus::Conforme => {}
        }
    }

    stats.out_of_norm_units = stats.critical_units + stats.alert_units;
    stats.percent_out_of_norm = percent_half_up(stats.out_of_norm_units, stats.total_units);

    debug!(
        "Unit stats: {} total, {} critical, {} alert ({}%)",
        stats.total_units, stats.critical_units, stats.alert_units, stats.percent_out_of_norm
    );

    Ok(stats)
}

/// `round(100 * part / total)` with halves rounded up, 0 when `total == 0`
pub fn percent_half_up(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (part as u64, total as u64);
    ((200 * part + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_percent_half_up() {
        assert_eq!(percent_half_up(0, 0), 0);
        assert_eq!(percent_half_up(3, 10), 30);
        assert_eq!(percent_half_up(1, 8), 13); // 12.5
        assert_eq!(percent_half_up(1, 3), 33);
        assert_eq!(percent_half_up(2, 3), 67);
        assert_eq!(percent_half_up(5, 5), 100);
    }

    #[test]
    fn test_counts_latest_only() {
        let mut units = BTreeMap::new();
        // critical earlier, conforme now
        units.insert("a".to_string(), Series::from_values(&[15.0, 20.0]).unwrap());
        // conforme earlier, alert now
        units.insert("b".to_string(), Series::from_values(&[20.0, 17.0]).unwrap());
        // critical high now
        units.insert("c".to_string(), Series::from_values(&[27.0]).unwrap());

        let stats = compute_aggregate_stats(&units, &ComplianceBand::default()).unwrap();
        assert_eq!(stats.total_units, 3);
        assert_eq!(stats.critical_units, 1);
        assert_eq!(stats.alert_units, 1);
        assert_eq!(stats.out_of_norm_units, 2);
        assert_eq!(stats.percent_out_of_norm, 67);
        assert_eq!(stats.conforme_units(), 1);
        assert_eq!(stats.worst_status(), Some(ComplianceStatus::Critical));
    }

    #[test]
    fn test_empty_unit_series_counts_in_total_only() {
        let mut units = BTreeMap::new();
        units.insert("empty".to_string(), Series::<usize>::empty());
        units.insert("hot".to_string(), Series::from_values(&[25.0]).unwrap());

        let stats = compute_aggregate_stats(&units, &ComplianceBand::default()).unwrap();
        assert_eq!(stats.total_units, 2);
        assert_eq!(stats.alert_units, 1);
        assert_eq!(stats.percent_out_of_norm, 50);
    }

    #[test]
    fn test_conforme_units_on_inconsistent_counts() {
        let stats: SiteAggregateStats = serde_json::from_str(
            r#"{"total_units":1,"out_of_norm_units":3,"critical_units":3,"alert_units":0,"percent_out_of_norm":300}"#,
        )
        .unwrap();
        assert_eq!(stats.conforme_units(), 0);
    }
}
