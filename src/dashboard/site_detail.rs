//! Site detail view model

use crate::compliance::band::{ComplianceBand, ComplianceStatus};
use crate::compliance::intervals::{extract_intervals, AlertInterval};
use crate::compliance::stats::SiteAggregateStats;
use crate::dashboard::alert_log::{alert_log, chart_markers, AlertLogEntry, ChartMarker};
use crate::dashboard::sites::SiteOverview;
use crate::error::Result;
use crate::series::Series;
use serde::Serialize;
use std::fmt::Display;
use tracing::debug;

/// Everything shown on a site page: summary, chart, alert log and unit statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDetail<K = chrono::NaiveDate> {
    pub overview: SiteOverview<K>,
    pub series: Series<K>,
    pub intervals: Vec<AlertInterval>,
    /// Empty for conforme sites
    pub alert_log: Vec<AlertLogEntry<K>>,
    /// Empty for conforme sites
    pub markers: Vec<ChartMarker<K>>,
}

impl<K: Clone> SiteDetail<K> {
    /// Build the detail view of a site.
    ///
    /// Intervals are always extracted from the site series. The alert log and
    /// chart markers are only populated when the site is not conforme.
    pub fn build<'a, U, I>(
        name: impl Into<String>,
        site_series: &Series<K>,
        units: I,
        band: &ComplianceBand,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a U, &'a Series<K>)>,
        U: Display + ?Sized + 'a,
        K: 'a,
    {
        let overview = SiteOverview::build(name, site_series, units, band)?;
        let intervals = extract_intervals(site_series, band)?;

        let (alert_log, markers) = if overview.status == ComplianceStatus::Conforme {
            (Vec::new(), Vec::new())
        } else {
            (
                alert_log(site_series, &intervals, band)?,
                chart_markers(site_series, &intervals, band)?,
            )
        };

        debug!(
            "Site detail for {}: {} intervals, {} log entries",
            overview.name,
            intervals.len(),
            alert_log.len()
        );

        Ok(Self {
            overview,
            series: site_series.clone(),
            intervals,
            alert_log,
            markers,
        })
    }

    pub fn stats(&self) -> &SiteAggregateStats {
        &self.overview.stats
    }

    pub fn mean_temperature(&self) -> Option<f64> {
        self.overview.mean_temperature
    }

    pub fn status(&self) -> ComplianceStatus {
        self.overview.status
    }

    /// Intervals still open at the end of the series
    pub fn ongoing_alerts(&self) -> impl Iterator<Item = &AlertInterval> + '_ {
        self.intervals.iter().filter(|interval| interval.is_open())
    }
}
