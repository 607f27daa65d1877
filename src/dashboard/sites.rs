//! Portfolio-level view: one overview row per site, status distribution,
//! filtering and table sorting.

use crate::compliance::band::{ComplianceBand, ComplianceStatus};
use crate::compliance::stats::{compute_aggregate_stats, percent_half_up, SiteAggregateStats};
use crate::error::Result;
use crate::series::{round_to_tenth, Series};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Summary row of the site table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteOverview<K = chrono::NaiveDate> {
    pub name: String,
    /// Mean of the site series, one decimal; `None` for an empty series
    pub mean_temperature: Option<f64>,
    pub status: ComplianceStatus,
    pub band: ComplianceBand,
    pub unit_count: usize,
    pub last_measurement: Option<K>,
    pub stats: SiteAggregateStats,
}

impl<K: Clone> SiteOverview<K> {
    /// Build the overview of one site from its own series and its units' series.
    ///
    /// The site status is the worst unit status. A site without units falls
    /// back to the zone of its own latest measurement.
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
        let name = name.into();
        let stats = compute_aggregate_stats(units, band)?;

        let status = match stats.worst_status() {
            Some(status) => status,
            None => match site_series.latest() {
                Some(latest) => band.classify(latest.value)?.status(),
                None => ComplianceStatus::Conforme,
            },
        };

        debug!("Site {} is {} ({} units)", name, status, stats.total_units);

        Ok(Self {
            name,
            mean_temperature: site_series.mean().map(round_to_tenth),
            status,
            band: *band,
            unit_count: stats.total_units,
            last_measurement: site_series.latest().map(|m| m.timestamp.clone()),
            stats,
        })
    }
}

/// Number of sites and units for one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ComplianceStatus,
    pub sites: usize,
    pub units: usize,
}

/// Distribution of sites across statuses (the donut)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    /// One entry per status, in [`ComplianceStatus::ALL`] order
    pub counts: Vec<StatusCount>,
    pub total_sites: usize,
    pub total_units: usize,
}

impl StatusDistribution {
    pub fn from_sites<K>(sites: &[SiteOverview<K>]) -> Self {
        let counts: Vec<StatusCount> = ComplianceStatus::ALL
            .iter()
            .map(|&status| {
                let matching = sites.iter().filter(|site| site.status == status);
                StatusCount {
                    status,
                    sites: matching.clone().count(),
                    units: matching.map(|site| site.unit_count).sum(),
                }
            })
            .collect();

        Self {
            total_sites: sites.len(),
            total_units: sites.iter().map(|site| site.unit_count).sum(),
            counts,
        }
    }

    pub fn count(&self, status: ComplianceStatus) -> StatusCount {
        self.counts
            .iter()
            .copied()
            .find(|count| count.status == status)
            .unwrap_or(StatusCount {
                status,
                sites: 0,
                units: 0,
            })
    }

    /// Share of sites with `status`, whole percent rounded half-up
    pub fn percent(&self, status: ComplianceStatus) -> u32 {
        percent_half_up(self.count(status).sites, self.total_sites)
    }

    /// Status and percentage shown in the centre of the donut.
    ///
    /// The unfiltered view headlines conforme sites.
    pub fn headline(&self, filter: SiteFilter) -> (ComplianceStatus, u32) {
        let status = match filter {
            SiteFilter::All => ComplianceStatus::Conforme,
            SiteFilter::Status(status) => status,
        };
        (status, self.percent(status))
    }
}

/// Status selection applied to the site table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteFilter {
    #[default]
    All,
    Status(ComplianceStatus),
}

impl SiteFilter {
    pub fn matches(&self, status: ComplianceStatus) -> bool {
        match self {
            SiteFilter::All => true,
            SiteFilter::Status(wanted) => *wanted == status,
        }
    }
}

impl FromStr for SiteFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SiteFilter::All),
            "conforme" => Ok(SiteFilter::Status(ComplianceStatus::Conforme)),
            "alert" | "alerte" => Ok(SiteFilter::Status(ComplianceStatus::Alert)),
            "critical" | "critique" => Ok(SiteFilter::Status(ComplianceStatus::Critical)),
            other => Err(format!("unknown site filter '{other}'")),
        }
    }
}

/// Sites matching `filter`, input order preserved
pub fn filter_sites<'s, K>(sites: &'s [SiteOverview<K>], filter: SiteFilter) -> Vec<&'s SiteOverview<K>> {
    sites
        .iter()
        .filter(|site| filter.matches(site.status))
        .collect()
}

/// Sortable columns of the site table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    MeanTemperature,
    UnitCount,
    LastMeasurement,
    /// Lower bound of the conforme range
    Threshold,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "temp" | "mean_temperature" | "temperature" => Ok(SortKey::MeanTemperature),
            "units" | "unit_count" => Ok(SortKey::UnitCount),
            "date" | "last_measurement" => Ok(SortKey::LastMeasurement),
            "threshold" => Ok(SortKey::Threshold),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

fn compare_by<K: Ord>(a: &SiteOverview<K>, b: &SiteOverview<K>, key: SortKey) -> Ordering {
    match key {
        SortKey::MeanTemperature => match (a.mean_temperature, b.mean_temperature) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        },
        SortKey::UnitCount => a.unit_count.cmp(&b.unit_count),
        SortKey::LastMeasurement => a.last_measurement.cmp(&b.last_measurement),
        SortKey::Threshold => a.band.low_alert().total_cmp(&b.band.low_alert()),
    }
}

/// Stable sort of the site table
pub fn sort_sites<K: Ord>(sites: &mut [SiteOverview<K>], key: SortKey, order: SortOrder) {
    sites.sort_by(|a, b| match order {
        SortOrder::Ascending => compare_by(a, b, key),
        SortOrder::Descending => compare_by(b, a, key),
    });
}

/// Active column and direction of the site table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    /// `None` keeps the input order
    pub key: Option<SortKey>,
    pub order: SortOrder,
}

impl SortState {
    /// Column header click: the active column flips direction, another column starts ascending
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.order = self.order.reversed();
        } else {
            self.key = Some(key);
            self.order = SortOrder::Ascending;
        }
    }

    pub fn apply<K: Ord>(&self, sites: &mut [SiteOverview<K>]) {
        if let Some(key) = self.key {
            sort_sites(sites, key, self.order);
        }
    }
}
