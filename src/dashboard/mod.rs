//! Dashboard view models
//!
//! Pure consumers of the compliance core: they hold no thresholds of their own
//! and classify only through [`ComplianceBand`](crate::compliance::ComplianceBand).

pub mod alert_log;
pub mod heatmap;
pub mod site_detail;
pub mod sites;

pub use alert_log::{alert_log, chart_markers, AlertLogEntry, AlertState, ChartMarker, MarkerKind};
pub use heatmap::{build_heatmap, Heatmap, HeatmapCell, HeatmapRow};
pub use site_detail::SiteDetail;
pub use sites::{
    filter_sites, sort_sites, SiteFilter, SiteOverview, SortKey, SortOrder, SortState,
    StatusCount, StatusDistribution,
};
