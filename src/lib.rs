//! Temperature compliance analysis for building portfolios
//!
//! This crate classifies temperatures against a compliance band, extracts
//! alert intervals from measurement series and aggregates per-site unit
//! statistics. Dashboard view models and a deterministic demo-data simulator
//! are built on top of that core.
//!
//! # Features
//!
//! - Five-zone classification (critical / alert / conforme on both sides)
//! - Single-pass alert-interval extraction with open and closed intervals
//! - Per-site unit statistics from each unit's latest reading
//! - Site table, status distribution, alert log, chart markers and heatmap
//! - Seedable portfolio simulation
//!
//! # Example
//!
//! ```
//! use site_compliance::{extract_intervals, ComplianceBand, Series};
//!
//! let band = ComplianceBand::default();
//! let series = Series::from_values(&[20.0, 20.0, 15.0, 15.0, 20.0, 20.0]).unwrap();
//! let intervals = extract_intervals(&series, &band).unwrap();
//!
//! assert_eq!(intervals.len(), 1);
//! assert_eq!(intervals[0].start_index, 2);
//! assert_eq!(intervals[0].end_index, Some(4));
//! ```

// Core modules
pub mod compliance;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod series;
pub mod simulation;
pub mod utils;

// Re-export main types for convenience
pub use compliance::{
    classify, compute_aggregate_stats, extract_intervals, is_conforme, AlertInterval, Breach,
    ComplianceBand, ComplianceStatus, SiteAggregateStats, Zone,
};
pub use config::DashboardConfig;
pub use error::{ComplianceError, ErrorCode, Result};
pub use series::{KeyedSeries, Measurement, Series};
