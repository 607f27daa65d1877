//! Compliance analysis core
//!
//! - [`band`]: thresholds and the five-zone classifier
//! - [`intervals`]: alert-interval extraction over a series
//! - [`stats`]: per-site unit statistics

pub mod band;
pub mod intervals;
pub mod stats;

pub use band::{classify, is_conforme, Breach, ComplianceBand, ComplianceStatus, Zone};
pub use intervals::{extract_intervals, AlertInterval};
pub use stats::{compute_aggregate_stats, SiteAggregateStats};
