//! Test fixtures and utilities for consistent test setup
//!
//! Provides reusable series, bands, simulated portfolios and environment
//! helpers using rstest fixtures.

use chrono::NaiveDate;
use rstest::*;
use site_compliance::simulation::{default_portfolio, PortfolioSimulator, SimulatedSite, SimulationConfig};
use site_compliance::{ComplianceBand, Measurement, Series};
use std::collections::BTreeMap;

/// Seed used by every simulated portfolio in the test suite
pub const TEST_SEED: u64 = 42;

/// The 16/18/24/26 °C band
#[fixture]
pub fn band() -> ComplianceBand {
    ComplianceBand::default()
}

/// Date of the last simulated measurement
#[fixture]
pub fn end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 14).expect("valid date")
}

/// 30 days ending on [`end_date`], seeded
#[fixture]
pub fn sim_config(end_date: NaiveDate) -> SimulationConfig {
    SimulationConfig {
        days: 30,
        end_date: Some(end_date),
        seed: Some(TEST_SEED),
    }
}

/// The ten demo sites simulated with [`TEST_SEED`]
#[fixture]
pub fn portfolio(sim_config: SimulationConfig, band: ComplianceBand) -> Vec<SimulatedSite> {
    PortfolioSimulator::seeded(TEST_SEED, sim_config, band)
        .expect("valid simulation config")
        .simulate_portfolio(&default_portfolio())
        .expect("simulation succeeds")
}

/// Index-keyed series from raw values
pub fn values_series(values: &[f64]) -> Series<usize> {
    Series::from_values(values).expect("finite values")
}

/// Daily series ending on `end`
pub fn dated_series(end: NaiveDate, values: &[f64]) -> Series {
    let start = end - chrono::Days::new(values.len().saturating_sub(1) as u64);
    Series::new(
        values
            .iter()
            .enumerate()
            .map(|(day, &value)| Measurement::new(start + chrono::Days::new(day as u64), value))
            .collect(),
    )
    .expect("ascending dates")
}

/// Units `u01`, `u02`, ... whose series end on the given latest values
pub fn units_with_latest(latest: &[f64]) -> BTreeMap<String, Series<usize>> {
    latest
        .iter()
        .enumerate()
        .map(|(i, &value)| (format!("u{:02}", i + 1), values_series(&[20.0, value])))
        .collect()
}

/// Environment variables read by the configuration layer, all unset
pub fn cleared_config_env() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("SITE_COMPLIANCE_BAND", None),
        ("SITE_COMPLIANCE_DAYS", None),
        ("SITE_COMPLIANCE_SEED", None),
        ("SITE_COMPLIANCE_END_DATE", None),
        ("SITE_COMPLIANCE_LOG_FILE", None),
        ("SITE_COMPLIANCE_LOG_STDERR", None),
        ("SITE_COMPLIANCE_LOG_JSON", None),
        ("SITE_COMPLIANCE_LOG_THREAD_IDS", None),
        ("RUST_LOG", None),
    ]
}
