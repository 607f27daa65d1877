//! Per-site unit statistics tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::*;
use site_compliance::{compute_aggregate_stats, ComplianceBand, ComplianceStatus, Series, SiteAggregateStats};
use std::collections::{BTreeMap, HashMap};

mod common;
use common::{band, units_with_latest, values_series};

#[rstest]
fn test_three_critical_out_of_ten(band: ComplianceBand) {
    let mut latest = vec![15.0; 3];
    latest.extend([20.0; 7]);
    let units = units_with_latest(&latest);

    let stats = compute_aggregate_stats(&units, &band).unwrap();
    assert_eq!(
        stats,
        SiteAggregateStats {
            total_units: 10,
            out_of_norm_units: 3,
            critical_units: 3,
            alert_units: 0,
            percent_out_of_norm: 30,
        }
    );
}

#[rstest]
fn test_no_units(band: ComplianceBand) {
    let units: BTreeMap<String, Series<usize>> = BTreeMap::new();
    let stats = compute_aggregate_stats(&units, &band).unwrap();
    assert_eq!(stats, SiteAggregateStats::default());
    assert_eq!(stats.percent_out_of_norm, 0);
    assert_eq!(stats.worst_status(), None);
}

#[rstest]
#[case::half_up(&[15.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0], 13)]
#[case::one_third(&[17.0, 20.0, 20.0], 33)]
#[case::two_thirds(&[17.0, 25.0, 20.0], 67)]
#[case::all(&[14.0, 27.0], 100)]
fn test_percent_rounding(band: ComplianceBand, #[case] latest: &[f64], #[case] percent: u32) {
    let stats = compute_aggregate_stats(&units_with_latest(latest), &band).unwrap();
    assert_eq!(stats.percent_out_of_norm, percent);
}

#[rstest]
fn test_only_latest_reading_counts(band: ComplianceBand) {
    let mut units = HashMap::new();
    units.insert("recovered", values_series(&[14.0, 14.0, 21.0]));
    units.insert("drifting", values_series(&[21.0, 21.0, 24.5]));

    let stats = compute_aggregate_stats(units.iter().map(|(id, s)| (*id, s)), &band).unwrap();
    assert_eq!(stats.total_units, 2);
    assert_eq!(stats.critical_units, 0);
    assert_eq!(stats.alert_units, 1);
    assert_eq!(stats.worst_status(), Some(ComplianceStatus::Alert));
}

#[rstest]
fn test_unit_without_measurements(band: ComplianceBand) {
    let mut units = units_with_latest(&[27.0]);
    units.insert("silent".to_string(), Series::empty());

    let stats = compute_aggregate_stats(&units, &band).unwrap();
    assert_eq!(stats.total_units, 2);
    assert_eq!(stats.out_of_norm_units, 1);
    assert_eq!(stats.conforme_units(), 1);
    assert_eq!(stats.percent_out_of_norm, 50);
}

proptest! {
    #[test]
    fn prop_counts_are_consistent(latest in prop::collection::vec(5.0f64..35.0, 0..40)) {
        let band = ComplianceBand::default();
        let stats = compute_aggregate_stats(&units_with_latest(&latest), &band).unwrap();

        prop_assert_eq!(stats.total_units, latest.len());
        prop_assert_eq!(stats.out_of_norm_units, stats.critical_units + stats.alert_units);
        prop_assert!(stats.out_of_norm_units <= stats.total_units);
        prop_assert!(stats.percent_out_of_norm <= 100);

        if stats.total_units > 0 {
            let exact = 100.0 * stats.out_of_norm_units as f64 / stats.total_units as f64;
            prop_assert!((stats.percent_out_of_norm as f64 - exact).abs() <= 0.5 + 1e-9);
        }
    }
}
