//! Classification and band validation tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::*;
use site_compliance::{classify, is_conforme, ComplianceBand, ComplianceError, ComplianceStatus, Zone};

mod common;
use common::band;

#[rstest]
#[case(10.0, Zone::CriticalLow)]
#[case(15.9, Zone::CriticalLow)]
#[case(16.0, Zone::AlertLow)]
#[case(17.999, Zone::AlertLow)]
#[case(18.0, Zone::Conforme)]
#[case(21.0, Zone::Conforme)]
#[case(24.0, Zone::Conforme)]
#[case(24.001, Zone::AlertHigh)]
#[case(26.0, Zone::AlertHigh)]
#[case(26.1, Zone::CriticalHigh)]
fn test_default_band_zones(band: ComplianceBand, #[case] value: f64, #[case] expected: Zone) {
    assert_eq!(classify(value, &band).unwrap(), expected);
    assert_eq!(is_conforme(value, &band).unwrap(), expected == Zone::Conforme);
}

#[rstest]
#[case(Zone::CriticalLow, ComplianceStatus::Critical)]
#[case(Zone::AlertLow, ComplianceStatus::Alert)]
#[case(Zone::Conforme, ComplianceStatus::Conforme)]
#[case(Zone::AlertHigh, ComplianceStatus::Alert)]
#[case(Zone::CriticalHigh, ComplianceStatus::Critical)]
fn test_zone_status(#[case] zone: Zone, #[case] status: ComplianceStatus) {
    assert_eq!(zone.status(), status);
}

#[rstest]
fn test_non_finite_values_are_invalid(band: ComplianceBand) {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = classify(value, &band).unwrap_err();
        assert!(matches!(err, ComplianceError::InvalidMeasurement(_)));
        assert!(err.is_contract_violation());
    }
}

#[rstest]
#[case(18.0, 18.0, 24.0, 26.0)]
#[case(16.0, 25.0, 24.0, 26.0)]
#[case(16.0, 18.0, 24.0, 24.0)]
#[case(16.0, 18.0, 24.0, f64::INFINITY)]
fn test_invalid_bands_are_rejected(#[case] lc: f64, #[case] la: f64, #[case] ha: f64, #[case] hc: f64) {
    assert!(matches!(
        ComplianceBand::new(lc, la, ha, hc),
        Err(ComplianceError::InvalidMeasurement(_))
    ));
}

#[test]
fn test_degenerate_conforme_range() {
    let band = ComplianceBand::new(17.0, 20.0, 20.0, 23.0).unwrap();
    assert_eq!(band.classify(20.0).unwrap(), Zone::Conforme);
    assert_eq!(band.classify(19.99).unwrap(), Zone::AlertLow);
    assert_eq!(band.classify(20.01).unwrap(), Zone::AlertHigh);
}

fn arb_band() -> impl Strategy<Value = ComplianceBand> {
    (-20.0f64..40.0, 0.1f64..5.0, 0.0f64..10.0, 0.1f64..5.0).prop_map(|(lc, gap_low, width, gap_high)| {
        let la = lc + gap_low;
        let ha = la + width;
        let hc = ha + gap_high;
        ComplianceBand::new(lc, la, ha, hc).unwrap()
    })
}

proptest! {
    #[test]
    fn prop_zone_matches_thresholds(band in arb_band(), value in -60.0f64..90.0) {
        let zone = band.classify(value).unwrap();
        let expected = if value < band.low_critical() {
            Zone::CriticalLow
        } else if value < band.low_alert() {
            Zone::AlertLow
        } else if value <= band.high_alert() {
            Zone::Conforme
        } else if value <= band.high_critical() {
            Zone::AlertHigh
        } else {
            Zone::CriticalHigh
        };
        prop_assert_eq!(zone, expected);
        prop_assert_eq!(zone.breach(), band.breach_of(value));
    }

    #[test]
    fn prop_levels_are_monotonic(band in arb_band(), a in -60.0f64..90.0, b in -60.0f64..90.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(band.classify(low).unwrap().level() <= band.classify(high).unwrap().level());
    }
}
