//! Deterministic portfolio simulation
//!
//! Generates daily site and unit series for a set of demo sites. All
//! randomness goes through an injected [`Rng`], so a given seed always yields
//! the same portfolio. Values are drawn inside zones derived from the
//! configured [`ComplianceBand`], never from literal temperatures.

use crate::compliance::band::{ComplianceBand, ComplianceStatus, Zone};
use crate::dashboard::{build_heatmap, Heatmap, SiteDetail, SiteOverview};
use crate::error::{ComplianceError, Result};
use crate::series::{round_to_tenth, Measurement, Series};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default length of a simulated series, in days
pub const DEFAULT_DAYS: usize = 30;

/// Shortest series that fits a closed excursion, a conforme day and the open stretch
pub const MIN_DAYS: usize = 4;

/// Units are spread over at most this many floors
pub const MAX_FLOORS: usize = 8;

/// Margin kept from zone boundaries so one-decimal rounding never changes the zone
const ZONE_MARGIN: f64 = 0.2;

/// Spread of the critical zones beyond their threshold
const CRITICAL_SPREAD: f64 = 2.0;

const UNIT_KINDS: [&str; 6] = ["Studio", "T1", "T2", "T3", "T4", "T5"];
const ORIENTATIONS: [&str; 8] = [
    "North",
    "South",
    "East",
    "West",
    "North-East",
    "North-West",
    "South-East",
    "South-West",
];

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of daily measurements per series
    pub days: usize,
    /// Date of the last measurement, today when unset
    pub end_date: Option<NaiveDate>,
    /// Seed for reproducible portfolios, entropy when unset
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            end_date: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.days < MIN_DAYS {
            return Err(ComplianceError::config(format!(
                "simulation days must be at least {MIN_DAYS}, got {}",
                self.days
            )));
        }
        Ok(())
    }

    pub fn resolved_end_date(&self) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// A demo site: name, target profile and number of dwelling units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSpec {
    pub name: String,
    pub profile: ComplianceStatus,
    pub unit_count: usize,
}

impl SiteSpec {
    pub fn new(name: impl Into<String>, profile: ComplianceStatus, unit_count: usize) -> Self {
        Self {
            name: name.into(),
            profile,
            unit_count,
        }
    }

    /// Units pushed out of band: `ceil(0.7 n)` for critical, `ceil(0.4 n)` for alert sites
    pub fn affected_units(&self) -> usize {
        let n = self.unit_count;
        match self.profile {
            ComplianceStatus::Critical => (n * 7).div_ceil(10),
            ComplianceStatus::Alert => (n * 4).div_ceil(10),
            ComplianceStatus::Conforme => 0,
        }
    }
}

/// The ten demo sites
pub fn default_portfolio() -> Vec<SiteSpec> {
    use ComplianceStatus::{Alert, Conforme, Critical};

    [
        ("immeuble_ancien_rouen", Critical, 7),
        ("residence_luxe_tours", Alert, 6),
        ("maison_famille_jardin", Conforme, 8),
        ("immeuble_appart_famille", Conforme, 12),
        ("immeuble_ancien_le_mans", Conforme, 10),
        ("immeuble_repres_rennes", Conforme, 12),
        ("villa_eco_nantes", Alert, 7),
        ("maison_ilot_angers", Alert, 5),
        ("residence_jeunes_lemans", Conforme, 10),
        ("maison_eco_rouen", Conforme, 10),
    ]
    .into_iter()
    .map(|(name, profile, units)| SiteSpec::new(name, profile, units))
    .collect()
}

/// A simulated dwelling unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedUnit {
    /// `{site}_log{n}`, 1-based
    pub id: String,
    /// Human readable label, e.g. `T2 South, floor 3 no. 1`
    pub label: String,
    pub floor: usize,
    pub series: Series,
}

/// A simulated site with its own series and its units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedSite {
    pub spec: SiteSpec,
    pub series: Series,
    pub units: Vec<SimulatedUnit>,
}

impl SimulatedSite {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// `(unit id, series)` pairs in unit order
    pub fn unit_series(&self) -> impl Iterator<Item = (&str, &Series)> + '_ {
        self.units.iter().map(|unit| (unit.id.as_str(), &unit.series))
    }

    pub fn unit(&self, id: &str) -> Option<&SimulatedUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn overview(&self, band: &ComplianceBand) -> Result<SiteOverview> {
        SiteOverview::build(self.spec.name.as_str(), &self.series, self.unit_series(), band)
    }

    pub fn detail(&self, band: &ComplianceBand) -> Result<SiteDetail> {
        SiteDetail::build(self.spec.name.as_str(), &self.series, self.unit_series(), band)
    }

    pub fn heatmap(&self, band: &ComplianceBand) -> Result<Heatmap> {
        build_heatmap(self.unit_series(), band)
    }
}

/// Zone targeted on each day for one entity
#[derive(Debug, Clone)]
struct ZonePlan {
    zones: Vec<Zone>,
}

impl ZonePlan {
    fn conforme(days: usize) -> Self {
        Self {
            zones: vec![Zone::Conforme; days],
        }
    }

    /// Overwrite `[start, start + len)` with `zone`, clipped to the plan
    fn excursion(mut self, start: usize, len: usize, zone: Zone) -> Self {
        let end = start.saturating_add(len).min(self.zones.len());
        for slot in self.zones.iter_mut().take(end).skip(start) {
            *slot = zone;
        }
        self
    }

    /// Overwrite the last `len` days with `zone`
    fn trailing(self, len: usize, zone: Zone) -> Self {
        let start = self.zones.len().saturating_sub(len);
        self.excursion(start, len, zone)
    }
}

/// Seedable generator of simulated portfolios
#[derive(Debug)]
pub struct PortfolioSimulator<R: Rng> {
    rng: R,
    config: SimulationConfig,
    band: ComplianceBand,
}

impl PortfolioSimulator<StdRng> {
    /// Simulator with a seeded [`StdRng`]
    pub fn seeded(seed: u64, config: SimulationConfig, band: ComplianceBand) -> Result<Self> {
        Self::with_rng(StdRng::seed_from_u64(seed), config, band)
    }

    /// Simulator seeded from `config.seed`, or from entropy when unset
    pub fn from_config(config: SimulationConfig, band: ComplianceBand) -> Result<Self> {
        match config.seed {
            Some(seed) => Self::seeded(seed, config, band),
            None => Self::with_rng(StdRng::from_entropy(), config, band),
        }
    }
}

impl<R: Rng> PortfolioSimulator<R> {
    pub fn with_rng(rng: R, config: SimulationConfig, band: ComplianceBand) -> Result<Self> {
        config.validate()?;
        Ok(Self { rng, config, band })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn band(&self) -> &ComplianceBand {
        &self.band
    }

    /// Simulate every site of `specs`, in order
    pub fn simulate_portfolio(&mut self, specs: &[SiteSpec]) -> Result<Vec<SimulatedSite>> {
        let sites = specs
            .iter()
            .map(|spec| self.simulate_site(spec))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Simulated {} sites over {} days ending {}",
            sites.len(),
            self.config.days,
            self.config.resolved_end_date()
        );
        Ok(sites)
    }

    /// Simulate one site and its units.
    ///
    /// Critical sites get a closed critical excursion and an open critical
    /// stretch at the end; alert sites the same with alert zones. The first
    /// [`SiteSpec::affected_units`] units follow the site's final zone over
    /// the open stretch, the others stay conforme.
    pub fn simulate_site(&mut self, spec: &SiteSpec) -> Result<SimulatedSite> {
        let days = self.config.days;
        let (site_plan, final_zone, tail) = match spec.profile {
            ComplianceStatus::Conforme => (ZonePlan::conforme(days), Zone::Conforme, 0),
            ComplianceStatus::Alert => {
                let closed = self.pick(Zone::AlertLow, Zone::AlertHigh);
                let open = self.pick(Zone::AlertLow, Zone::AlertHigh);
                let tail = (days / 6).max(1);
                let plan = ZonePlan::conforme(days)
                    .excursion(days * 2 / 5, (days / 10).max(1), closed)
                    .trailing(tail, open);
                (plan, open, tail)
            }
            ComplianceStatus::Critical => {
                let closed = self.pick(Zone::CriticalLow, Zone::CriticalHigh);
                let open = self.pick(Zone::CriticalLow, Zone::CriticalHigh);
                let tail = (days / 4).max(1);
                let plan = ZonePlan::conforme(days)
                    .excursion(days / 3, (days / 5).max(1), closed)
                    .trailing(tail, open);
                (plan, open, tail)
            }
        };

        let series = self.render(&site_plan)?;

        let affected = spec.affected_units();
        let per_floor = spec.unit_count.div_ceil(MAX_FLOORS).max(1);
        let mut units = Vec::with_capacity(spec.unit_count);

        for number in 1..=spec.unit_count {
            let plan = if number <= affected {
                ZonePlan::conforme(days).trailing(tail, final_zone)
            } else {
                ZonePlan::conforme(days)
            };
            let floor = (number - 1) / per_floor + 1;
            let position = (number - 1) % per_floor + 1;

            units.push(SimulatedUnit {
                id: format!("{}_log{}", spec.name, number),
                label: self.unit_label(floor, position),
                floor,
                series: self.render(&plan)?,
            });
        }

        debug!(
            "Simulated site {} ({}): {} units, {} affected",
            spec.name, spec.profile, spec.unit_count, affected
        );

        Ok(SimulatedSite {
            spec: spec.clone(),
            series,
            units,
        })
    }

    fn pick(&mut self, low: Zone, high: Zone) -> Zone {
        if self.rng.gen_bool(0.5) {
            low
        } else {
            high
        }
    }

    fn unit_label(&mut self, floor: usize, position: usize) -> String {
        let kind = UNIT_KINDS.choose(&mut self.rng).copied().unwrap_or("T2");
        let orientation = ORIENTATIONS.choose(&mut self.rng).copied().unwrap_or("North");
        format!("{kind} {orientation}, floor {floor} no. {position}")
    }

    /// Turn a zone plan into a dated series ending at the configured end date
    fn render(&mut self, plan: &ZonePlan) -> Result<Series> {
        let end_date = self.config.resolved_end_date();
        let days = plan.zones.len();

        let measurements = plan
            .zones
            .iter()
            .enumerate()
            .map(|(day, &zone)| {
                let back = (days - 1 - day) as u64;
                let date = end_date.checked_sub_days(Days::new(back)).ok_or_else(|| {
                    ComplianceError::config(format!(
                        "cannot go back {back} days from {end_date}"
                    ))
                })?;
                Ok(Measurement::new(date, self.sample(zone)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Series::new(measurements)
    }

    /// Draw a one-decimal temperature inside `zone`
    fn sample(&mut self, zone: Zone) -> Result<f64> {
        let band = self.band;
        let (low, high) = match zone {
            Zone::CriticalLow => (
                band.low_critical() - CRITICAL_SPREAD,
                band.low_critical() - ZONE_MARGIN,
            ),
            Zone::AlertLow => (
                band.low_critical() + ZONE_MARGIN,
                band.low_alert() - ZONE_MARGIN,
            ),
            Zone::Conforme => (
                band.low_alert() + ZONE_MARGIN,
                band.high_alert() - ZONE_MARGIN,
            ),
            Zone::AlertHigh => (
                band.high_alert() + ZONE_MARGIN,
                band.high_critical() - ZONE_MARGIN,
            ),
            Zone::CriticalHigh => (
                band.high_critical() + ZONE_MARGIN,
                band.high_critical() + CRITICAL_SPREAD,
            ),
        };

        let raw = if low < high {
            self.rng.gen_range(low..=high)
        } else {
            // zone narrower than the margins
            zone_midpoint(&band, zone)
        };

        let rounded = round_to_tenth(raw);
        if band.classify(rounded)? == zone {
            Ok(rounded)
        } else {
            Ok(raw)
        }
    }
}

fn zone_midpoint(band: &ComplianceBand, zone: Zone) -> f64 {
    match zone {
        Zone::CriticalLow => band.low_critical() - 1.0,
        Zone::AlertLow => (band.low_critical() + band.low_alert()) / 2.0,
        Zone::Conforme => (band.low_alert() + band.high_alert()) / 2.0,
        Zone::AlertHigh => (band.high_alert() + band.high_critical()) / 2.0,
        Zone::CriticalHigh => band.high_critical() + 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            days: 30,
            end_date: NaiveDate::from_ymd_opt(2025, 6, 14),
            seed: None,
        }
    }

    #[test]
    fn test_affected_units() {
        assert_eq!(SiteSpec::new("a", ComplianceStatus::Critical, 7).affected_units(), 5);
        assert_eq!(SiteSpec::new("a", ComplianceStatus::Critical, 10).affected_units(), 7);
        assert_eq!(SiteSpec::new("a", ComplianceStatus::Alert, 6).affected_units(), 3);
        assert_eq!(SiteSpec::new("a", ComplianceStatus::Alert, 5).affected_units(), 2);
        assert_eq!(SiteSpec::new("a", ComplianceStatus::Conforme, 12).affected_units(), 0);
    }

    #[test]
    fn test_too_few_days_rejected() {
        for days in 0..MIN_DAYS {
            let config = SimulationConfig { days, ..config() };
            assert!(PortfolioSimulator::seeded(1, config, ComplianceBand::default()).is_err());
        }
        let config = SimulationConfig {
            days: MIN_DAYS,
            ..config()
        };
        assert!(PortfolioSimulator::seeded(1, config, ComplianceBand::default()).is_ok());
    }

    #[test]
    fn test_samples_stay_in_zone() {
        let mut sim = PortfolioSimulator::seeded(7, config(), ComplianceBand::default()).unwrap();
        for zone in Zone::ALL {
            for _ in 0..200 {
                let value = sim.sample(zone).unwrap();
                assert_eq!(ComplianceBand::default().classify(value).unwrap(), zone);
            }
        }
    }

    #[test]
    fn test_samples_in_narrow_band() {
        let band = ComplianceBand::new(17.95, 18.0, 18.0, 18.05).unwrap();
        let mut sim = PortfolioSimulator::seeded(3, config(), band).unwrap();
        for zone in Zone::ALL {
            let value = sim.sample(zone).unwrap();
            assert_eq!(band.classify(value).unwrap(), zone);
        }
    }

    #[test]
    fn test_dates_end_at_end_date() {
        let mut sim = PortfolioSimulator::seeded(1, config(), ComplianceBand::default()).unwrap();
        let site = sim
            .simulate_site(&SiteSpec::new("s", ComplianceStatus::Conforme, 2))
            .unwrap();
        assert_eq!(site.series.len(), 30);
        assert_eq!(
            site.series.latest().map(|m| m.timestamp),
            NaiveDate::from_ymd_opt(2025, 6, 14)
        );
        assert_eq!(
            site.series.get(0).map(|m| m.timestamp),
            NaiveDate::from_ymd_opt(2025, 5, 16)
        );
        assert_eq!(site.units[1].id, "s_log2");
    }
}
