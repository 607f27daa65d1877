//! Site compliance - command line entry point
//!
//! Simulates the demo portfolio and prints the dashboard views, or runs the
//! interval extractor over a measurement file.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use site_compliance::{
    config::DashboardConfig,
    dashboard::{
        filter_sites, AlertLogEntry, Heatmap, SiteDetail, SiteFilter, SiteOverview, SortKey,
        SortOrder, SortState, StatusDistribution,
    },
    extract_intervals,
    logging::{init_logging, LogConfig},
    series::KeyedSeries,
    simulation::{default_portfolio, PortfolioSimulator, SimulatedSite},
    utils::require_some,
    AlertInterval, ComplianceBand, ComplianceStatus, Series,
};
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, info};

/// Site compliance dashboard
#[derive(Parser, Debug)]
#[command(name = "site-compliance")]
#[command(about = "Temperature compliance dashboard for building portfolios")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "SITE_COMPLIANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Seed for the simulated portfolio
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Site table and status distribution
    Portfolio {
        /// all, conforme, alert or critical
        #[arg(long, default_value = "all")]
        filter: SiteFilter,

        /// temp, units, date or threshold
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Detail view of one site: chart markers, alert log and unit statistics
    Site {
        /// Site name, e.g. immeuble_ancien_rouen
        name: String,
    },
    /// Per-unit temperature heatmap of one site
    Heatmap {
        /// Site name
        name: String,
    },
    /// Extract alert intervals from a JSON array of {timestamp, value}
    Intervals {
        /// Input file; timestamps are dates (YYYY-MM-DD) or integers
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct PortfolioReport<'a> {
    distribution: &'a StatusDistribution,
    sites: Vec<&'a SiteOverview>,
}

#[derive(Serialize)]
struct IntervalReport<'a, K> {
    band: &'a ComplianceBand,
    intervals: &'a [AlertInterval],
    alert_log: &'a [AlertLogEntry<K>],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }

    init_logging(LogConfig::from_settings(&config.logging).with_debug(cli.debug))
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;
    debug!("Configuration: {:?}", config);

    match &cli.command {
        Command::Portfolio { filter, sort, desc } => {
            let sites = simulate(&config)?;
            let mut overviews = sites
                .iter()
                .map(|site| site.overview(&config.band))
                .collect::<site_compliance::Result<Vec<_>>>()?;

            let distribution = StatusDistribution::from_sites(&overviews);
            let state = SortState {
                key: *sort,
                order: if *desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                },
            };
            state.apply(&mut overviews);
            let shown = filter_sites(&overviews, *filter);

            if cli.json {
                print_json(&PortfolioReport {
                    distribution: &distribution,
                    sites: shown,
                })?;
            } else {
                print_portfolio(&distribution, *filter, &shown);
            }
        }
        Command::Site { name } => {
            let sites = simulate(&config)?;
            let site = find_site(&sites, name)?;
            let detail = site.detail(&config.band)?;

            if cli.json {
                print_json(&detail)?;
            } else {
                print_site_detail(&detail);
            }
        }
        Command::Heatmap { name } => {
            let sites = simulate(&config)?;
            let site = find_site(&sites, name)?;
            let heatmap = site.heatmap(&config.band)?;

            if cli.json {
                print_json(&heatmap)?;
            } else {
                print_heatmap(site, &heatmap);
            }
        }
        Command::Intervals { input } => {
            let content = std::fs::read_to_string(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let series = KeyedSeries::from_json_str(&content)
                .with_context(|| format!("Invalid series in {}", input.display()))?;
            match &series {
                KeyedSeries::Dated(series) => report_intervals(series, &config.band, cli.json)?,
                KeyedSeries::Indexed(series) => report_intervals(series, &config.band, cli.json)?,
            }
        }
    }

    Ok(())
}

fn simulate(config: &DashboardConfig) -> anyhow::Result<Vec<SimulatedSite>> {
    let mut simulator = PortfolioSimulator::from_config(config.simulation.clone(), config.band)?;
    let sites = simulator.simulate_portfolio(&default_portfolio())?;
    info!("Band {}", config.band);
    Ok(sites)
}

fn find_site<'a>(sites: &'a [SimulatedSite], name: &str) -> site_compliance::Result<&'a SimulatedSite> {
    require_some(
        sites.iter().find(|site| site.name() == name),
        &format!("site {name}"),
    )
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_temperature(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1} °C"))
}

fn print_portfolio(distribution: &StatusDistribution, filter: SiteFilter, sites: &[&SiteOverview]) {
    let (status, percent) = distribution.headline(filter);
    println!("{percent}% of sites {status}");
    for count in &distribution.counts {
        println!(
            "  {:<9} {:>2} sites  {:>3} units  {:>3}%",
            count.status,
            count.sites,
            count.units,
            distribution.percent(count.status)
        );
    }
    println!();
    println!(
        "{:<26} {:>9}  {:<10} {:<11} {:>5}  {}",
        "site", "temp", "status", "threshold", "units", "last"
    );
    for site in sites {
        println!(
            "{:<26} {:>9}  {:<10} {:<11} {:>5}  {}",
            site.name,
            format_temperature(site.mean_temperature),
            site.status,
            site.band.to_string(),
            site.unit_count,
            site.last_measurement
                .map_or_else(|| "-".to_string(), |d| d.to_string())
        );
    }
}

fn print_site_detail(detail: &SiteDetail) {
    let overview = &detail.overview;
    let stats = detail.stats();
    println!("{} ({})", overview.name, overview.status);
    println!("  mean temperature  {}", format_temperature(overview.mean_temperature));
    println!("  threshold         {}", overview.band);
    println!(
        "  units             {} total, {} out of norm ({}%), {} critical, {} alert",
        stats.total_units,
        stats.out_of_norm_units,
        stats.percent_out_of_norm,
        stats.critical_units,
        stats.alert_units
    );
    println!("  ongoing alerts    {}", detail.ongoing_alerts().count());

    if !detail.markers.is_empty() {
        println!();
        println!("Markers");
        for marker in &detail.markers {
            println!(
                "  {:?} {} {:.1} °C",
                marker.kind, marker.timestamp, marker.value
            );
        }
    }

    println!();
    print_alert_log(&detail.alert_log);
}

fn print_alert_log<K: Display>(log: &[AlertLogEntry<K>]) {
    println!("Alert log");
    if log.is_empty() {
        println!("  no alerts");
        return;
    }
    for entry in log {
        let breach = entry
            .breach
            .map_or_else(|| "-".to_string(), |b| b.to_string());
        println!(
            "  #{:<3} {:<15} {:<28} {}",
            entry.number,
            breach,
            entry.period(),
            entry.state
        );
    }
}

fn print_heatmap(site: &SimulatedSite, heatmap: &Heatmap) {
    let header: Vec<String> = heatmap
        .columns
        .iter()
        .map(|date| format!("{:>6}", date.format("%d/%m").to_string()))
        .collect();
    println!("{:<36}{}", "unit", header.join(""));

    for row in &heatmap.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| {
                let mark = match cell.status() {
                    ComplianceStatus::Conforme => ' ',
                    ComplianceStatus::Alert => '!',
                    ComplianceStatus::Critical => '#',
                };
                format!("{:>5.1}{}", cell.value, mark)
            })
            .collect();
        let label = site
            .unit(&row.unit)
            .map_or(row.unit.as_str(), |unit| unit.label.as_str());
        println!("{:<36}{}", label, cells.join(""));
    }

    for (status, count) in heatmap.status_counts() {
        println!("  {status}: {count} readings");
    }
}

fn report_intervals<K>(series: &Series<K>, band: &ComplianceBand, json: bool) -> anyhow::Result<()>
where
    K: Clone + Display + Serialize,
{
    let intervals = extract_intervals(series, band)?;
    let alert_log = site_compliance::dashboard::alert_log(series, &intervals, band)?;

    if json {
        print_json(&IntervalReport {
            band,
            intervals: &intervals,
            alert_log: &alert_log,
        })?;
    } else {
        println!("{} measurements, band {}", series.len(), band);
        print_alert_log(&alert_log);
    }
    Ok(())
}
