//! Impact Zones - command line front end
//!
//! Classifies an impact point, lists its damage zones with affected
//! population, and pulls the evacuation plan and comparable earthquakes
//! from the configured services.

use clap::{Parser, Subcommand, ValueEnum};
use impact_zones::core::config::AtlasConfig;
use impact_zones::core::error::Result;
use impact_zones::core::types::{City, DataState, ImpactPoint};
use impact_zones::pipeline::{assess_offline, ImpactAssessment, ImpactPipeline, LiveServices};
use impact_zones::scenario::Scenario;
use impact_zones::seismic::estimate_magnitude;
use impact_zones::services::backend::{BackendClient, ImpactRequest};
use impact_zones::services::feeds::FeedClient;
use impact_zones::terrain::boundary::LandBoundaryDataset;
use impact_zones::terrain::classifier::GeoClassifier;
use impact_zones::zones::catalog::guideline_for;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "impact-zones")]
#[command(about = "Damage zones and affected population for asteroid impact scenarios")]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify an impact point and estimate affected population
    Assess {
        /// Impact latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Impact longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Impact energy in megatons of TNT
        #[arg(long, conflicts_with = "energy_j")]
        energy_mt: Option<f64>,

        /// Impact energy in joules
        #[arg(long)]
        energy_j: Option<f64>,

        /// Scenario link carrying lat/lon/energy query parameters
        #[arg(long, conflicts_with_all = ["lat", "lon", "energy_mt", "energy_j"])]
        url: Option<String>,

        /// Local GeoJSON land boundary file instead of downloading it
        #[arg(long, required_if_eq("offline", "true"))]
        boundaries: Option<PathBuf>,

        /// Local city list (JSON array); implies no backend city lookup
        #[arg(long)]
        cities: Option<PathBuf>,

        /// Skip every network call
        #[arg(long)]
        offline: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the equivalent seismic magnitude of an impact energy
    Magnitude {
        /// Impact energy in megatons of TNT
        #[arg(long)]
        energy_mt: f64,
    },

    /// Ask the backend for an impact energy report
    Impact {
        /// Entry velocity (m/s)
        #[arg(long)]
        velocity: f64,
        /// Asteroid mass (kg)
        #[arg(long)]
        mass: f64,
        /// Asteroid diameter (m)
        #[arg(long)]
        diameter: f64,
        /// Entry angle (degrees)
        #[arg(long, default_value_t = 45.0)]
        angle: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Fetch an asteroid's orbit path and position from the backend
    Orbit {
        /// NASA NeoWs asteroid id
        #[arg(long)]
        asteroid_id: String,
        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter("impact_zones=info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AtlasConfig::load(path)?,
        None => AtlasConfig::default(),
    }
    .with_env_overrides();

    let rt = Runtime::new()?;

    match cli.command {
        Command::Assess {
            lat,
            lon,
            energy_mt,
            energy_j,
            url,
            boundaries,
            cities,
            offline,
            format,
        } => {
            let scenario = match url {
                Some(url) => Scenario::from_url(&url)?,
                None => scenario_from_args(lat, lon, energy_mt, energy_j)?,
            };
            let Some(point) = scenario.point().copied() else {
                println!("No scenario loaded: provide --lat and --lon, or a --url with coordinates.");
                return Ok(());
            };

            let dataset = rt.block_on(load_boundaries(&config, boundaries.as_deref()))?;

            let assessment = if offline || cities.is_some() {
                let cities = cities.as_deref().map(read_cities).transpose()?;
                let classifier = GeoClassifier::with_coastal_threshold(config.coastal_threshold_km);
                assess_offline(&classifier, &dataset, point, cities.as_deref())
            } else {
                let services = LiveServices::from_config(&config)?;
                let pipeline = ImpactPipeline::new(services, Arc::new(dataset), config.clone());
                rt.block_on(pipeline.assess(point))
            };

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
                OutputFormat::Text => print_assessment(&assessment),
            }
        }

        Command::Magnitude { energy_mt } => match estimate_magnitude(energy_mt) {
            Some(m) => println!("{:.2} Mt -> magnitude {:.2}", energy_mt, m),
            None => println!("No magnitude for non-positive energy {} Mt", energy_mt),
        },

        Command::Impact {
            velocity,
            mass,
            diameter,
            angle,
            lat,
            lon,
        } => {
            let backend = BackendClient::from_config(&config)?;
            let request = ImpactRequest {
                velocity,
                mass,
                diameter,
                angle,
                latitude: lat,
                longitude: lon,
            };
            let report = rt.block_on(backend.impact(&request))?;
            println!("Impact energy:  {:.3e} J", report.impact_energy);
            println!("Energy (TNT):   {:.4} tons", report.impact_energy_tnt);
            println!("Lost energy:    {:.3e} J", report.lost_energy);
            println!("Mass to space:  {:.3}%", report.percent_to_space);
            println!("Hiroshima eq.:  {:.3}", report.impact_energy_hiroshima);
        }

        Command::Orbit { asteroid_id, date } => {
            let backend = BackendClient::from_config(&config)?;
            let orbit = rt.block_on(backend.orbital_data(&asteroid_id, &date))?;
            println!("{}", serde_json::to_string_pretty(&orbit)?);
        }
    }

    Ok(())
}

fn scenario_from_args(
    lat: Option<f64>,
    lon: Option<f64>,
    energy_mt: Option<f64>,
    energy_j: Option<f64>,
) -> Result<Scenario> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Ok(Scenario::NotLoaded);
    };
    let point = match (energy_mt, energy_j) {
        (_, Some(joules)) => ImpactPoint::from_joules(lat, lon, joules)?,
        (mt, None) => ImpactPoint::new(lat, lon, mt.unwrap_or(0.0))?,
    };
    Ok(Scenario::Loaded(point))
}

// `--offline` requires `--boundaries`, so the download only happens online
async fn load_boundaries(config: &AtlasConfig, path: Option<&Path>) -> Result<LandBoundaryDataset> {
    match path {
        Some(path) => Ok(LandBoundaryDataset::from_file(path)?),
        None => FeedClient::from_config(config)?.land_boundaries().await,
    }
}

fn read_cities(path: &Path) -> Result<Vec<City>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_assessment(assessment: &ImpactAssessment) {
    let point = &assessment.point;
    let classification = &assessment.classification;

    println!();
    println!("=== {} ===", assessment.kind);
    println!(
        "Location: {:.4}, {:.4}   Energy: {:.2} Mt",
        point.latitude(),
        point.longitude(),
        point.energy_megatons()
    );
    if classification.is_water {
        println!(
            "Distance to land: {:.1} km ({})",
            classification.distance_to_land_km,
            classification.nearest_land.as_deref().unwrap_or("unknown")
        );
    } else if let Some(name) = &classification.nearest_land {
        println!("Land: {}", name);
    }
    if let Some(magnitude) = assessment.magnitude {
        println!("Equivalent magnitude: {:.2}", magnitude);
    }

    println!();
    println!("Zones:");
    let population = assessment.population.available();
    for zone in &assessment.zones {
        let figures = population
            .and_then(|p| p.get(&zone.id))
            .map(|t| {
                format!(
                    "{} within radius, {} in ring, {} stacked",
                    t.cumulative_affected, t.marginal_affected, t.running_total
                )
            })
            .unwrap_or_else(|| "population unavailable".into());
        println!(
            "  {:<12} {:>6.0} km  {:?}  {}",
            zone.id, zone.radius_km, zone.color, figures
        );
        println!("               {}", zone.description);
    }
    if let DataState::Unavailable { reason } = &assessment.population {
        println!("  (city data unavailable: {})", reason);
    }

    match &assessment.evacuation {
        DataState::Available(plan) if !plan.is_empty() => {
            println!();
            println!("Evacuation plan:");
            for group in plan.grouped_by_zone(&assessment.zones) {
                println!("  {} - {}", group.guideline.title, group.guideline.guideline);
                if group.entries.is_empty() {
                    println!("    No cities affected in this zone.");
                }
                for entry in group.entries {
                    println!(
                        "    {:>3}. {:<24} {:>7.1} km  {:>10}",
                        entry.order, entry.name, entry.distance, entry.population
                    );
                }
            }
        }
        DataState::Available(_) => {}
        DataState::Unavailable { reason } => {
            println!();
            println!("Evacuation plan unavailable: {}", reason);
        }
        DataState::NotRequested => {
            println!();
            println!("Guidelines:");
            for zone in &assessment.zones {
                let guideline = guideline_for(&zone.id);
                println!("  {}: {}", guideline.title, guideline.guideline);
            }
        }
    }

    match &assessment.earthquakes {
        DataState::Available(quakes) => {
            println!();
            println!("Similar earthquakes: {}", quakes.len());
            for quake in quakes.iter().take(10) {
                println!(
                    "  M{:.1}  {}",
                    quake.magnitude,
                    quake.place.as_deref().unwrap_or("unknown location")
                );
            }
        }
        DataState::Unavailable { reason } => {
            println!();
            println!("Earthquake comparison unavailable: {}", reason);
        }
        DataState::NotRequested => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_requires_boundaries_file() {
        let result = Cli::try_parse_from([
            "impact-zones", "assess", "--lat", "10", "--lon", "-70", "--offline",
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_offline_with_boundaries_parses() {
        let cli = Cli::try_parse_from([
            "impact-zones",
            "assess",
            "--lat",
            "10",
            "--lon",
            "-70",
            "--offline",
            "--boundaries",
            "land.geojson",
        ])
        .unwrap();
        match cli.command {
            Command::Assess {
                offline,
                boundaries,
                ..
            } => {
                assert!(offline);
                assert_eq!(boundaries, Some(PathBuf::from("land.geojson")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_online_without_boundaries_parses() {
        let cli = Cli::try_parse_from(["impact-zones", "assess", "--lat", "1", "--lon", "2"]);
        assert!(cli.is_ok());
    }
}
