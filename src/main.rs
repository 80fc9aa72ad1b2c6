//! cyclesense CLI
//!
//! Runs the library's classifiers over JSON input files.  Results go to
//! stdout as JSON; logs go to stderr.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::{Deserialize, Serialize};

use cyclesense::adapters::log_sink::{LogAlertSink, LogEventSink};
use cyclesense::app::service::MonitorService;
use cyclesense::classify::{ComponentUsageRecord, MotionClassifier, WearEstimator};
use cyclesense::co2::{TransportMode, co2_saved_kg, format_co2, tree_equivalent};
use cyclesense::config::SystemConfig;
use cyclesense::geo::{Located, format_distance, nearby};
use cyclesense::telemetry::{GeoPoint, TelemetrySample};

#[derive(Parser)]
#[command(name = "cyclesense", version, about = "Bike telemetry and maintenance analysis")]
struct Cli {
    /// JSON configuration file; missing fields keep their defaults.
    #[arg(long, global = true, env = "CYCLESENSE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a JSON array of telemetry samples.
    Classify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Assess a JSON component usage record.
    Wear {
        #[arg(long)]
        input: PathBuf,
        /// Reference time (ms since epoch); defaults to now.
        #[arg(long)]
        now: Option<i64>,
    },
    /// CO2 saved by a ride.
    Co2 {
        #[arg(long)]
        distance_km: f64,
        #[arg(long, value_enum, default_value_t = ModeArg::Car)]
        mode: ModeArg,
    },
    /// Places within a radius, nearest first.
    Nearby {
        /// JSON array of `{name, latitude, longitude}`.
        #[arg(long)]
        input: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 10.0)]
        radius_km: f64,
    },
    /// Replay JSON-lines telemetry for one bike through the monitor.
    Monitor {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "bike")]
        bike: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Car)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Car,
    Bus,
    Motorcycle,
}

impl From<ModeArg> for TransportMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Car => Self::Car,
            ModeArg::Bus => Self::Bus,
            ModeArg::Motorcycle => Self::Motorcycle,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl Located for Place {
    fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Classify { input } => {
            let samples: Vec<TelemetrySample> = read_json(&input)?;
            for (i, s) in samples.iter().enumerate() {
                s.validate()
                    .map_err(cyclesense::Error::from)
                    .with_context(|| format!("sample #{i}"))?;
            }
            let classifier = MotionClassifier::new(config.motion);
            let verdict = classifier.classify(&samples);
            let features = classifier.features(&samples);
            print_json(&serde_json::json!({ "verdict": verdict, "features": features }))?;
        }
        Command::Wear { input, now } => {
            let record: ComponentUsageRecord = read_json(&input)?;
            let now = now.unwrap_or_else(|| Utc::now().timestamp_millis());
            let assessment = WearEstimator::new(config.maintenance)
                .assess(&record, now)
                .context("assessing component")?;
            print_json(&assessment)?;
        }
        Command::Co2 { distance_km, mode } => {
            let kg = co2_saved_kg(distance_km, mode.into())
                .map_err(cyclesense::Error::from)
                .context("computing CO2 savings")?;
            print_json(&serde_json::json!({
                "co2_saved_kg": kg,
                "formatted": format_co2(kg),
                "equivalent": tree_equivalent(kg),
            }))?;
        }
        Command::Nearby {
            input,
            lat,
            lon,
            radius_km,
        } => {
            let places: Vec<Place> = read_json(&input)?;
            let hits = nearby(GeoPoint::new(lat, lon), &places, radius_km)
                .map_err(cyclesense::Error::from)
                .context("searching nearby places")?;
            let out: Vec<_> = hits
                .iter()
                .map(|(p, km)| {
                    serde_json::json!({
                        "name": p.name,
                        "distance_km": km,
                        "distance": format_distance(*km),
                    })
                })
                .collect();
            print_json(&out)?;
        }
        Command::Monitor { input, bike, mode } => {
            let mut service = MonitorService::new(config).context("building monitor")?;
            let mut alerts = LogAlertSink::new();
            let mut events = LogEventSink::new();

            let file = fs::File::open(&input)
                .with_context(|| format!("opening {}", input.display()))?;
            let (mut accepted, mut rejected, mut anomalous) = (0_u32, 0_u32, 0_u32);
            for (n, line) in BufReader::new(file).lines().enumerate() {
                let line = line.with_context(|| format!("reading line {}", n + 1))?;
                if line.trim().is_empty() {
                    continue;
                }
                let sample: TelemetrySample = serde_json::from_str(&line)
                    .with_context(|| format!("parsing line {}", n + 1))?;
                match service.ingest(&bike, sample, &mut alerts, &mut events) {
                    Ok(v) => {
                        accepted += 1;
                        anomalous += u32::from(v.is_anomalous);
                    }
                    Err(_) => rejected += 1,
                }
            }
            info!("Replayed {accepted} samples ({rejected} rejected) for {bike}");

            let co2 = service.ride_co2_kg(&bike, mode.into())?;
            print_json(&serde_json::json!({
                "accepted": accepted,
                "rejected": rejected,
                "anomalous_windows": anomalous,
                "alerts_delivered": alerts.delivered(),
                "final_verdict": service.evaluate(&bike),
                "distance_km": service.ride_distance_km(&bike),
                "co2_saved": format_co2(co2),
            }))?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SystemConfig> {
    let Some(path) = path else {
        return Ok(SystemConfig::default());
    };
    let config: SystemConfig = read_json(path)?;
    if let Err(e) = config.validate() {
        bail!("{}: {e}", path.display());
    }
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

