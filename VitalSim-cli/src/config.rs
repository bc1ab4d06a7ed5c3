//! Simulator configuration
//!
//! Settings come from the environment (optionally seeded from a `.env` file)
//! and can be overridden by command-line flags.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};
use vital_sim_data::{InfluxConfig, InfluxSink, LogSink, MetricsSink, SinkError};
use vital_sim_domain::services::DEFAULT_PERTURBATION_PROBABILITY;
use vital_sim_domain::{PatientRoster, ProfileError, RngSource, StdRandomSource, VitalsGenerator};

/// Default pause between two simulation ticks
pub const DEFAULT_INTERVAL_SECONDS: u64 = 5;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Interval of zero seconds
    #[error("Simulation interval must be at least one second")]
    InvalidInterval,

    /// Probability outside `[0, 1]`
    #[error("Perturbation probability must be between 0 and 1, got {0}")]
    InvalidProbability(f64),

    /// Patient profiles could not be loaded
    #[error(transparent)]
    Profiles(#[from] ProfileError),

    /// Metrics sink could not be created
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Pause between ticks
    pub interval: Duration,
    /// Seed for a reproducible run; `None` seeds from the OS
    pub seed: Option<u64>,
    /// JSON roster file; `None` uses the built-in patients
    pub profiles_path: Option<PathBuf>,
    /// Log points instead of writing them to InfluxDB
    pub dry_run: bool,
    /// Per-rule probability of a condition perturbation
    pub perturbation_probability: f64,
    /// Stop after this many ticks; `None` runs until shutdown
    pub max_ticks: Option<u64>,
    /// InfluxDB connection settings
    pub influx: InfluxConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECONDS),
            seed: None,
            profiles_path: None,
            dry_run: false,
            perturbation_probability: DEFAULT_PERTURBATION_PROBABILITY,
            max_ticks: None,
            influx: InfluxConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let interval = parse_var::<u64, _>(&lookup, "SIMULATION_INTERVAL_SECONDS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval);

        let seed = parse_var::<u64, _>(&lookup, "SIMULATION_SEED");

        let profiles_path = lookup("PATIENT_PROFILES")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let dry_run = lookup("SIMULATION_DRY_RUN")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(defaults.dry_run);

        let perturbation_probability = parse_var::<f64, _>(&lookup, "PERTURBATION_PROBABILITY")
            .unwrap_or(defaults.perturbation_probability);

        Self {
            interval,
            seed,
            profiles_path,
            dry_run,
            perturbation_probability,
            max_ticks: None,
            influx: InfluxConfig::from_lookup(&lookup),
        }
    }

    /// Check values the scheduler cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        if !(0.0..=1.0).contains(&self.perturbation_probability) {
            return Err(ConfigError::InvalidProbability(self.perturbation_probability));
        }
        Ok(())
    }

    /// Load the configured roster, or the built-in one
    pub fn load_roster(&self) -> Result<PatientRoster, ConfigError> {
        match &self.profiles_path {
            Some(path) => Ok(PatientRoster::from_path(path)?),
            None => {
                info!("No PATIENT_PROFILES provided, using the built-in patients");
                Ok(PatientRoster::default())
            }
        }
    }

    /// Build the sink points are written to
    pub fn build_sink(&self) -> Result<Box<dyn MetricsSink>, ConfigError> {
        if self.dry_run {
            info!("Dry run: points will be logged, not written");
            return Ok(Box::new(LogSink::new()));
        }
        Ok(Box::new(InfluxSink::new(self.influx.clone())?))
    }

    /// Generator configured with the perturbation probability
    pub fn generator(&self) -> VitalsGenerator {
        VitalsGenerator::new().with_perturbation_probability(self.perturbation_probability)
    }

    /// Random source for the run, seeded when a seed is configured
    pub fn random_source(&self) -> StdRandomSource {
        match self.seed {
            Some(seed) => {
                info!("Using fixed simulation seed {}", seed);
                RngSource::seeded(seed)
            }
            None => RngSource::from_entropy(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: '{}'", key, raw);
            None
        }
    }
}

/// Command line interface
#[derive(Parser, Debug)]
#[command(name = "vital_sim", version, about = "Synthetic patient vital-sign simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// JSON file with the patient profiles
    #[arg(long, global = true)]
    pub profiles: Option<PathBuf>,

    /// InfluxDB base URL
    #[arg(long, global = true)]
    pub influx_url: Option<String>,

    /// InfluxDB organization
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// InfluxDB bucket
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Log points instead of writing them
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate readings on a fixed interval until stopped (default)
    Run {
        /// Seconds between ticks
        #[arg(long)]
        interval: Option<u64>,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Per-rule probability of a condition perturbation
        #[arg(long)]
        perturbation_probability: Option<f64>,
    },

    /// Write one metadata record per patient and exit
    PublishMetadata,
}

impl Cli {
    /// Overlay the flags that were given on top of `config`
    pub fn apply(&self, config: &mut SimulatorConfig) {
        if let Some(path) = &self.profiles {
            config.profiles_path = Some(path.clone());
        }
        if let Some(url) = &self.influx_url {
            config.influx.url = url.clone();
        }
        if let Some(org) = &self.org {
            config.influx.org = org.clone();
        }
        if let Some(bucket) = &self.bucket {
            config.influx.bucket = bucket.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }

        if let Some(Command::Run {
            interval,
            seed,
            ticks,
            perturbation_probability,
        }) = &self.command
        {
            if let Some(interval) = interval {
                config.interval = Duration::from_secs(*interval);
            }
            if seed.is_some() {
                config.seed = *seed;
            }
            if ticks.is_some() {
                config.max_ticks = *ticks;
            }
            if let Some(probability) = perturbation_probability {
                config.perturbation_probability = *probability;
            }
        }
    }

    /// True when the metadata subcommand was chosen
    pub fn publishes_metadata(&self) -> bool {
        matches!(self.command, Some(Command::PublishMetadata))
    }
}
