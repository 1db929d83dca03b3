use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{EngineSettings, Verbosity},
    error::SimResult,
    flock::{Flock, FlockParams},
    transition::RemainderPlacement,
};

fn default_duration_minutes() -> u64 {
    360
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    pub adults: i64,
    pub juveniles: i64,
    pub dispenser_interval_seconds: f64,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u64,
    #[serde(default)]
    pub spread_initial_ages: bool,
    #[serde(default)]
    pub remainder_placement: RemainderPlacement,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Scenario::from_yaml_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Scenario {
    /// Scenario built from the four front-end numbers.
    pub fn from_inputs(
        adults: i64,
        juveniles: i64,
        dispenser_interval_seconds: f64,
        duration_minutes: u64,
    ) -> Self {
        Self {
            name: "coop".to_string(),
            description: None,
            seed: None,
            adults,
            juveniles,
            dispenser_interval_seconds,
            duration_minutes,
            spread_initial_ages: false,
            remainder_placement: RemainderPlacement::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        Ok(scenario)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn params(&self) -> FlockParams {
        FlockParams {
            adults: self.adults,
            juveniles: self.juveniles,
            dispenser_interval_seconds: self.dispenser_interval_seconds,
            spread_initial_ages: self.spread_initial_ages,
        }
    }

    pub fn build_flock(&self) -> SimResult<Flock> {
        Flock::new(self.params())
    }

    pub fn duration(&self, override_minutes: Option<u64>) -> u64 {
        override_minutes.unwrap_or(self.duration_minutes)
    }

    /// Explicit seed, the scenario's seed, or fresh entropy, in that order.
    pub fn resolve_seed(&self, override_seed: Option<u64>) -> u64 {
        override_seed
            .or(self.seed)
            .unwrap_or_else(rand::random)
    }

    pub fn engine_settings(&self, seed: u64, verbosity: Verbosity) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            seed,
            remainder_placement: self.remainder_placement,
            verbosity,
        }
    }
}
