use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{EngineSettings, RunOutcome, RunStats},
    flock::Flock,
    history::History,
    transition::RemainderPlacement,
};

/// Summary of a finished run, written as JSON for charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub eggs_per_minute_cap: u64,
    pub remainder_placement: RemainderPlacement,
    pub final_state: Flock,
    pub stats: RunStats,
    pub history: History,
}

impl RunReport {
    pub fn new(settings: &EngineSettings, outcome: &RunOutcome) -> Self {
        Self {
            scenario: settings.scenario_name.clone(),
            generated_at: Utc::now(),
            seed: settings.seed,
            eggs_per_minute_cap: outcome.flock.eggs_per_minute_cap(),
            remainder_placement: settings.remainder_placement,
            final_state: outcome.flock.clone(),
            stats: outcome.stats.clone(),
            history: outcome.history.clone(),
        }
    }
}

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Writes `<dir>/<scenario>/report.json`, replacing any earlier report.
    pub fn write(&self, report: &RunReport) -> Result<PathBuf> {
        let dir = self.dir.join(&report.scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        let path = dir.join("report.json");
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<RunReport> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        let report = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse report {}", path.display()))?;
        Ok(report)
    }
}
