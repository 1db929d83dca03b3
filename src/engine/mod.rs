use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::SimResult,
    flock::{Flock, FlockParams},
    history::{History, Sample},
    rng::{RngManager, HATCHING_STREAM},
    transition::{
        advance_fast_forward, advance_one_minute, AdvanceMode, RemainderPlacement, StepReport,
        FAST_FORWARD_ADULT_LIMIT,
    },
};

/// How much of the flock is printed after every advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    #[default]
    Quiet,
    Summary,
    Breakdown,
}

impl Verbosity {
    pub fn render(self, flock: &Flock) -> Option<String> {
        match self {
            Verbosity::Quiet => None,
            Verbosity::Summary => Some(flock.summary()),
            Verbosity::Breakdown => Some(flock.to_string()),
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" => Ok(Verbosity::Quiet),
            "summary" => Ok(Verbosity::Summary),
            "breakdown" => Ok(Verbosity::Breakdown),
            other => Err(format!(
                "unknown verbosity '{other}' (expected 'quiet', 'summary' or 'breakdown')"
            )),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Summary => "summary",
            Verbosity::Breakdown => "breakdown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub remainder_placement: RemainderPlacement,
    pub verbosity: Verbosity,
}

impl EngineSettings {
    pub fn new(scenario_name: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            seed,
            remainder_placement: RemainderPlacement::default(),
            verbosity: Verbosity::default(),
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn with_remainder_placement(mut self, placement: RemainderPlacement) -> Self {
        self.settings.remainder_placement = placement;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.settings.verbosity = verbosity;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            settings: self.settings,
        }
    }
}

/// Passed to the run hook after every recorded sample.
///
/// `report` is `None` only for the initial sample.
pub struct Tick<'a> {
    pub sample: Sample,
    pub flock: &'a Flock,
    pub report: Option<&'a StepReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub fast_forward_jumps: u64,
    pub one_minute_steps: u64,
    pub matured: u64,
    pub eggs_laid: u64,
    pub hatched: u64,
}

impl RunStats {
    fn absorb(&mut self, report: &StepReport) {
        match report.mode {
            AdvanceMode::FastForward => self.fast_forward_jumps += 1,
            AdvanceMode::OneMinute => self.one_minute_steps += 1,
        }
        self.matured += report.matured;
        self.eggs_laid += report.eggs_laid;
        self.hatched += report.hatched;
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub flock: Flock,
    pub history: History,
    pub stats: RunStats,
}

pub struct Engine {
    rng: RngManager,
    settings: EngineSettings,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn run(&mut self, flock: Flock, duration_minutes: u64) -> SimResult<RunOutcome> {
        self.run_with_hook(flock, duration_minutes, |_| {})
    }

    /// Advances `flock` until `duration_minutes` have elapsed.
    ///
    /// Fast-forward jumps are used while the flock has fewer than eight
    /// adults; a jump may carry the clock past `duration_minutes`. After that
    /// the flock moves one minute at a time.
    pub fn run_with_hook<F>(
        &mut self,
        mut flock: Flock,
        duration_minutes: u64,
        mut hook: F,
    ) -> SimResult<RunOutcome>
    where
        F: FnMut(&Tick<'_>),
    {
        let placement = self.settings.remainder_placement;
        let verbosity = self.settings.verbosity;
        let mut rng = self.rng.stream(HATCHING_STREAM);
        let mut history = History::new();
        let mut stats = RunStats::default();

        let initial = Sample::of(&flock);
        history.record(initial);
        hook(&Tick {
            sample: initial,
            flock: &flock,
            report: None,
        });

        while flock.adults() < FAST_FORWARD_ADULT_LIMIT
            && flock.elapsed_minutes() < duration_minutes
        {
            let (next, report) = advance_fast_forward(flock, &mut rng, placement)?;
            flock = next;
            record(&mut history, &mut stats, &flock, &report, verbosity, &mut hook);
        }
        while flock.elapsed_minutes() < duration_minutes {
            let (next, report) = advance_one_minute(flock, &mut rng);
            flock = next;
            record(&mut history, &mut stats, &flock, &report, verbosity, &mut hook);
        }

        tracing::info!(
            scenario = %self.settings.scenario_name,
            minutes = flock.elapsed_minutes(),
            adults = flock.adults(),
            juveniles = flock.juvenile_total(),
            samples = history.len(),
            fast_forward_jumps = stats.fast_forward_jumps,
            "simulation finished"
        );

        Ok(RunOutcome {
            flock,
            history,
            stats,
        })
    }
}

fn record<F>(
    history: &mut History,
    stats: &mut RunStats,
    flock: &Flock,
    report: &StepReport,
    verbosity: Verbosity,
    hook: &mut F,
) where
    F: FnMut(&Tick<'_>),
{
    let sample = Sample::of(flock);
    history.record(sample);
    stats.absorb(report);
    tracing::debug!(
        minute = sample.minute,
        adults = sample.adults,
        juveniles = sample.juveniles,
        mode = ?report.mode,
        eggs_laid = report.eggs_laid,
        hatched = report.hatched,
        "flock advanced"
    );
    if let Some(text) = verbosity.render(flock) {
        println!("{text}");
    }
    hook(&Tick {
        sample,
        flock,
        report: Some(report),
    });
}

/// Runs a coop from raw parameters with a seed drawn from process entropy.
pub fn run(
    initial_adults: i64,
    initial_juveniles: i64,
    dispenser_interval_seconds: f64,
    duration_minutes: u64,
    spread_initial_ages: bool,
) -> SimResult<History> {
    run_seeded(
        initial_adults,
        initial_juveniles,
        dispenser_interval_seconds,
        duration_minutes,
        spread_initial_ages,
        rand::random(),
    )
}

pub fn run_seeded(
    initial_adults: i64,
    initial_juveniles: i64,
    dispenser_interval_seconds: f64,
    duration_minutes: u64,
    spread_initial_ages: bool,
    seed: u64,
) -> SimResult<History> {
    let flock = Flock::new(FlockParams {
        adults: initial_adults,
        juveniles: initial_juveniles,
        dispenser_interval_seconds,
        spread_initial_ages,
    })?;
    let mut engine = EngineBuilder::new(EngineSettings::new("coop", seed)).build();
    Ok(engine.run(flock, duration_minutes)?.history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn engine(seed: u64) -> Engine {
        EngineBuilder::new(EngineSettings::new("test", seed)).build()
    }

    fn flock(adults: i64, juveniles: i64, spread: bool) -> Flock {
        Flock::new(FlockParams {
            adults,
            juveniles,
            dispenser_interval_seconds: 0.6,
            spread_initial_ages: spread,
        })
        .unwrap()
    }

    #[test]
    fn first_sample_is_initial_state() {
        let outcome = engine(1).run(flock(1, 0, false), 60).unwrap();
        assert_eq!(
            outcome.history.sample(0),
            Some(Sample {
                minute: 0,
                adults: 1,
                juveniles: 0
            })
        );
    }

    #[test]
    fn large_flock_steps_one_minute_at_a_time() {
        let mut modes = Vec::new();
        let outcome = engine(3)
            .run_with_hook(flock(10, 0, false), 1, |tick| {
                modes.push(tick.report.map(|r| r.mode));
            })
            .unwrap();
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history.timestamps(), &[0, 1]);
        assert_eq!(modes, vec![None, Some(AdvanceMode::OneMinute)]);
        assert_eq!(outcome.stats.fast_forward_jumps, 0);
    }

    #[test]
    fn small_flock_fast_forwards_until_eight_adults() {
        let mut saw_one_minute = false;
        engine(5)
            .run_with_hook(flock(1, 30, true), 240, |tick| {
                if let Some(report) = tick.report {
                    match report.mode {
                        AdvanceMode::FastForward => {
                            assert!(!saw_one_minute, "fast-forward after one-minute step");
                        }
                        AdvanceMode::OneMinute => {
                            saw_one_minute = true;
                        }
                    }
                }
            })
            .unwrap();
        assert!(saw_one_minute);
    }

    #[test]
    fn zero_duration_records_only_initial_sample() {
        let outcome = engine(1).run(flock(2, 3, false), 0).unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.flock.elapsed_minutes(), 0);
    }

    #[test]
    fn fast_forward_may_overshoot_duration() {
        // One adult jumps eight minutes at a time.
        let outcome = engine(1).run(flock(1, 0, false), 3).unwrap();
        assert_eq!(outcome.history.timestamps(), &[0, 8]);
    }

    #[test]
    fn same_seed_same_history() {
        let a = run_seeded(2, 40, 0.6, 300, true, 77).unwrap();
        let b = run_seeded(2, 40, 0.6, 300, true, 77).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn run_rejects_bad_parameters() {
        assert!(matches!(
            run(-1, 0, 0.6, 10, false),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            run(0, 0, 0.6, 10, false),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            run(1, 0, 0.0, 10, false),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn stats_match_history() {
        let outcome = engine(9).run(flock(9, 0, false), 50).unwrap();
        assert_eq!(outcome.stats.one_minute_steps, 50);
        assert_eq!(
            outcome.flock.total(),
            9 + outcome.stats.hatched,
            "nothing dies, so the flock grows by exactly the hatched chicks"
        );
    }

    #[test]
    fn verbosity_renders_requested_detail() {
        let flock = flock(3, 1, false);
        assert_eq!(Verbosity::Quiet.render(&flock), None);
        let summary = Verbosity::Summary.render(&flock).unwrap();
        assert!(!summary.contains("breakdown"));
        let breakdown = Verbosity::Breakdown.render(&flock).unwrap();
        assert!(breakdown.contains("Juvenile breakdown:"));
        assert_eq!("Summary".parse::<Verbosity>().unwrap(), Verbosity::Summary);
    }
}
