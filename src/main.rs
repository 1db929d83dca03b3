use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use coopsim::{
    engine::{EngineBuilder, Verbosity},
    report::{ReportWriter, RunReport},
    scenario::{Scenario, ScenarioLoader},
    transition::RemainderPlacement,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Chicken coop population simulator")]
struct Cli {
    /// Initial adult birds
    #[arg(allow_negative_numbers = true)]
    adults: Option<i64>,

    /// Initial juvenile birds
    #[arg(allow_negative_numbers = true)]
    juveniles: Option<i64>,

    /// Seconds between two eggs leaving the dispenser
    #[arg(allow_negative_numbers = true)]
    dispenser_interval: Option<f64>,

    /// Minutes to simulate
    duration: Option<u64>,

    /// Scenario YAML file, used instead of the positional numbers
    #[arg(long, conflicts_with_all = ["adults", "juveniles", "dispenser_interval", "duration"])]
    scenario: Option<PathBuf>,

    /// Override the scenario's duration in minutes
    #[arg(long)]
    minutes: Option<u64>,

    /// Spread the initial juveniles across all age brackets
    #[arg(long)]
    spread: bool,

    /// Seed for the hatching draws (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Where fast-forward hatch remainders go: spread or youngest
    #[arg(long)]
    remainder_placement: Option<RemainderPlacement>,

    /// Print the flock after every advance: quiet, summary or breakdown
    #[arg(long, default_value = "quiet")]
    verbosity: Verbosity,

    /// Print the sampled series as tab separated columns
    #[arg(long)]
    series: bool,

    /// Directory for the JSON run report
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn scenario(&self) -> Result<Scenario> {
        let mut scenario = match &self.scenario {
            Some(path) => ScenarioLoader::new(".").load(path)?,
            None => match (self.adults, self.juveniles, self.dispenser_interval, self.duration) {
                (Some(adults), Some(juveniles), Some(interval), Some(duration)) => {
                    Scenario::from_inputs(adults, juveniles, interval, duration)
                }
                _ => bail!(
                    "expected ADULTS JUVENILES DISPENSER_INTERVAL DURATION or --scenario <FILE>"
                ),
            },
        };
        if self.spread {
            scenario.spread_initial_ages = true;
        }
        if let Some(placement) = self.remainder_placement {
            scenario.remainder_placement = placement;
        }
        Ok(scenario)
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("invalid log level '{level}'"))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let scenario = cli.scenario()?;
    init_logging(cli.log_level.as_deref().unwrap_or(&scenario.logging.level))?;

    let flock = scenario.build_flock().context("Invalid coop parameters")?;
    let minutes = scenario.duration(cli.minutes);
    let seed = scenario.resolve_seed(cli.seed);
    let settings = scenario.engine_settings(seed, cli.verbosity);

    let mut engine = EngineBuilder::new(settings.clone()).build();
    let outcome = engine.run(flock, minutes)?;

    if cli.series {
        println!("minute\tjuveniles\tadults\ttotal");
        for sample in outcome.history.samples() {
            println!(
                "{}\t{}\t{}\t{}",
                sample.minute,
                sample.juveniles,
                sample.adults,
                sample.total()
            );
        }
    }

    if let Some(dir) = &cli.report_dir {
        let report = RunReport::new(&settings, &outcome);
        let path = ReportWriter::new(dir).write(&report)?;
        println!("Report written to {}", path.display());
    }

    println!(
        "Scenario '{}' ran to minute {} (seed {}, cap {} eggs/min). Final flock: {} adults, {} juveniles, {} total.",
        scenario.name,
        outcome.flock.elapsed_minutes(),
        seed,
        outcome.flock.eggs_per_minute_cap(),
        outcome.flock.adults(),
        outcome.flock.juvenile_total(),
        outcome.flock.total()
    );
    Ok(())
}
