pub mod engine;
pub mod error;
pub mod flock;
pub mod history;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod systems;
pub mod transition;

pub use engine::{run, run_seeded, Engine, EngineBuilder, EngineSettings, RunOutcome, Verbosity};
pub use error::{SimError, SimResult};
pub use flock::{distribute_evenly, Flock, FlockParams, BRACKETS};
pub use history::{History, Sample};
pub use scenario::{Scenario, ScenarioLoader};
pub use transition::{advance_fast_forward, advance_one_minute, RemainderPlacement, StepReport};
