//! Flock state: adult birds plus juveniles bucketed by age in minutes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Number of juvenile age brackets. Bracket `k` holds chicks aged `k` minutes.
pub const BRACKETS: usize = 20;

/// Age of the last juvenile bracket; chicks here become adults on the next minute.
pub const MATURE_AGE: usize = BRACKETS - 1;

pub type Brackets = [u64; BRACKETS];

/// Raw construction inputs, validated by [`Flock::new`].
///
/// Counts are signed so that out-of-range input from a front end can be
/// reported as [`SimError::InvalidParameter`] instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlockParams {
    pub adults: i64,
    pub juveniles: i64,
    pub dispenser_interval_seconds: f64,
    #[serde(default)]
    pub spread_initial_ages: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flock {
    pub(crate) adults: u64,
    pub(crate) juveniles: Brackets,
    pub(crate) elapsed_minutes: u64,
    pub(crate) eggs_per_minute_cap: u64,
}

impl Flock {
    pub fn new(params: FlockParams) -> SimResult<Self> {
        let FlockParams {
            adults,
            juveniles,
            dispenser_interval_seconds,
            spread_initial_ages,
        } = params;

        if adults < 0 || juveniles < 0 {
            return Err(SimError::InvalidParameter(format!(
                "initial adults and juveniles must be non-negative (got {adults} and {juveniles})"
            )));
        }
        if adults.saturating_add(juveniles) < 1 {
            return Err(SimError::InvalidParameter(
                "sum of initial adults and juveniles must be positive".into(),
            ));
        }
        let eggs_per_minute_cap = eggs_per_minute_cap(dispenser_interval_seconds)?;

        let juveniles = juveniles as u64;
        let brackets = if spread_initial_ages {
            let spread = distribute_evenly(juveniles, BRACKETS)?;
            let mut brackets = [0; BRACKETS];
            brackets.copy_from_slice(&spread);
            brackets
        } else {
            let mut brackets = [0; BRACKETS];
            brackets[0] = juveniles;
            brackets
        };

        Ok(Self {
            adults: adults as u64,
            juveniles: brackets,
            elapsed_minutes: 0,
            eggs_per_minute_cap,
        })
    }

    /// Builds a flock from an explicit bracket layout at minute zero.
    pub fn with_brackets(
        adults: u64,
        juveniles: Brackets,
        eggs_per_minute_cap: u64,
    ) -> SimResult<Self> {
        if eggs_per_minute_cap == 0 {
            return Err(SimError::InvalidParameter(
                "eggs per minute cap must be at least 1".into(),
            ));
        }
        let flock = Self {
            adults,
            juveniles,
            elapsed_minutes: 0,
            eggs_per_minute_cap,
        };
        if flock.total() == 0 {
            return Err(SimError::InvalidParameter(
                "sum of adults and juveniles must be positive".into(),
            ));
        }
        Ok(flock)
    }

    pub fn adults(&self) -> u64 {
        self.adults
    }

    pub fn juveniles(&self) -> &Brackets {
        &self.juveniles
    }

    pub fn bracket(&self, age: usize) -> Option<u64> {
        self.juveniles.get(age).copied()
    }

    pub fn juvenile_total(&self) -> u64 {
        self.juveniles.iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.adults + self.juvenile_total()
    }

    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_minutes
    }

    pub fn eggs_per_minute_cap(&self) -> u64 {
        self.eggs_per_minute_cap
    }

    /// Age of the oldest bracket holding at least one chick.
    pub fn oldest_juvenile_age(&self) -> Option<usize> {
        self.juveniles.iter().rposition(|&count| count > 0)
    }

    pub fn summary(&self) -> String {
        let adults = self.adults;
        let juveniles = self.juvenile_total();
        format!(
            "At time {} min,\nAdults: {}\nJuveniles: {}\nTotal: {}\n",
            self.elapsed_minutes,
            adults,
            juveniles,
            adults + juveniles
        )
    }
}

impl fmt::Display for Flock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())?;
        writeln!(f, "Juvenile breakdown:")?;
        for (age, count) in self.juveniles.iter().enumerate() {
            writeln!(f, "  {age:>2}: {count}")?;
        }
        Ok(())
    }
}

/// Dispenser throughput in eggs per minute, truncated to a whole egg.
pub fn eggs_per_minute_cap(dispenser_interval_seconds: f64) -> SimResult<u64> {
    if !dispenser_interval_seconds.is_finite() || dispenser_interval_seconds <= 0.0 {
        return Err(SimError::InvalidParameter(format!(
            "dispenser interval must be a positive number of seconds (got {dispenser_interval_seconds})"
        )));
    }
    let cap = (60.0 / dispenser_interval_seconds).floor();
    if cap < 1.0 {
        return Err(SimError::InvalidParameter(format!(
            "dispenser interval of {dispenser_interval_seconds}s releases less than one egg per minute"
        )));
    }
    Ok(cap as u64)
}

/// Splits `total` into `slots` parts that differ by at most one.
///
/// Leftover units are scattered at `round(i * slots / remainder)` rather than
/// stacked at the front. Ties round to even.
pub fn distribute_evenly(total: u64, slots: usize) -> SimResult<Vec<u64>> {
    if slots == 0 {
        return Err(SimError::InvalidParameter(
            "cannot distribute over zero slots".into(),
        ));
    }
    let base = total / slots as u64;
    let remainder = (total % slots as u64) as usize;
    let mut result = vec![base; slots];
    if remainder > 0 {
        let step = slots as f64 / remainder as f64;
        for i in 0..remainder {
            let index = (i as f64 * step).round_ties_even() as usize;
            result[index] += 1;
        }
    }
    Ok(result)
}
