use serde::{Deserialize, Serialize};

use crate::flock::Flock;

/// One observation of the flock, taken after every advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub minute: u64,
    pub adults: u64,
    pub juveniles: u64,
}

impl Sample {
    pub fn of(flock: &Flock) -> Self {
        Self {
            minute: flock.elapsed_minutes(),
            adults: flock.adults(),
            juveniles: flock.juvenile_total(),
        }
    }

    pub fn total(&self) -> u64 {
        self.adults + self.juveniles
    }
}

/// Parallel adult, juvenile and timestamp series of one run.
///
/// The three vectors always have the same length and timestamps never
/// decrease, which is what chart front ends rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    adults: Vec<u64>,
    juveniles: Vec<u64>,
    timestamps: Vec<u64>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: Sample) {
        debug_assert!(self.timestamps.last().map_or(true, |&t| t <= sample.minute));
        self.adults.push(sample.adults);
        self.juveniles.push(sample.juveniles);
        self.timestamps.push(sample.minute);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn adults(&self) -> &[u64] {
        &self.adults
    }

    pub fn juveniles(&self) -> &[u64] {
        &self.juveniles
    }

    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    /// Stacked total (juveniles + adults) per sample.
    pub fn totals(&self) -> Vec<u64> {
        self.adults
            .iter()
            .zip(&self.juveniles)
            .map(|(adults, juveniles)| adults + juveniles)
            .collect()
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        Some(Sample {
            minute: *self.timestamps.get(index)?,
            adults: *self.adults.get(index)?,
            juveniles: *self.juveniles.get(index)?,
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).filter_map(|index| self.sample(index))
    }

    pub fn last(&self) -> Option<Sample> {
        self.len().checked_sub(1).and_then(|index| self.sample(index))
    }

    /// Splits into `(adults, juveniles, timestamps)`.
    pub fn into_parts(self) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        (self.adults, self.juveniles, self.timestamps)
    }
}
