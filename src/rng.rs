use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream used for every egg hatch trial.
pub const HATCHING_STREAM: &str = "hatching";

/// Hands out named random streams, each seeded from one master seed.
///
/// A stream keeps its position for the lifetime of the manager, so two
/// managers built from the same seed replay identical draws.
pub struct RngManager {
    seed: u64,
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let master = &mut self.master;
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        });
        StreamRng { inner: entry }
    }
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StreamRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
