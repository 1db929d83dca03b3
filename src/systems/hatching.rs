use rand::Rng;

/// Twice the average laying cycle (7.5 minutes per egg per bird), kept whole
/// so the egg count can be computed without floating point.
pub const LAYING_CYCLE_HALF_MINUTES: u64 = 15;

/// Eggs released over `minutes`: one per bird per 7.5 minutes, truncated,
/// and never more than the dispenser can push out in that window.
pub fn eggs_laid(adults: u64, minutes: u64, eggs_per_minute_cap: u64) -> u64 {
    let laid = adults.saturating_mul(minutes).saturating_mul(2) / LAYING_CYCLE_HALF_MINUTES;
    laid.min(eggs_per_minute_cap.saturating_mul(minutes))
}

/// Rolls a 256-sided die for one egg: 1 gives quadruplets, 2..=32 a single
/// chick, anything higher a dud.
pub fn hatch_trial<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    match rng.gen_range(1..=256u32) {
        1 => 4,
        2..=32 => 1,
        _ => 0,
    }
}

pub fn hatch_eggs<R: Rng + ?Sized>(rng: &mut R, eggs: u64) -> u64 {
    (0..eggs).map(|_| hatch_trial(rng)).sum()
}
