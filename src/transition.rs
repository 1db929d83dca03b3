//! Flock transitions.
//!
//! Both transitions consume a [`Flock`] and hand back the next one together
//! with a [`StepReport`]. All randomness comes from the caller's generator.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::flock::{Flock, BRACKETS};
use crate::systems::{age_brackets, eggs_laid, hatch_eggs, LAYING_CYCLE_HALF_MINUTES};

/// Below this many adults the flock is advanced with [`advance_fast_forward`].
pub const FAST_FORWARD_ADULT_LIMIT: u64 = 8;

/// Where the leftover chicks of a fast-forward hatch batch go once every
/// newly opened bracket has received an equal share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPlacement {
    /// One extra chick per bracket, starting with the youngest.
    #[default]
    Spread,
    /// The whole remainder lands in bracket 0. This is what the coop model
    /// historically did because its countdown never advanced.
    Youngest,
}

impl fmt::Display for RemainderPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPlacement::Spread => f.write_str("spread"),
            RemainderPlacement::Youngest => f.write_str("youngest"),
        }
    }
}

impl FromStr for RemainderPlacement {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spread" => Ok(RemainderPlacement::Spread),
            "youngest" => Ok(RemainderPlacement::Youngest),
            other => Err(format!(
                "unknown remainder placement '{other}' (expected 'spread' or 'youngest')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceMode {
    OneMinute,
    FastForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub mode: AdvanceMode,
    pub minutes: u64,
    pub matured: u64,
    pub eggs_laid: u64,
    pub hatched: u64,
}

pub fn advance_one_minute<R: Rng + ?Sized>(
    mut flock: Flock,
    rng: &mut R,
) -> (Flock, StepReport) {
    let matured = age_brackets(&mut flock.juveniles, 1);
    flock.adults += matured;

    let eggs = eggs_laid(flock.adults, 1, flock.eggs_per_minute_cap);
    let hatched = hatch_eggs(rng, eggs);
    flock.juveniles[0] += hatched;
    flock.elapsed_minutes += 1;

    let report = StepReport {
        mode: AdvanceMode::OneMinute,
        minutes: 1,
        matured,
        eggs_laid: eggs,
        hatched,
    };
    (flock, report)
}

/// Number of minutes a fast-forward jump covers from the current state.
///
/// With adults present this is the first minute by which their combined
/// laying could have produced an egg. Without adults the jump lands exactly
/// on the next maturation.
pub fn fast_forward_minutes(flock: &Flock) -> SimResult<usize> {
    if flock.adults >= FAST_FORWARD_ADULT_LIMIT {
        return Err(SimError::PreconditionViolation(format!(
            "fast-forward needs fewer than {FAST_FORWARD_ADULT_LIMIT} adults, flock has {}",
            flock.adults
        )));
    }
    if flock.adults > 0 {
        let minutes = LAYING_CYCLE_HALF_MINUTES / (2 * flock.adults) + 1;
        return Ok(minutes as usize);
    }
    flock
        .oldest_juvenile_age()
        .map(|age| BRACKETS - age)
        .ok_or_else(|| {
            SimError::PreconditionViolation("fast-forward on a flock with no birds".into())
        })
}

pub fn advance_fast_forward<R: Rng + ?Sized>(
    mut flock: Flock,
    rng: &mut R,
    placement: RemainderPlacement,
) -> SimResult<(Flock, StepReport)> {
    let minutes = fast_forward_minutes(&flock)?;
    let matured = age_brackets(&mut flock.juveniles, minutes);
    flock.adults += matured;

    let span = minutes as u64;
    let eggs = eggs_laid(flock.adults, span, flock.eggs_per_minute_cap);
    let hatched = hatch_eggs(rng, eggs);
    let per_bracket = hatched / span;
    let leftover = hatched % span;
    for (age, slot) in flock.juveniles[..minutes].iter_mut().enumerate() {
        *slot += per_bracket;
        if placement == RemainderPlacement::Spread && (age as u64) < leftover {
            *slot += 1;
        }
    }
    if placement == RemainderPlacement::Youngest {
        flock.juveniles[0] += leftover;
    }
    flock.elapsed_minutes += span;

    let report = StepReport {
        mode: AdvanceMode::FastForward,
        minutes: span,
        matured,
        eggs_laid: eggs,
        hatched,
    };
    Ok((flock, report))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::flock::{Brackets, FlockParams};

    fn flock(adults: u64, juveniles: Brackets) -> Flock {
        Flock::with_brackets(adults, juveniles, 100).unwrap()
    }

    fn with(entries: &[(usize, u64)]) -> Brackets {
        let mut brackets = [0; BRACKETS];
        for &(age, count) in entries {
            brackets[age] = count;
        }
        brackets
    }

    #[test]
    fn jump_length_follows_adult_count() {
        let expected = [(1, 8), (2, 4), (3, 3), (4, 2), (5, 2), (6, 2), (7, 2)];
        for (adults, minutes) in expected {
            assert_eq!(
                fast_forward_minutes(&flock(adults, [0; BRACKETS])).unwrap(),
                minutes,
                "adults = {adults}"
            );
        }
    }

    #[test]
    fn adultless_jump_lands_on_next_maturation() {
        assert_eq!(fast_forward_minutes(&flock(0, with(&[(0, 3)]))).unwrap(), 20);
        assert_eq!(
            fast_forward_minutes(&flock(0, with(&[(2, 1), (12, 5)]))).unwrap(),
            8
        );
        assert_eq!(fast_forward_minutes(&flock(0, with(&[(19, 1)]))).unwrap(), 1);
    }

    #[test]
    fn fast_forward_rejects_large_flocks() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let start = flock(8, [0; BRACKETS]);
        let err = advance_fast_forward(start, &mut rng, RemainderPlacement::Spread).unwrap_err();
        assert!(matches!(err, SimError::PreconditionViolation(_)));
    }

    #[test]
    fn one_minute_matures_then_hatches() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let start = flock(7, with(&[(19, 1), (3, 2)]));
        let (next, report) = advance_one_minute(start, &mut rng);
        assert_eq!(report.mode, AdvanceMode::OneMinute);
        assert_eq!(report.matured, 1);
        assert_eq!(next.adults(), 8);
        assert_eq!(report.eggs_laid, 1);
        assert_eq!(next.bracket(0), Some(report.hatched));
        assert_eq!(next.bracket(4), Some(2));
        assert_eq!(next.elapsed_minutes(), 1);
    }

    #[test]
    fn one_minute_without_layers_only_ages() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let start = flock(3, with(&[(0, 4), (10, 1)]));
        let (next, report) = advance_one_minute(start, &mut rng);
        assert_eq!(report.eggs_laid, 0);
        assert_eq!(next.juveniles(), &with(&[(1, 4), (11, 1)]));
    }

    #[test]
    fn one_minute_caps_eggs() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let start = Flock::new(FlockParams {
            adults: 5_000,
            juveniles: 0,
            dispenser_interval_seconds: 6.0,
            spread_initial_ages: false,
        })
        .unwrap();
        let (_, report) = advance_one_minute(start, &mut rng);
        assert_eq!(report.eggs_laid, 10);
        assert!(report.hatched <= 40);
    }

    #[test]
    fn fast_forward_with_adults_shifts_by_jump() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let start = flock(2, with(&[(0, 3), (16, 1), (17, 2)]));
        let (next, report) =
            advance_fast_forward(start, &mut rng, RemainderPlacement::Spread).unwrap();
        assert_eq!(report.minutes, 4);
        assert_eq!(report.matured, 3);
        assert_eq!(next.adults(), 5);
        // floor(5 * 4 / 7.5)
        assert_eq!(report.eggs_laid, 2);
        assert_eq!(next.bracket(4), Some(3));
        assert_eq!(next.elapsed_minutes(), 4);
        let young: u64 = next.juveniles()[..4].iter().sum();
        assert_eq!(young, report.hatched);
    }

    #[test]
    fn adultless_fast_forward_matures_oldest_cohort() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let start = flock(0, with(&[(0, 5)]));
        let (next, report) =
            advance_fast_forward(start, &mut rng, RemainderPlacement::Spread).unwrap();
        assert_eq!(report.minutes, 20);
        assert_eq!(next.adults(), 5);
        // floor(5 * 20 / 7.5)
        assert_eq!(report.eggs_laid, 13);
        assert_eq!(next.juvenile_total(), report.hatched);
        assert_eq!(next.elapsed_minutes(), 20);
    }

    #[test]
    fn spread_placement_distributes_remainder() {
        // Seven adults jump two minutes and lay one egg.
        let mut spread_rng = ChaCha8Rng::seed_from_u64(21);
        let mut youngest_rng = ChaCha8Rng::seed_from_u64(21);
        let start = flock(7, [0; BRACKETS]);

        let (spread, spread_report) =
            advance_fast_forward(start.clone(), &mut spread_rng, RemainderPlacement::Spread)
                .unwrap();
        let (youngest, youngest_report) =
            advance_fast_forward(start, &mut youngest_rng, RemainderPlacement::Youngest)
                .unwrap();
        assert_eq!(spread_report, youngest_report);

        let hatched = spread_report.hatched;
        let span = spread_report.minutes;
        let base = hatched / span;
        let leftover = hatched % span;
        for age in 0..span as usize {
            let expected = base + u64::from((age as u64) < leftover);
            assert_eq!(spread.bracket(age), Some(expected));
        }
        assert_eq!(youngest.bracket(0), Some(base + leftover));
        for age in 1..span as usize {
            assert_eq!(youngest.bracket(age), Some(base));
        }
        assert_eq!(spread.juvenile_total(), youngest.juvenile_total());
    }

    #[test]
    fn fast_forward_respects_window_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for adults in 1..FAST_FORWARD_ADULT_LIMIT {
            let start = Flock::with_brackets(adults, with(&[(0, 9)]), 1).unwrap();
            let (_, report) =
                advance_fast_forward(start, &mut rng, RemainderPlacement::Spread).unwrap();
            assert!(report.eggs_laid <= report.minutes, "adults = {adults}");
        }
    }

    #[test]
    fn placement_parses_from_text() {
        assert_eq!(
            "spread".parse::<RemainderPlacement>().unwrap(),
            RemainderPlacement::Spread
        );
        assert_eq!(
            " Youngest ".parse::<RemainderPlacement>().unwrap(),
            RemainderPlacement::Youngest
        );
        assert!("front".parse::<RemainderPlacement>().is_err());
        assert_eq!(RemainderPlacement::Youngest.to_string(), "youngest");
    }
}
