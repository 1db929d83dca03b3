mod hatching;
mod maturation;

pub use hatching::{eggs_laid, hatch_eggs, hatch_trial, LAYING_CYCLE_HALF_MINUTES};
pub use maturation::age_brackets;
