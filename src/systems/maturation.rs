use crate::flock::{Brackets, BRACKETS};

/// Ages every bracket by `minutes` and returns how many chicks reached adulthood.
///
/// Chicks in the top `minutes` brackets mature; the rest move up by `minutes`
/// and the youngest `minutes` brackets are left empty. Steps longer than the
/// juvenile window mature everybody.
pub fn age_brackets(brackets: &mut Brackets, minutes: usize) -> u64 {
    let minutes = minutes.min(BRACKETS);
    let matured = brackets[BRACKETS - minutes..].iter().sum();
    brackets.copy_within(0..BRACKETS - minutes, minutes);
    brackets[..minutes].fill(0);
    matured
}
