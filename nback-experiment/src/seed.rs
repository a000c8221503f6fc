use nback_core::MAX_VISITS;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::ConfigError;

/// One seed word per visit, so every participant sees the same sequence on
/// the same visit.
pub const SEEDS: [&str; MAX_VISITS as usize] = ["alpha", "bravo", "charlie", "delta", "echo"];

/// Sum of the character codes of `word`.
pub fn seed_value(word: &str) -> u64 {
    word.chars().map(|c| c as u64).sum()
}

pub fn seed_word(version: u8) -> Result<&'static str, ConfigError> {
    match version {
        1..=MAX_VISITS => Ok(SEEDS[usize::from(version) - 1]),
        _ => Err(ConfigError::InvalidVersion(version)),
    }
}

pub fn seeded_rng(word: &str) -> StdRng {
    StdRng::seed_from_u64(seed_value(word))
}

pub fn rng_for_version(version: u8) -> Result<StdRng, ConfigError> {
    Ok(seeded_rng(seed_word(version)?))
}
