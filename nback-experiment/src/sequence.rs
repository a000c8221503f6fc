use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::seed::rng_for_version;
use crate::trial::{Block, Trial};

/// Stimuli are the digits 0..DIGITS.
pub const DIGITS: u8 = 10;
pub const MAX_LEVEL: usize = 5;

/// Number of targets placed in a block of `trial_count` trials at
/// back-distance `n`. Zero when no position has an n-back reference.
pub fn target_count(trial_count: usize, n: usize, ratio: f64) -> usize {
    if trial_count <= n {
        return 0;
    }
    let wanted = ((trial_count as f64 * ratio).floor() as usize).max(1);
    wanted.min(trial_count - n)
}

/// Builds one block of `trial_count` trials at back-distance `n`.
///
/// The first `n` trials are never targets. Target positions are sampled from
/// `n..trial_count` without replacement; a target repeats the digit `n` back
/// and every other trial is guaranteed to differ from it.
pub fn generate_block<R: Rng + ?Sized>(
    n: usize,
    trial_count: usize,
    ratio: f64,
    training: bool,
    rng: &mut R,
) -> Result<Block, ConfigError> {
    if trial_count == 0 {
        return Err(ConfigError::NoTrials);
    }
    if n == 0 || n > MAX_LEVEL {
        return Err(ConfigError::InvalidLevel(n));
    }
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ConfigError::InvalidRatio(ratio));
    }

    let mut is_target = vec![false; trial_count];
    let count = target_count(trial_count, n, ratio);
    if count > 0 {
        for offset in index::sample(rng, trial_count - n, count) {
            is_target[n + offset] = true;
        }
    }

    let mut trials: Vec<Trial> = Vec::with_capacity(trial_count);
    for i in 0..trial_count {
        let trial = if i < n {
            Trial::new(rng.random_range(0..DIGITS), false)
        } else if is_target[i] {
            Trial::new(trials[i - n].digit, true)
        } else {
            let back = trials[i - n].digit;
            let draw = rng.random_range(0..DIGITS - 1);
            Trial::new(if draw >= back { draw + 1 } else { draw }, false)
        };
        trials.push(trial);
    }

    debug!(n, trial_count, targets = count, training, "generated block");
    Ok(Block {
        n,
        trials,
        training,
    })
}

/// Blocks for one session of visit `version`, one per configured level in
/// order. A single seeded source feeds all blocks.
pub fn prepare_blocks(
    config: &SessionConfig,
    version: u8,
    training: bool,
) -> Result<Vec<Block>, ConfigError> {
    let mut rng = rng_for_version(version)?;
    let (levels, trial_count) = if training {
        (&config.training_levels, config.training_trials)
    } else {
        (&config.levels, config.experiment_trials)
    };
    levels
        .iter()
        .map(|&n| generate_block(n, trial_count, config.target_ratio, training, &mut rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seeded_rng;

    fn check_invariants(block: &Block) {
        let n = block.n;
        for (i, trial) in block.trials.iter().enumerate() {
            assert!(trial.digit < DIGITS);
            if i < n {
                assert!(!trial.is_target, "position {i} has no {n}-back reference");
            } else if trial.is_target {
                assert_eq!(trial.digit, block.trials[i - n].digit);
            } else {
                assert_ne!(trial.digit, block.trials[i - n].digit);
            }
        }
    }

    #[test]
    fn generated_blocks_hold_nback_invariants() {
        let mut rng = seeded_rng("charlie");
        for n in 1..=MAX_LEVEL {
            for trial_count in [n + 1, 10, 15, 20, 57] {
                let block = generate_block(n, trial_count, 0.2, false, &mut rng).unwrap();
                assert_eq!(block.len(), trial_count);
                check_invariants(&block);
                assert_eq!(
                    block.target_positions().len(),
                    ((trial_count as f64 * 0.2).floor() as usize).max(1)
                );
            }
        }
    }

    #[test]
    fn same_seed_reproduces_sequence() {
        let a = generate_block(1, 15, 0.2, false, &mut seeded_rng("alpha")).unwrap();
        let b = generate_block(1, 15, 0.2, false, &mut seeded_rng("alpha")).unwrap();
        assert_eq!(a, b);
        let c = generate_block(1, 15, 0.2, false, &mut seeded_rng("bravo")).unwrap();
        assert_ne!(a.trials, c.trials);
    }

    #[test]
    fn short_blocks_have_no_targets() {
        let mut rng = seeded_rng("delta");
        let block = generate_block(3, 3, 0.2, false, &mut rng).unwrap();
        assert!(block.target_positions().is_empty());
        let block = generate_block(5, 2, 0.2, false, &mut rng).unwrap();
        assert_eq!(block.len(), 2);
        assert!(block.target_positions().is_empty());
    }

    #[test]
    fn at_least_one_target_when_possible() {
        let block = generate_block(1, 3, 0.2, false, &mut seeded_rng("echo")).unwrap();
        assert_eq!(block.target_positions().len(), 1);
        check_invariants(&block);
    }

    #[test]
    fn target_count_is_clamped_to_eligible_positions() {
        assert_eq!(target_count(4, 2, 1.0), 2);
        assert_eq!(target_count(20, 1, 0.2), 4);
        assert_eq!(target_count(15, 2, 0.2), 3);
        assert_eq!(target_count(2, 2, 0.5), 0);
        let block = generate_block(2, 4, 1.0, false, &mut seeded_rng("alpha")).unwrap();
        assert_eq!(block.target_positions(), vec![2, 3]);
        check_invariants(&block);
    }

    #[test]
    fn rejects_empty_blocks() {
        let err = generate_block(1, 0, 0.2, false, &mut seeded_rng("alpha")).unwrap_err();
        assert!(matches!(err, ConfigError::NoTrials));
        let err = generate_block(6, 10, 0.2, false, &mut seeded_rng("alpha")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLevel(6)));
    }

    #[test]
    fn prepares_one_block_per_level() {
        let config = SessionConfig::default();
        let main = prepare_blocks(&config, 2, false).unwrap();
        assert_eq!(main.iter().map(|b| b.n).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(main.iter().all(|b| b.len() == 20 && !b.training));

        let training = prepare_blocks(&config, 2, true).unwrap();
        assert_eq!(training.iter().map(|b| b.n).collect::<Vec<_>>(), vec![1, 2]);
        assert!(training.iter().all(|b| b.len() == 15 && b.training));

        assert_eq!(main, prepare_blocks(&config, 2, false).unwrap());
        assert!(prepare_blocks(&config, 6, false).is_err());
    }
}
