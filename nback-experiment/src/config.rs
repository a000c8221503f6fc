use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sequence::MAX_LEVEL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub training_trials: usize,
    pub experiment_trials: usize,
    pub target_ratio: f64,
    pub levels: Vec<usize>,
    pub training_levels: Vec<usize>,
    pub stimulus_duration_ms: u64,
    pub tutorial_stimulus_duration_ms: u64,
    pub inter_trial_interval_ms: u64,
    pub feedback_duration_ms: u64,
    pub announcement_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            training_trials: 15,
            experiment_trials: 20,
            target_ratio: 0.2,
            levels: vec![1, 2, 3, 4, 5],
            training_levels: vec![1, 2],
            stimulus_duration_ms: 760,
            tutorial_stimulus_duration_ms: 2000,
            inter_trial_interval_ms: 1500,
            feedback_duration_ms: 1500,
            announcement_ms: 1500,
        }
    }
}

impl SessionConfig {
    /// Loads a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.training_trials == 0 || self.experiment_trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if !(0.0..=1.0).contains(&self.target_ratio) {
            return Err(ConfigError::InvalidRatio(self.target_ratio));
        }
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if let Some(&bad) = self
            .levels
            .iter()
            .find(|&&n| n == 0 || n > MAX_LEVEL)
        {
            return Err(ConfigError::InvalidLevel(bad));
        }
        if let Some(&stray) = self
            .training_levels
            .iter()
            .find(|n| !self.levels.contains(n))
        {
            return Err(ConfigError::TrainingLevelNotInSession(stray));
        }
        if self.stimulus_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("stimulus_duration_ms"));
        }
        if self.tutorial_stimulus_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("tutorial_stimulus_duration_ms"));
        }
        Ok(())
    }
}
