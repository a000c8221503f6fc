use std::path::PathBuf;

use nback_core::SessionPhase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trial count must be positive")]
    NoTrials,
    #[error("back-distance {0} is outside 1..=5")]
    InvalidLevel(usize),
    #[error("target ratio {0} is outside [0, 1]")]
    InvalidRatio(f64),
    #[error("visit version {0} is outside 1..=5")]
    InvalidVersion(u8),
    #[error("no levels configured")]
    NoLevels,
    #[error("training level {0} is not one of the session levels")]
    TrainingLevelNotInSession(usize),
    #[error("{0} must be positive")]
    ZeroDuration(&'static str),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("training is mandatory for first-time participants")]
    TrainingRequired,
    #[error("cannot {action} during {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
