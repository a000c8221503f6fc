use std::path::PathBuf;

use thiserror::Error;

/// Recoverable login failures, shown to the participant as a message.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Please enter both names")]
    MissingName,
    #[error("Please fill all fields")]
    MissingField,
    #[error("roster file {0} not found")]
    RosterNotFound(PathBuf),
    #[error("invalid roster format: missing column {0:?}")]
    MalformedHeader(&'static str),
    #[error("roster is empty")]
    EmptyRoster,
    #[error("participant {0:?} not found in roster")]
    NotFound(String),
    #[error("invalid trial number {value:?} for {name:?}")]
    InvalidTrialNumber { name: String, value: String },
    #[error("invalid participant id {0:?}: path separators are not allowed")]
    InvalidParticipantId(String),
    #[error("invalid version {0:?}: must be an integer between 1 and 5")]
    InvalidVersion(String),
    #[error("all visits already completed")]
    AllVisitsComplete,
    #[error("failed to read roster: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no experimental data to save")]
    NoExperimentalData,
    #[error("no documents directory available")]
    NoDocumentsDir,
    #[error("could not save data to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode data: {0}")]
    Csv(#[from] csv::Error),
}
