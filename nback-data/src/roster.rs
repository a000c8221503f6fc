use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use nback_core::{MAX_VISITS, Participant};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::LoginError;

pub const ROSTER_FILE_NAME: &str = "sample_sheet.csv";

const NAME_COLUMN: &str = "Participant";
const ID_COLUMN: &str = "Participant iD";
const COMPLETED_COLUMN: &str = "Trial Number";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    #[serde(rename = "Participant")]
    pub name: String,
    #[serde(rename = "Participant iD")]
    pub participant_id: String,
    /// Visits completed so far, kept raw so a bad cell only fails its own row.
    #[serde(rename = "Trial Number")]
    pub completed: String,
}

/// Participant sheet maintained by the study team. Read-only.
#[derive(Debug, Clone)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoginError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "roster file missing");
            return Err(LoginError::RosterNotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        let roster = Self::from_reader(file)?;
        info!(path = %path.display(), participants = roster.len(), "roster loaded");
        Ok(roster)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoginError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();
        for column in [NAME_COLUMN, ID_COLUMN, COMPLETED_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(LoginError::MalformedHeader(column));
            }
        }
        let entries = reader
            .deserialize::<RosterEntry>()
            .collect::<Result<Vec<_>, _>>()?;
        if entries.is_empty() {
            return Err(LoginError::EmptyRoster);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves "first last" (case-insensitive) to the participant's next
    /// visit.
    pub fn lookup(&self, first: &str, last: &str) -> Result<Participant, LoginError> {
        let first = first.trim().to_lowercase();
        let last = last.trim().to_lowercase();
        if first.is_empty() || last.is_empty() {
            return Err(LoginError::MissingName);
        }
        let full_name = format!("{first} {last}");
        let entry = self
            .entries
            .iter()
            .find(|e| e.name.trim().to_lowercase() == full_name)
            .ok_or_else(|| LoginError::NotFound(full_name.clone()))?;

        let completed: u32 = entry
            .completed
            .trim()
            .parse()
            .map_err(|_| LoginError::InvalidTrialNumber {
                name: full_name.clone(),
                value: entry.completed.clone(),
            })?;
        let version = match u8::try_from(completed.saturating_add(1)) {
            Ok(version) if version <= MAX_VISITS => version,
            _ => {
                info!(participant = %entry.participant_id, completed, "all visits completed");
                return Err(LoginError::AllVisitsComplete);
            }
        };
        debug!(participant = %entry.participant_id, version, "roster match");
        Ok(Participant::new(
            entry.participant_id.trim(),
            version,
            completed == 1,
        ))
    }
}

/// `sample_sheet.csv` beside the executable when present, else in the
/// working directory.
pub fn default_roster_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(ROSTER_FILE_NAME)))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(ROSTER_FILE_NAME))
}
