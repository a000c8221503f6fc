use std::io::Write;
use std::path::{Path, PathBuf};

use nback_core::TrialRecord;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::ExportError;

pub const EXPORT_HEADERS: [&str; 13] = [
    "Participant ID",
    "Version",
    "Block N",
    "Trial Index",
    "Stimulus Digit",
    "Is Target",
    "Response",
    "Accuracy",
    "Reaction Time (ms)",
    "Stimulus Onset (ms)",
    "Response Time (ms)",
    "Training Block",
    "Timestamp",
];

/// One output row. Booleans are written `True`/`False` and missing values as
/// empty cells, the format downstream analysis scripts already read.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Participant ID")]
    participant_id: &'a str,
    #[serde(rename = "Version")]
    version: u8,
    #[serde(rename = "Block N")]
    block_n: usize,
    #[serde(rename = "Trial Index")]
    trial_index: usize,
    #[serde(rename = "Stimulus Digit")]
    stimulus_digit: u8,
    #[serde(rename = "Is Target")]
    is_target: &'static str,
    #[serde(rename = "Response")]
    response: &'static str,
    #[serde(rename = "Accuracy")]
    accuracy: Option<&'static str>,
    #[serde(rename = "Reaction Time (ms)")]
    reaction_time_ms: Option<u64>,
    #[serde(rename = "Stimulus Onset (ms)")]
    stimulus_onset_ms: u64,
    #[serde(rename = "Response Time (ms)")]
    response_time_ms: Option<u64>,
    #[serde(rename = "Training Block")]
    training: &'static str,
    #[serde(rename = "Timestamp")]
    timestamp: &'a str,
}

fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

impl<'a> From<&'a TrialRecord> for ExportRow<'a> {
    fn from(r: &'a TrialRecord) -> Self {
        Self {
            participant_id: &r.participant_id,
            version: r.version,
            block_n: r.block_n,
            trial_index: r.trial_index,
            stimulus_digit: r.stimulus_digit,
            is_target: flag(r.is_target),
            response: flag(r.response),
            accuracy: r.accuracy.map(flag),
            reaction_time_ms: r.reaction_time_ms,
            stimulus_onset_ms: r.stimulus_onset_ms,
            response_time_ms: r.response_time_ms,
            training: flag(r.training),
            timestamp: &r.timestamp,
        }
    }
}

/// Characters outside `[A-Za-z0-9._-]` in the id become `_`, so the name
/// always stays a single path component.
pub fn export_file_name(participant_id: &str, version: u8) -> String {
    let id: String = participant_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("nback_{id}_v{version}.csv")
}

/// The user's Documents folder.
pub fn documents_dir() -> Result<PathBuf, ExportError> {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .ok_or(ExportError::NoDocumentsDir)
}

/// Writes the header and every non-training record; returns the row count.
pub fn write_records<W: Write>(records: &[TrialRecord], writer: W) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for record in records.iter().filter(|r| !r.training) {
        csv.serialize(ExportRow::from(record))?;
        rows += 1;
    }
    if rows == 0 {
        csv.write_record(EXPORT_HEADERS)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(rows)
}

/// Exports the session's non-training records to
/// `dir/nback_{id}_v{version}.csv`, replacing the file atomically.
pub fn export_records(records: &[TrialRecord], dir: &Path) -> Result<PathBuf, ExportError> {
    let Some(first) = records.iter().find(|r| !r.training) else {
        warn!(records = records.len(), "nothing to export");
        return Err(ExportError::NoExperimentalData);
    };
    let path = dir.join(export_file_name(&first.participant_id, first.version));
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    let rows = write_records(records, tmp.as_file_mut())?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    info!(path = %path.display(), rows, "session exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(trial_index: usize, training: bool) -> TrialRecord {
        TrialRecord {
            participant_id: "P9".into(),
            version: 3,
            block_n: 2,
            trial_index,
            stimulus_digit: 7,
            is_target: true,
            response: true,
            accuracy: if training { None } else { Some(true) },
            reaction_time_ms: Some(412),
            stimulus_onset_ms: 1_700_000_000_000,
            response_time_ms: Some(1_700_000_000_412),
            training,
            timestamp: "2024-01-01 10:00:00".into(),
        }
    }

    #[test]
    fn writes_python_style_rows() {
        let mut out = Vec::new();
        let rows = write_records(&[record(0, true), record(1, false)], &mut out).unwrap();
        assert_eq!(rows, 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), EXPORT_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "P9,3,2,1,7,True,True,True,412,1700000000000,1700000000412,False,2024-01-01 10:00:00"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn missing_values_are_empty_cells() {
        let mut r = record(0, false);
        r.response = false;
        r.accuracy = None;
        r.reaction_time_ms = None;
        r.response_time_ms = None;
        let mut out = Vec::new();
        write_records(&[r], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(",True,False,,,1700000000000,,False,"));
    }

    #[test]
    fn file_name_uses_id_and_version() {
        assert_eq!(export_file_name("P9", 3), "nback_P9_v3.csv");
    }

    #[test]
    fn file_name_cannot_leave_the_directory() {
        assert_eq!(export_file_name("../../etc/P1", 2), "nback_.._.._etc_P1_v2.csv");
        assert_eq!(export_file_name(r"C:\x y", 1), "nback_C__x_y_v1.csv");

        let dir = tempfile::tempdir().unwrap();
        let mut r = record(0, false);
        r.participant_id = "../escape".into();
        let path = export_records(&[r], dir.path()).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.exists());
    }
}
