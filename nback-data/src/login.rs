use nback_core::{MAX_VISITS, Participant};
use tracing::debug;

use crate::error::LoginError;

/// Validates a manually typed participant id and visit number.
///
/// `first_time` follows the visit number alone (visit 1). This can disagree
/// with the roster path, which derives it from the completed count.
pub fn manual_login(participant_id: &str, version: &str) -> Result<Participant, LoginError> {
    let participant_id = participant_id.trim();
    let version = version.trim();
    if participant_id.is_empty() || version.is_empty() {
        return Err(LoginError::MissingField);
    }
    if participant_id.contains(['/', '\\']) || participant_id.contains("..") {
        return Err(LoginError::InvalidParticipantId(participant_id.to_string()));
    }
    let parsed: u8 = version
        .parse()
        .map_err(|_| LoginError::InvalidVersion(version.to_string()))?;
    if !(1..=MAX_VISITS).contains(&parsed) {
        return Err(LoginError::InvalidVersion(version.to_string()));
    }
    debug!(participant_id, version = parsed, "manual login");
    Ok(Participant::new(participant_id, parsed, parsed == 1))
}
