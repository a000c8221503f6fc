use serde::{Deserialize, Serialize};

/// Trial state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    /// Pause before the next stimulus (block start or level announcement).
    AwaitingStimulus,
    /// Digit on screen; the response window is open.
    Presenting,
    /// Tutorial feedback held on screen after the window closed.
    Feedback,
    InterTrial,
    Complete,
}

/// Keys forwarded by the host. Only `Space` counts as a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Other,
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub participant_id: String,
    pub version: u8,
    pub block_n: usize,
    pub trial_index: usize,
    pub stimulus_digit: u8,
    pub is_target: bool,
    pub response: bool,
    /// `None` where accuracy does not apply (unscored tutorial trials).
    pub accuracy: Option<bool>,
    pub reaction_time_ms: Option<u64>,
    /// Unix epoch milliseconds.
    pub stimulus_onset_ms: u64,
    /// Unix epoch milliseconds.
    pub response_time_ms: Option<u64>,
    pub training: bool,
    pub timestamp: String,
}
