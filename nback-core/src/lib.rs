pub mod feedback;
pub mod participant;
pub mod phase;
pub mod trial;

pub use feedback::Feedback;
pub use participant::{MAX_VISITS, Participant};
pub use phase::{Phase, SessionPhase};
pub use trial::{Key, TrialRecord, TrialState};
