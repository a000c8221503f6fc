/// Number of visits each participant completes.
pub const MAX_VISITS: u8 = 5;

/// Who is being tested and which visit this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    /// Visit number, 1..=MAX_VISITS.
    pub version: u8,
    /// First-time participants may not skip the tutorial.
    pub first_time: bool,
}

impl Participant {
    pub fn new(id: impl Into<String>, version: u8, first_time: bool) -> Self {
        Self {
            id: id.into(),
            version,
            first_time,
        }
    }
}
