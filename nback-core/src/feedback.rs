/// Immediate feedback shown on scripted tutorial trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Hit,
    CorrectRejection,
    Miss,
    FalseAlarm,
}

impl Feedback {
    /// Classifies a tutorial response. `correct` is judged against the scripted
    /// expectation, so the incorrect branch falls back to the target flag.
    pub fn classify(correct: bool, responded: bool, is_target: bool) -> Self {
        match (correct, responded, is_target) {
            (true, true, _) => Feedback::Hit,
            (true, false, _) => Feedback::CorrectRejection,
            (false, _, true) => Feedback::Miss,
            (false, _, false) => Feedback::FalseAlarm,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Hit | Feedback::CorrectRejection)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Feedback::Hit => "Correct! You pressed SPACE for a target.",
            Feedback::CorrectRejection => "Correct! You didn't press SPACE for a non-target.",
            Feedback::Miss => "Missed a target! You should have pressed SPACE.",
            Feedback::FalseAlarm => "False alarm! You shouldn't press for non-targets.",
        }
    }
}
