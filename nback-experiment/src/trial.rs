/// Scripted expectations attached to tutorial trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialCue {
    pub expected_response: bool,
    pub feedback_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    pub digit: u8,
    pub is_target: bool,
    pub cue: Option<TutorialCue>,
}

impl Trial {
    pub fn new(digit: u8, is_target: bool) -> Self {
        Self {
            digit,
            is_target,
            cue: None,
        }
    }

    pub fn scripted(digit: u8, is_target: bool, expected_response: bool, feedback_allowed: bool) -> Self {
        Self {
            digit,
            is_target,
            cue: Some(TutorialCue {
                expected_response,
                feedback_allowed,
            }),
        }
    }

    /// Accuracy of `responded` for this trial.
    ///
    /// Generated trials use the hit / correct-rejection rule. Scripted trials
    /// compare against the expected response and are unscored when feedback
    /// is suppressed.
    pub fn score(&self, responded: bool) -> Option<bool> {
        match self.cue {
            Some(cue) if cue.feedback_allowed => Some(responded == cue.expected_response),
            Some(_) => None,
            None => Some(responded == self.is_target),
        }
    }

    pub fn feedback_allowed(&self) -> bool {
        self.cue.is_some_and(|c| c.feedback_allowed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Back-distance.
    pub n: usize,
    pub trials: Vec<Trial>,
    pub training: bool,
}

impl Block {
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn target_positions(&self) -> Vec<usize> {
        self.trials
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_target)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn label(&self) -> String {
        format!("{}-back", self.n)
    }
}

#[derive(Debug, Clone)]
pub struct TrialDurations {
    pub stimulus_ms: u64,
    /// Zero when no feedback is held after the window closes.
    pub feedback_ms: u64,
    pub inter_trial_ms: u64,
    pub announcement_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TrialTimestamps<T> {
    pub stimulus_start: T,
    pub stimulus_start_wall_ms: u64,
    pub response: Option<T>,
    pub response_wall_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_accuracy_truth_table() {
        let target = Trial::new(4, true);
        let non_target = Trial::new(4, false);
        assert_eq!(target.score(true), Some(true));
        assert_eq!(target.score(false), Some(false));
        assert_eq!(non_target.score(false), Some(true));
        assert_eq!(non_target.score(true), Some(false));
    }

    #[test]
    fn scripted_trials_follow_their_cue() {
        // expectation disagrees with the target flag on purpose
        let t = Trial::scripted(3, false, true, true);
        assert_eq!(t.score(true), Some(true));
        assert_eq!(t.score(false), Some(false));

        let silent = Trial::scripted(5, false, false, false);
        assert_eq!(silent.score(true), None);
        assert!(!silent.feedback_allowed());
    }
}
