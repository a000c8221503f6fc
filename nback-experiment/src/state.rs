use super::config::SessionConfig;
use super::trial::{Block, Trial, TrialDurations, TrialTimestamps};
use chrono::{DateTime, Local};
use nback_core::{Feedback, Key, Participant, TrialRecord, TrialState};
use nback_timing::{Schedule, Timer};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Scripted practice with immediate feedback.
    Tutorial,
    Experiment,
}

/// Deferred transitions; at most one is pending at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    PresentStimulus,
    CloseWindow,
    EndFeedback,
    Advance,
}

/// What happened during a call, for the host to render.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    BlockStarted { block_index: usize, n: usize },
    StimulusShown { block_n: usize, trial_index: usize, digit: u8 },
    ResponseRegistered { reaction_time_ms: u64 },
    FeedbackShown(Feedback),
    TrialRecorded(TrialRecord),
    InterTrial,
    SessionComplete,
}

/// Per-session state owned by the runner while trials are running.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub participant: Participant,
    pub block_index: usize,
    pub trial_index: usize,
    pub records: Vec<TrialRecord>,
}

impl SessionState {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            block_index: 0,
            trial_index: 0,
            records: Vec::new(),
        }
    }
}

/// Steps through blocks of trials, driven by `update()` polls against the
/// injected timer and by `handle_key()` for responses.
pub struct TrialRunner<T>
where
    T: Timer<Timestamp = u64>,
{
    pub mode: RunMode,
    pub timer: T,
    pub durations: TrialDurations,
    blocks: Vec<Block>,
    session: SessionState,
    state: TrialState,
    current: Option<TrialTimestamps<T::Timestamp>>,
    feedback: Option<Feedback>,
    schedule: Schedule<Transition>,
}

impl<T> TrialRunner<T>
where
    T: Timer<Timestamp = u64>,
{
    pub fn new(
        mode: RunMode,
        blocks: Vec<Block>,
        config: &SessionConfig,
        timer: T,
        session: SessionState,
    ) -> Self {
        let durations = match mode {
            RunMode::Tutorial => TrialDurations {
                stimulus_ms: config.tutorial_stimulus_duration_ms,
                feedback_ms: config.feedback_duration_ms,
                inter_trial_ms: config.inter_trial_interval_ms,
                announcement_ms: config.announcement_ms,
            },
            RunMode::Experiment => TrialDurations {
                stimulus_ms: config.stimulus_duration_ms,
                feedback_ms: 0,
                inter_trial_ms: config.inter_trial_interval_ms,
                announcement_ms: config.announcement_ms,
            },
        };
        Self {
            mode,
            timer,
            durations,
            blocks,
            session,
            state: TrialState::AwaitingStimulus,
            current: None,
            feedback: None,
            schedule: Schedule::new(),
        }
    }

    /// Rewinds to the first block and schedules its first stimulus after the
    /// announcement pause.
    pub fn start(&mut self) -> Vec<RunnerEvent> {
        let mut events = Vec::new();
        self.session.block_index = 0;
        self.session.trial_index = 0;
        self.current = None;
        self.feedback = None;
        self.schedule.cancel();
        info!(
            mode = ?self.mode,
            blocks = self.blocks.len(),
            participant = %self.session.participant.id,
            "starting run"
        );
        self.announce_block(&mut events);
        events
    }

    /// Fires every transition whose deadline has passed.
    pub fn update(&mut self) -> Vec<RunnerEvent> {
        let mut events = Vec::new();
        while let Some(transition) = self.schedule.take_due(self.timer.now()) {
            debug!(?transition, "transition due");
            match transition {
                Transition::PresentStimulus => self.present_stimulus(&mut events),
                Transition::CloseWindow => self.close_window(&mut events),
                Transition::EndFeedback => self.end_feedback(&mut events),
                Transition::Advance => self.advance(&mut events),
            }
        }
        events
    }

    /// Records the first response inside the stimulus window; anything else
    /// is ignored. Transitions already due fire first, so a key that arrives
    /// after the window deadline but before the next poll is not counted.
    pub fn handle_key(&mut self, key: Key) -> Vec<RunnerEvent> {
        let mut events = self.update();
        if key != Key::Space || !self.response_window_open() {
            return events;
        }
        let now = self.timer.now();
        let wall_ms = self.timer.wall_clock_ms();
        let Some(stamps) = self.current.as_mut() else {
            return events;
        };
        if stamps.response.is_some() {
            return events;
        }
        stamps.response = Some(now);
        stamps.response_wall_ms = Some(wall_ms);
        let reaction_time_ms = now.saturating_sub(stamps.stimulus_start) / 1_000_000;
        debug!(reaction_time_ms, "response registered");
        events.push(RunnerEvent::ResponseRegistered { reaction_time_ms });

        if let Some(trial) = self.current_trial() {
            if trial.feedback_allowed() {
                let feedback = tutorial_feedback(trial, true);
                self.feedback = Some(feedback);
                events.push(RunnerEvent::FeedbackShown(feedback));
            }
        }
        events
    }

    /// True while a stimulus is on screen and its close deadline has not
    /// passed.
    pub fn response_window_open(&self) -> bool {
        self.state == TrialState::Presenting
            && self
                .schedule
                .remaining(self.timer.now())
                .is_some_and(|left| !left.is_zero())
    }

    fn announce_block(&mut self, events: &mut Vec<RunnerEvent>) {
        let Some(block) = self.blocks.get(self.session.block_index) else {
            self.complete(events);
            return;
        };
        info!(
            block_index = self.session.block_index,
            n = block.n,
            trials = block.len(),
            "block started"
        );
        events.push(RunnerEvent::BlockStarted {
            block_index: self.session.block_index,
            n: block.n,
        });
        self.state = TrialState::AwaitingStimulus;
        self.schedule.after(
            self.timer.now(),
            Duration::from_millis(self.durations.announcement_ms),
            Transition::PresentStimulus,
        );
    }

    fn present_stimulus(&mut self, events: &mut Vec<RunnerEvent>) {
        let Some(block) = self.blocks.get(self.session.block_index) else {
            self.complete(events);
            return;
        };
        let Some(trial) = block.trials.get(self.session.trial_index) else {
            self.next_block(events);
            return;
        };
        let (block_n, digit) = (block.n, trial.digit);

        let now = self.timer.now();
        self.current = Some(TrialTimestamps {
            stimulus_start: now,
            stimulus_start_wall_ms: self.timer.wall_clock_ms(),
            response: None,
            response_wall_ms: None,
        });
        self.feedback = None;
        self.state = TrialState::Presenting;
        debug!(block_n, trial_index = self.session.trial_index, digit, "stimulus shown");
        events.push(RunnerEvent::StimulusShown {
            block_n,
            trial_index: self.session.trial_index,
            digit,
        });
        self.schedule.after(
            now,
            Duration::from_millis(self.durations.stimulus_ms),
            Transition::CloseWindow,
        );
    }

    fn close_window(&mut self, events: &mut Vec<RunnerEvent>) {
        let responded = self
            .current
            .as_ref()
            .is_some_and(|stamps| stamps.response.is_some());

        if self.mode == RunMode::Tutorial && self.feedback.is_none() {
            if let Some(trial) = self.current_trial() {
                if trial.feedback_allowed() {
                    let feedback = tutorial_feedback(trial, responded);
                    self.feedback = Some(feedback);
                    events.push(RunnerEvent::FeedbackShown(feedback));
                }
            }
        }

        if let Some(record) = self.build_record(responded) {
            debug!(
                trial_index = record.trial_index,
                response = record.response,
                accuracy = ?record.accuracy,
                "trial recorded"
            );
            self.session.records.push(record.clone());
            events.push(RunnerEvent::TrialRecorded(record));
        }
        self.current = None;

        let now = self.timer.now();
        match self.mode {
            RunMode::Tutorial => {
                self.state = TrialState::Feedback;
                self.schedule.after(
                    now,
                    Duration::from_millis(self.durations.feedback_ms),
                    Transition::EndFeedback,
                );
            }
            RunMode::Experiment => self.enter_inter_trial(now, events),
        }
    }

    fn end_feedback(&mut self, events: &mut Vec<RunnerEvent>) {
        let now = self.timer.now();
        self.enter_inter_trial(now, events);
    }

    fn enter_inter_trial(&mut self, now: u64, events: &mut Vec<RunnerEvent>) {
        self.state = TrialState::InterTrial;
        events.push(RunnerEvent::InterTrial);
        self.schedule.after(
            now,
            Duration::from_millis(self.durations.inter_trial_ms),
            Transition::Advance,
        );
    }

    fn advance(&mut self, events: &mut Vec<RunnerEvent>) {
        self.session.trial_index += 1;
        let remaining = self
            .blocks
            .get(self.session.block_index)
            .is_some_and(|b| self.session.trial_index < b.len());
        if remaining {
            self.present_stimulus(events);
        } else {
            self.next_block(events);
        }
    }

    fn next_block(&mut self, events: &mut Vec<RunnerEvent>) {
        self.session.block_index += 1;
        self.session.trial_index = 0;
        self.announce_block(events);
    }

    fn complete(&mut self, events: &mut Vec<RunnerEvent>) {
        self.state = TrialState::Complete;
        self.schedule.cancel();
        info!(
            mode = ?self.mode,
            records = self.session.records.len(),
            "run complete"
        );
        events.push(RunnerEvent::SessionComplete);
    }

    fn build_record(&self, responded: bool) -> Option<TrialRecord> {
        let block = self.blocks.get(self.session.block_index)?;
        let trial = block.trials.get(self.session.trial_index)?;
        let stamps = self.current.as_ref()?;
        let reaction_time_ms = stamps
            .response
            .map(|r| r.saturating_sub(stamps.stimulus_start) / 1_000_000);
        let participant = &self.session.participant;
        Some(TrialRecord {
            participant_id: participant.id.clone(),
            version: participant.version,
            block_n: block.n,
            trial_index: self.session.trial_index,
            stimulus_digit: trial.digit,
            is_target: trial.is_target,
            response: responded,
            accuracy: trial.score(responded),
            reaction_time_ms,
            stimulus_onset_ms: stamps.stimulus_start_wall_ms,
            response_time_ms: stamps.response_wall_ms,
            training: block.training,
            timestamp: format_timestamp(self.timer.wall_clock_ms()),
        })
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == TrialState::Complete
    }

    pub fn current_block(&self) -> Option<&Block> {
        self.blocks.get(self.session.block_index)
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.current_block()?.trials.get(self.session.trial_index)
    }

    /// Feedback on screen for the current tutorial trial, if any.
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.session.records
    }

    pub fn into_session(self) -> SessionState {
        self.session
    }

    /// Time until the next transition, or `None` when nothing is pending.
    pub fn time_to_next(&self) -> Option<Duration> {
        self.schedule.remaining(self.timer.now())
    }
}

fn tutorial_feedback(trial: &Trial, responded: bool) -> Feedback {
    let correct = trial.score(responded).unwrap_or(false);
    Feedback::classify(correct, responded, trial.is_target)
}

fn format_timestamp(wall_ms: u64) -> String {
    DateTime::from_timestamp_millis(wall_ms as i64)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_default()
}
