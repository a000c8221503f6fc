use nback_core::{Key, Participant, Phase, SessionPhase, TrialRecord};
use nback_timing::Timer;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{ConfigError, FlowError};
use crate::sequence::prepare_blocks;
use crate::state::{RunMode, RunnerEvent, SessionState, TrialRunner};
use crate::trial::Block;
use crate::tutorial::{instruction_text, tutorial_blocks};

/// Screen-level progression of one participant visit: login, instructions,
/// tutorial, transition, experiment, done.
pub struct SessionFlow<T>
where
    T: Timer<Timestamp = u64>,
{
    pub config: SessionConfig,
    phase: SessionPhase,
    timer: T,
    session: Option<SessionState>,
    runner: Option<TrialRunner<T>>,
}

impl<T> SessionFlow<T>
where
    T: Timer<Timestamp = u64>,
{
    pub fn new(config: SessionConfig, timer: T) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: SessionPhase::default(),
            timer,
            session: None,
            runner: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn login(&mut self, participant: Participant) -> Result<SessionPhase, FlowError> {
        self.expect(self.phase.is_login(), "log in")?;
        crate::seed::seed_word(participant.version)?;
        info!(
            participant = %participant.id,
            version = participant.version,
            first_time = participant.first_time,
            "participant logged in"
        );
        self.session = Some(SessionState::new(participant));
        self.phase = SessionPhase::Instructions(1);
        Ok(self.phase)
    }

    pub fn next_page(&mut self) -> Result<SessionPhase, FlowError> {
        let SessionPhase::Instructions(page) = self.phase else {
            return Err(self.wrong_phase("turn instruction pages"));
        };
        if page < SessionPhase::INSTRUCTION_PAGES {
            self.phase = SessionPhase::Instructions(page + 1);
        }
        Ok(self.phase)
    }

    pub fn prev_page(&mut self) -> Result<SessionPhase, FlowError> {
        let SessionPhase::Instructions(page) = self.phase else {
            return Err(self.wrong_phase("turn instruction pages"));
        };
        if page > 1 {
            self.phase = SessionPhase::Instructions(page - 1);
        }
        Ok(self.phase)
    }

    /// Narration for the instruction page on screen.
    pub fn narration(&self) -> Option<&'static str> {
        match self.phase {
            SessionPhase::Instructions(page) => instruction_text(page),
            _ => None,
        }
    }

    /// Starts the scripted tutorial from the instructions, or again from the
    /// transition screen.
    pub fn start_training(&mut self) -> Result<Vec<RunnerEvent>, FlowError> {
        self.expect(
            matches!(
                self.phase,
                SessionPhase::Instructions(_) | SessionPhase::Transition
            ),
            "start training",
        )?;
        self.begin_run(RunMode::Tutorial, tutorial_blocks())
    }

    pub fn redo_tutorial(&mut self) -> Result<Vec<RunnerEvent>, FlowError> {
        self.expect(self.phase == SessionPhase::Transition, "redo the tutorial")?;
        self.start_training()
    }

    pub fn skip_training(&mut self) -> Result<Vec<RunnerEvent>, FlowError> {
        self.expect(
            matches!(self.phase, SessionPhase::Instructions(_)),
            "skip training",
        )?;
        if self.participant().is_some_and(|p| p.first_time) {
            warn!("first-time participant tried to skip training");
            return Err(FlowError::TrainingRequired);
        }
        self.begin_experiment()
    }

    pub fn start_experiment(&mut self) -> Result<Vec<RunnerEvent>, FlowError> {
        self.expect(self.phase == SessionPhase::Transition, "start the experiment")?;
        self.begin_experiment()
    }

    fn begin_experiment(&mut self) -> Result<Vec<RunnerEvent>, FlowError> {
        let version = self
            .participant()
            .map(|p| p.version)
            .ok_or_else(|| self.wrong_phase("start the experiment"))?;
        let blocks = prepare_blocks(&self.config, version, false)?;
        self.begin_run(RunMode::Experiment, blocks)
    }

    fn begin_run(&mut self, mode: RunMode, blocks: Vec<Block>) -> Result<Vec<RunnerEvent>, FlowError> {
        let action = match mode {
            RunMode::Tutorial => "start training",
            RunMode::Experiment => "start the experiment",
        };
        let session = match (self.session.take(), self.runner.take()) {
            (Some(session), _) => session,
            (None, Some(runner)) => runner.into_session(),
            (None, None) => return Err(self.wrong_phase(action)),
        };
        self.phase = match mode {
            RunMode::Tutorial => SessionPhase::Tutorial,
            RunMode::Experiment => SessionPhase::Experiment,
        };
        let mut runner = TrialRunner::new(mode, blocks, &self.config, self.timer.clone(), session);
        let events = runner.start();
        self.runner = Some(runner);
        Ok(self.absorb(events))
    }

    /// Polls the active run; moves to the next screen once it finishes.
    pub fn update(&mut self) -> Vec<RunnerEvent> {
        let events = match self.runner.as_mut() {
            Some(runner) => runner.update(),
            None => Vec::new(),
        };
        self.absorb(events)
    }

    pub fn handle_key(&mut self, key: Key) -> Vec<RunnerEvent> {
        if !self.phase.allows_input() {
            return Vec::new();
        }
        let events = match self.runner.as_mut() {
            Some(runner) => runner.handle_key(key),
            None => Vec::new(),
        };
        self.absorb(events)
    }

    fn absorb(&mut self, events: Vec<RunnerEvent>) -> Vec<RunnerEvent> {
        if events.contains(&RunnerEvent::SessionComplete) {
            if let Some(runner) = self.runner.take() {
                self.session = Some(runner.into_session());
            }
            self.phase = if self.phase.is_training() {
                SessionPhase::Transition
            } else {
                SessionPhase::Complete
            };
            info!(phase = ?self.phase, "run finished");
        }
        events
    }

    pub fn runner(&self) -> Option<&TrialRunner<T>> {
        self.runner.as_ref()
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.session_state().map(|s| &s.participant)
    }

    fn session_state(&self) -> Option<&SessionState> {
        self.session
            .as_ref()
            .or_else(|| self.runner.as_ref().map(|r| r.session()))
    }

    /// Every record so far, tutorial trials included.
    pub fn records(&self) -> &[TrialRecord] {
        self.session_state()
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    fn expect(&self, ok: bool, action: &'static str) -> Result<(), FlowError> {
        if ok { Ok(()) } else { Err(self.wrong_phase(action)) }
    }

    fn wrong_phase(&self, action: &'static str) -> FlowError {
        FlowError::WrongPhase {
            action,
            phase: self.phase,
        }
    }
}
