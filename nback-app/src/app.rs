use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use anyhow::Result;
use nback_core::{Key, Participant, Phase, SessionPhase};
use nback_data::{documents_dir, export_records};
use nback_experiment::{RunnerEvent, SessionConfig, SessionFlow, summarize};
use nback_timing::{HighPrecisionTimer, Timer};
use tracing::{debug, error, info, warn};

use crate::narrator::{Narrator, init_narrator, narrate};

/// Upper bound on one idle sleep while trials are running, so keypresses are
/// picked up within a millisecond.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Terminal host for one visit. Stimuli go to stdout; a line on stdin
/// (Enter) is the response key.
pub struct App {
    flow: SessionFlow<HighPrecisionTimer>,
    timer: HighPrecisionTimer,
    narrator: Option<Box<dyn Narrator>>,
    output_dir: Option<PathBuf>,
    input: Receiver<String>,
    should_exit: bool,
}

impl App {
    pub fn new(
        config: SessionConfig,
        participant: Participant,
        narrate: bool,
        output_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let timer = HighPrecisionTimer::new();
        let mut flow = SessionFlow::new(config, timer.clone())?;
        flow.login(participant)?;

        Ok(Self {
            flow,
            timer,
            narrator: init_narrator(narrate),
            output_dir,
            input: spawn_input_reader(),
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        println!("=== N-BACK EXPERIMENT ===");
        if let Some(p) = self.flow.participant() {
            println!("Participant {} - visit {}", p.id, p.version);
        }
        self.show_screen();

        while !self.should_exit {
            if self.flow.runner().is_some() {
                let events = self.flow.update();
                self.render(&events);
                self.pump_input();
                if self.flow.is_complete() {
                    self.finish();
                } else if self.flow.runner().is_some() {
                    self.idle();
                }
            } else {
                match self.input.recv() {
                    Ok(line) => self.handle_command(line.trim()),
                    Err(_) => {
                        info!("input closed");
                        self.should_exit = true;
                    }
                }
            }
        }

        self.cleanup_and_exit();
        Ok(())
    }

    /// Forwards pending lines as response keys while trials run.
    fn pump_input(&mut self) {
        loop {
            match self.input.try_recv() {
                Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
                    self.should_exit = true;
                    return;
                }
                Ok(_) => {
                    let events = self.flow.handle_key(Key::Space);
                    let counted = events
                        .iter()
                        .any(|e| matches!(e, RunnerEvent::ResponseRegistered { .. }));
                    if !counted {
                        debug!("keypress outside the response window ignored");
                    }
                    self.render(&events);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    fn idle(&self) {
        let wait = self
            .flow
            .runner()
            .and_then(|r| r.time_to_next())
            .unwrap_or(POLL_INTERVAL)
            .min(POLL_INTERVAL);
        self.timer.sleep(wait);
    }

    fn handle_command(&mut self, command: &str) {
        if command.eq_ignore_ascii_case("q") {
            self.should_exit = true;
            return;
        }
        let outcome = match (self.flow.phase(), command) {
            (SessionPhase::Instructions(_), "" | "n") => self.flow.next_page().map(|_| Vec::new()),
            (SessionPhase::Instructions(_), "p") => self.flow.prev_page().map(|_| Vec::new()),
            (SessionPhase::Instructions(_), "r") => Ok(Vec::new()),
            (SessionPhase::Instructions(_), "s") => self.flow.start_training(),
            (SessionPhase::Instructions(_), "k") => self.flow.skip_training(),
            (SessionPhase::Transition, "e") => self.flow.start_experiment(),
            (SessionPhase::Transition, "t") => self.flow.redo_tutorial(),
            (phase, other) => {
                debug!(?phase, command = other, "unrecognised command");
                println!("Unrecognised command {other:?}.");
                return;
            }
        };
        match outcome {
            Ok(events) if events.is_empty() => self.show_screen(),
            Ok(events) => self.render(&events),
            Err(e) => {
                warn!(error = %e, "command refused");
                println!("{e}");
            }
        }
    }

    fn show_screen(&mut self) {
        match self.flow.phase() {
            SessionPhase::Instructions(page) => {
                println!("\n--- Instructions {page}/{} ---", SessionPhase::INSTRUCTION_PAGES);
                if let Some(text) = self.flow.narration() {
                    println!("{text}");
                    narrate(&mut self.narrator, text);
                }
                let skip = if self.flow.participant().is_some_and(|p| p.first_time) {
                    "Training is mandatory for first-time participants"
                } else {
                    "[k] skip training"
                };
                println!("[n] next  [p] previous  [r] replay  [s] start training  {skip}  [q] quit");
            }
            SessionPhase::Transition => {
                println!("\nTutorial complete. Ready for the real experiment?");
                println!("[e] start experiment  [t] redo tutorial  [q] quit");
            }
            phase => debug!(?phase, "no screen to show"),
        }
    }

    fn render(&mut self, events: &[RunnerEvent]) {
        for event in events {
            match event {
                RunnerEvent::BlockStarted { block_index: 0, n } => {
                    let what = if self.flow.phase().is_training() {
                        "tutorial"
                    } else {
                        "experiment"
                    };
                    println!("\nStarting {what} ({n}-back)... press Enter when the digit matches.");
                }
                RunnerEvent::BlockStarted { n, .. } => println!("\n{n}-back"),
                RunnerEvent::StimulusShown { block_n, digit, .. } => {
                    if self.flow.phase().is_training() {
                        let plural = if *block_n > 1 { "s" } else { "" };
                        println!("\n    {digit}    (Enter if this matches the one {block_n} position{plural} back)");
                    } else {
                        println!("\n    {digit}");
                    }
                }
                RunnerEvent::ResponseRegistered { reaction_time_ms } => {
                    debug!(reaction_time_ms, "response");
                }
                RunnerEvent::FeedbackShown(feedback) => {
                    let mark = if feedback.is_correct() { "+" } else { "x" };
                    println!("    [{mark}] {}", feedback.message());
                }
                RunnerEvent::TrialRecorded(_) => {}
                RunnerEvent::InterTrial => println!("    ."),
                RunnerEvent::SessionComplete => {
                    if self.flow.phase() == SessionPhase::Transition {
                        self.show_screen();
                    }
                }
            }
        }
    }

    /// Exports the scored records once the experiment is over. A failed
    /// export is reported, not retried.
    fn finish(&mut self) {
        for (n, level) in summarize(self.flow.records()) {
            info!(
                n,
                accuracy_pct = level.accuracy() * 100.0,
                hits = level.hits,
                misses = level.misses,
                false_alarms = level.false_alarms,
                mean_rt_ms = ?level.mean_rt_ms,
                "level summary"
            );
        }

        let dir = match self.output_dir.clone().map(Ok).unwrap_or_else(documents_dir) {
            Ok(dir) => dir,
            Err(e) => {
                error!(error = %e, "no export location");
                println!("Could not save data: {e}");
                self.should_exit = true;
                return;
            }
        };
        match export_records(self.flow.records(), &dir) {
            Ok(path) => println!("\nThank you! Data saved to {}", path.display()),
            Err(e) => {
                error!(error = %e, dir = %dir.display(), "export failed");
                println!("Could not save data: {e}\nTried directory: {}", dir.display());
            }
        }
        self.should_exit = true;
    }

    fn cleanup_and_exit(&mut self) {
        if !self.flow.is_complete() {
            warn!(
                records = self.flow.records().len(),
                "session ended early; unsaved records discarded"
            );
        }
        println!("\nExperiment closed.");
    }
}

fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
