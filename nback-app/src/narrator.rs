use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

/// Reads instruction text aloud. Purely decorative: every failure is
/// swallowed by the caller.
pub trait Narrator {
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Speaks through a system text-to-speech program, blocking until done.
pub struct CommandNarrator {
    program: &'static str,
}

impl CommandNarrator {
    const CANDIDATES: [&'static str; 3] = ["say", "espeak-ng", "espeak"];

    /// First candidate that can be spawned on this machine.
    pub fn detect() -> Option<Self> {
        Self::CANDIDATES.into_iter().find_map(|program| {
            let check = Command::new(program)
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match check {
                Ok(_) => Some(Self { program }),
                Err(e) => {
                    debug!(program, error = %e, "text-to-speech candidate unavailable");
                    None
                }
            }
        })
    }
}

impl Narrator for CommandNarrator {
    fn speak(&mut self, text: &str) -> Result<()> {
        let status = Command::new(self.program)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to run {}", self.program))?;
        if !status.success() {
            bail!("{} exited with {status}", self.program);
        }
        Ok(())
    }
}

pub fn init_narrator(enabled: bool) -> Option<Box<dyn Narrator>> {
    if !enabled {
        return None;
    }
    match CommandNarrator::detect() {
        Some(narrator) => {
            info!(program = narrator.program, "narration enabled");
            Some(Box::new(narrator))
        }
        None => {
            warn!("text-to-speech unavailable; continuing without narration");
            None
        }
    }
}

/// Speaks if a narrator is present; failures only show up in debug logs.
pub fn narrate(narrator: &mut Option<Box<dyn Narrator>>, text: &str) {
    if let Some(n) = narrator.as_mut() {
        if let Err(e) = n.speak(text) {
            debug!(error = %e, "narration failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Narrator for Broken {
        fn speak(&mut self, _text: &str) -> Result<()> {
            bail!("no audio device")
        }
    }

    #[test]
    fn failures_are_swallowed() {
        let mut narrator: Option<Box<dyn Narrator>> = Some(Box::new(Broken));
        narrate(&mut narrator, "hello");
        let mut none: Option<Box<dyn Narrator>> = None;
        narrate(&mut none, "hello");
        assert!(init_narrator(false).is_none());
    }
}
