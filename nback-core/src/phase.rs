/// Defines session phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    /// Whether trial responses are collected while in this phase.
    fn allows_input(&self) -> bool;

    fn is_training(&self) -> bool {
        false
    }

    fn is_login(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Login,
    /// Instruction pages, numbered from 1.
    Instructions(u8),
    Tutorial,
    Transition,
    Experiment,
    Complete,
}

impl SessionPhase {
    pub const INSTRUCTION_PAGES: u8 = 4;
}

impl Phase for SessionPhase {
    fn allows_input(&self) -> bool {
        matches!(self, Self::Tutorial | Self::Experiment)
    }
    fn is_training(&self) -> bool {
        matches!(self, SessionPhase::Tutorial)
    }

    fn is_login(&self) -> bool {
        matches!(self, SessionPhase::Login)
    }
}
