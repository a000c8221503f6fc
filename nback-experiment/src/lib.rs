pub mod config;
pub mod error;
pub mod flow;
pub mod seed;
pub mod sequence;
pub mod state;
pub mod summary;
pub mod trial;
pub mod tutorial;

pub use config::SessionConfig;
pub use error::{ConfigError, FlowError};
pub use flow::SessionFlow;
pub use seed::{SEEDS, rng_for_version, seed_value, seeded_rng};
pub use sequence::{generate_block, prepare_blocks, target_count};
pub use state::{RunMode, RunnerEvent, SessionState, TrialRunner};
pub use summary::{LevelSummary, summarize};
pub use trial::{Block, Trial, TrialDurations, TrialTimestamps, TutorialCue};
pub use tutorial::{instruction_text, tutorial_blocks};
