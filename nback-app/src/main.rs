use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nback_data::{Roster, default_roster_path, manual_login};
use nback_experiment::{SessionConfig, prepare_blocks, seed::seed_word};

mod app;
mod logging;
mod narrator;

use app::App;

/// N-back working-memory task
#[derive(Parser, Debug)]
#[command(name = "nback")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file overriding session timing and trial counts
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look a participant up in the roster and show their next visit
    Login {
        first: String,
        last: String,
        /// Roster CSV (defaults to sample_sheet.csv)
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Print the stimulus blocks a visit will present
    Sequence {
        /// Visit number (1-5)
        version: u8,
        /// Show the training levels instead of the full session
        #[arg(long)]
        training: bool,
    },

    /// Run a session in this terminal
    Run {
        #[arg(long, requires = "last", conflicts_with = "participant")]
        first: Option<String>,
        #[arg(long, requires = "first")]
        last: Option<String>,
        /// Participant id for manual login
        #[arg(long, requires = "visit")]
        participant: Option<String>,
        /// Visit number for manual login (1-5)
        #[arg(long)]
        visit: Option<String>,
        #[arg(long)]
        roster: Option<PathBuf>,
        /// Where to write the results (defaults to ~/Documents)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Read instructions aloud when a text-to-speech program is available
        #[arg(long)]
        narrate: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SessionConfig::default()),
    }
}

fn load_roster(path: Option<PathBuf>) -> Result<Roster> {
    let path = path.unwrap_or_else(default_roster_path);
    Roster::load(&path).with_context(|| format!("reading roster {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_json);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Login { first, last, roster } => {
            let participant = load_roster(roster)?.lookup(&first, &last)?;
            println!(
                "{} -> participant {}, visit {}{}",
                format!("{first} {last}").trim(),
                participant.id,
                participant.version,
                if participant.first_time { " (training required)" } else { "" }
            );
        }
        Commands::Sequence { version, training } => {
            println!("seed word: {}", seed_word(version)?);
            for block in prepare_blocks(&config, version, training)? {
                let digits: Vec<String> = block
                    .trials
                    .iter()
                    .map(|t| if t.is_target { format!("{}*", t.digit) } else { t.digit.to_string() })
                    .collect();
                println!("{:>7}: {}", block.label(), digits.join(" "));
            }
        }
        Commands::Run {
            first,
            last,
            participant,
            visit,
            roster,
            output_dir,
            narrate,
        } => {
            let participant = match (first, last, participant) {
                (_, _, Some(id)) => manual_login(&id, visit.as_deref().unwrap_or_default())?,
                (Some(first), Some(last), None) => load_roster(roster)?.lookup(&first, &last)?,
                _ => bail!("log in with --first/--last or --participant/--visit"),
            };
            App::new(config, participant, narrate, output_dir)?.run()?;
        }
    }

    Ok(())
}
