//! Logging configuration for the create-game CLI.
//!
//! The routine's progress lines are the tool's main output, so logging defaults to `info`.
//! `-v` raises the level to `debug` and `-vv` to `trace`; `-q` keeps only warnings and errors.

use std::{fs::File, io, path::PathBuf};

use clap::Args;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration arguments.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Increase logging verbosity (-v = debug, -vv = trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log file path. If specified, logs are written to this file instead of stderr.
    #[arg(long = "log.file", visible_aliases = ["log-file"], global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable colorful console logging. Only applies when logging to stderr (no --log.file).
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub log_no_color: bool,
}

impl LogArgs {
    /// Level selected by the `-v`/`-q` flags.
    pub const fn level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Filter directive for the crates of this workspace at the selected level.
    pub fn directive(&self) -> String {
        let level = self.level();
        format!("create_game={level},game_factory={level}")
    }

    /// Initialize the tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the `-v`/`-q` flags. Targets are shown from `debug` up.
    pub fn init(&self) -> io::Result<()> {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.directive())
        };
        let show_target = self.level() >= Level::DEBUG;

        if let Some(ref log_file) = self.log_file {
            let file = File::create(log_file)?;
            fmt()
                .with_env_filter(filter)
                .with_target(show_target)
                .with_writer(file)
                .with_ansi(false)
                .init();
        } else {
            fmt()
                .with_env_filter(filter)
                .with_target(show_target)
                .with_writer(io::stderr)
                .with_ansi(!self.log_no_color)
                .init();
        }
        Ok(())
    }
}
