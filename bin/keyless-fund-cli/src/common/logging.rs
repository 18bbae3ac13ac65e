//! Logging configuration for the keyless-fund CLI tool.
//!
//! Verbosity comes from `-v/-vv/-vvv` flags unless `RUST_LOG` is set. Logs go to stderr, or to
//! the file given with `--log.file`.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use super::Result;

/// Logging configuration arguments.
#[derive(Debug, Clone, Default, Parser)]
pub struct LogArgs {
    /// Increase logging verbosity (-v = error, -vv = warn, -vvv = info, -vvvv = debug, -vvvvv =
    /// trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log file path. If specified, logs are written to this file instead of stderr.
    #[arg(long = "log.file", visible_aliases = ["log-file"], global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable colorful console logging. Only applies when logging to stderr (no --log.file).
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub log_no_color: bool,
}

impl LogArgs {
    /// The filter selected by `RUST_LOG` or, failing that, by the verbosity flags.
    pub fn filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }
        let level = match self.verbose {
            0 => return EnvFilter::new("off"),
            1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            _ => Level::TRACE,
        };
        EnvFilter::new(format!("keyless_fund={level},keyless_fund_cli={level}"))
    }

    /// Initialize the tracing subscriber based on the logging configuration.
    ///
    /// Log target is only shown for DEBUG level and above. Does nothing if a global subscriber
    /// is already installed.
    pub fn init(&self) -> Result<()> {
        let filter = self.filter();
        let show_target = self.verbose >= 4;

        if let Some(ref log_file) = self.log_file {
            // Log files never get ANSI colors
            let file = std::fs::File::create(log_file)?;
            let _ = fmt()
                .with_env_filter(filter)
                .with_target(show_target)
                .with_writer(file)
                .with_ansi(false)
                .try_init();
        } else {
            let _ = fmt()
                .with_env_filter(filter)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .with_ansi(!self.log_no_color)
                .try_init();
        }
        Ok(())
    }
}
