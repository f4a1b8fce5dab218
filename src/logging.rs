//! Tracing subscriber setup for the CLI.
//!
//! Logs go to stderr so stdout stays clean for step outputs and notes, or to
//! a file given with `--log-file`. File output never carries ANSI escapes.
//! `RUST_LOG` takes precedence over the level chosen on the command line.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use tracing::{Level, Subscriber};
use tracing_subscriber::EnvFilter;

/// When to emit ANSI colours in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Colour only if `NO_COLOR` is unset and stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve the choice against the environment.
    pub fn use_ansi(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => !no_color_requested() && std::io::stderr().is_terminal(),
        }
    }
}

/// True when `NO_COLOR` is set to a non-empty value.
pub fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

/// Map `--quiet` / `-v` counts to a level. Quiet wins.
pub fn level_from_flags(quiet: bool, verbose: u8) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("relnote={}", level.as_str().to_lowercase())))
}

/// Build the subscriber without installing it.
///
/// With `log_file`, events are appended to that file as plain text whatever
/// `color` says. Otherwise they go to stderr, coloured per `color`.
pub fn build_subscriber(
    level: Level,
    color: ColorChoice,
    log_file: Option<&Path>,
) -> io::Result<Box<dyn Subscriber + Send + Sync>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_target(false);

    let subscriber: Box<dyn Subscriber + Send + Sync> = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Box::new(builder.with_writer(Mutex::new(file)).with_ansi(false).finish())
        }
        None => Box::new(
            builder
                .with_writer(std::io::stderr)
                .with_ansi(color.use_ansi())
                .finish(),
        ),
    };

    Ok(subscriber)
}

/// Install the global subscriber. Later calls are no-ops.
///
/// Fails only when `log_file` cannot be opened for appending.
pub fn init(level: Level, color: ColorChoice, log_file: Option<&Path>) -> io::Result<()> {
    let subscriber = build_subscriber(level, color, log_file)?;

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}
